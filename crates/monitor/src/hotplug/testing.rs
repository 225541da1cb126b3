//! Scripted event source for reactor tests

use crate::hotplug::dispatcher::EventSource;
use common::{Error, Result, ShutdownToken};
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

enum Step {
    Event(Vec<u8>),
    ReceiveError,
}

/// Event source replaying a fixed script
///
/// Once the script is exhausted it either cancels its shutdown token (the
/// default) or, with [`failing_after_events`](Self::failing_after_events),
/// reports a multiplexer failure. With [`idle`](Self::idle) it never runs
/// out and just sleeps through each wait.
pub(crate) struct ScriptedSource {
    steps: VecDeque<Step>,
    current: Vec<u8>,
    shutdown: ShutdownToken,
    fail_when_drained: bool,
    idle: bool,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self {
            steps: VecDeque::new(),
            current: Vec::new(),
            shutdown: ShutdownToken::new(),
            fail_when_drained: false,
            idle: false,
        }
    }

    /// Source with no events that waits out every poll interval
    pub(crate) fn idle() -> Self {
        Self {
            idle: true,
            ..Self::new()
        }
    }

    pub(crate) fn with_event(mut self, payload: &[u8]) -> Self {
        self.steps.push_back(Step::Event(payload.to_vec()));
        self
    }

    pub(crate) fn with_receive_error(mut self) -> Self {
        self.steps.push_back(Step::ReceiveError);
        self
    }

    pub(crate) fn failing_after_events(mut self) -> Self {
        self.fail_when_drained = true;
        self
    }

    /// Token cancelled when the script runs out
    pub(crate) fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }
}

impl EventSource for ScriptedSource {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<&[u8]>> {
        match self.steps.pop_front() {
            Some(Step::Event(payload)) => {
                self.current = payload;
                Ok(Some(&self.current))
            }
            Some(Step::ReceiveError) => Err(Error::Receive(io::Error::from(
                io::ErrorKind::WouldBlock,
            ))),
            None if self.idle => {
                std::thread::sleep(timeout);
                Ok(None)
            }
            None if self.fail_when_drained => Err(Error::Multiplexer(io::Error::from(
                io::ErrorKind::BrokenPipe,
            ))),
            None => {
                self.shutdown.cancel();
                Ok(None)
            }
        }
    }
}
