//! Kernel uevent actions

use crate::error::UeventError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Device state change reported by the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Add,
    Remove,
    Change,
    Move,
    Online,
    Offline,
    Bind,
    Unbind,
}

impl Action {
    /// Kernel spelling of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Remove => "remove",
            Action::Change => "change",
            Action::Move => "move",
            Action::Online => "online",
            Action::Offline => "offline",
            Action::Bind => "bind",
            Action::Unbind => "unbind",
        }
    }
}

impl FromStr for Action {
    type Err = UeventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Action::Add),
            "remove" => Ok(Action::Remove),
            "change" => Ok(Action::Change),
            "move" => Ok(Action::Move),
            "online" => Ok(Action::Online),
            "offline" => Ok(Action::Offline),
            "bind" => Ok(Action::Bind),
            "unbind" => Ok(Action::Unbind),
            other => Err(UeventError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
