//! Property tests for the uevent parser
//!
//! Generates buffers of NUL-separated tokens, some `KEY=VALUE` and some
//! without `=`, and checks the parsed record against a model built from the
//! same tokens.

use proptest::prelude::*;
use std::collections::HashMap;
use uevent::{UEVENT_BUFFER_SIZE, parse_uevent};

/// Uppercase uevent-style keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9_]{0,15}"
}

/// Printable ASCII values, `=` allowed
fn value_strategy() -> impl Strategy<Value = String> {
    "[ -~]{0,32}"
}

/// Tokens that carry no `=` and must be ignored
fn bare_strategy() -> impl Strategy<Value = String> {
    "[a-z@/:.0-9-]{1,24}"
}

#[derive(Debug, Clone)]
enum Token {
    Pair(String, String),
    Bare(String),
}

fn token_strategy() -> impl Strategy<Value = Token> {
    prop_oneof![
        4 => (key_strategy(), value_strategy()).prop_map(|(k, v)| Token::Pair(k, v)),
        1 => bare_strategy().prop_map(Token::Bare),
    ]
}

fn encode(tokens: &[Token]) -> Vec<u8> {
    let mut buf = Vec::new();
    for token in tokens {
        match token {
            Token::Pair(k, v) => {
                buf.extend_from_slice(k.as_bytes());
                buf.push(b'=');
                buf.extend_from_slice(v.as_bytes());
            }
            Token::Bare(s) => buf.extend_from_slice(s.as_bytes()),
        }
        buf.push(0);
    }
    buf
}

proptest! {
    /// Property: every well-formed token is present with its last value,
    /// and nothing else is
    #[test]
    fn prop_parse_matches_model(tokens in proptest::collection::vec(token_strategy(), 0..40)) {
        let mut model = HashMap::new();
        for token in &tokens {
            if let Token::Pair(k, v) = token {
                model.insert(k.clone(), v.clone());
            }
        }

        let record = parse_uevent(&encode(&tokens));

        prop_assert_eq!(record.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(record.get(k), Some(v.as_str()));
        }
    }

    /// Property: parsing is deterministic
    #[test]
    fn prop_parse_is_deterministic(tokens in proptest::collection::vec(token_strategy(), 0..40)) {
        let buf = encode(&tokens);
        prop_assert_eq!(parse_uevent(&buf), parse_uevent(&buf));
    }

    /// Property: arbitrary bytes never panic and never yield more fields
    /// than there are `=` bytes
    #[test]
    fn prop_arbitrary_bytes_are_tolerated(
        buf in proptest::collection::vec(any::<u8>(), 0..UEVENT_BUFFER_SIZE),
    ) {
        let record = parse_uevent(&buf);
        let equals = buf.iter().filter(|&&b| b == b'=').count();
        prop_assert!(record.len() <= equals);
    }
}

#[test]
fn test_duplicate_key_last_write_wins() {
    let record = parse_uevent(b"A=1\0A=2\0");
    assert_eq!(record.get("A"), Some("2"));
}

#[test]
fn test_full_usb_add_event_from_udev() {
    let raw = b"ACTION=add\0SUBSYSTEM=usb\0ID_VENDOR_ID=0403\0ID_MODEL_ID=6001\0\
ID_VENDOR=FTDI\0ID_MODEL=FT232R_USB_UART\0";
    let record = parse_uevent(raw);

    assert_eq!(record.get("ID_VENDOR_ID"), Some("0403"));
    assert_eq!(record.get("ID_MODEL_ID"), Some("6001"));
    assert_eq!(record.get("ID_VENDOR"), Some("FTDI"));
    assert_eq!(record.get("ID_MODEL"), Some("FT232R_USB_UART"));
}
