//! CLI command implementations.

pub mod ack;
pub mod inspect;
pub mod pack;

/// Renders bytes as text when they are printable UTF-8, hex otherwise.
pub(crate) fn display_payload(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) if !text.chars().any(char::is_control) => format!("{:?}", text),
        _ => bytes.iter().map(|b| format!("{:02x}", b)).collect(),
    }
}
