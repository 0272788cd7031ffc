//! Chat line formatting.
//!
//! Message content is identical across transports; only the framing differs.

use super::DisplayName;

/// Line broadcast when a session becomes active
pub fn join_announcement(name: &DisplayName) -> String {
    format!("{} has joined the chat!", name)
}

/// Line broadcast when an active session closes
pub fn leave_announcement(name: &DisplayName) -> String {
    format!("{} has left the chat.", name)
}

/// Line broadcast for an ordinary inbound message
pub fn chat_line(name: &DisplayName, text: &str) -> String {
    format!("{}: {}", name, text)
}
