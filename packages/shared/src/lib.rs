//! Utilities shared by the Hiroba binaries: logging setup and JST time helpers.

pub mod logger;
pub mod time;
