//! Data Transfer Objects (DTOs) for the chat relay.
//!
//! DTOs are organized by protocol:
//! - `http`: HTTP observation API response DTOs
//! - `identity`: request/response bodies of the external identity service

pub mod conversion;
pub mod http;
pub mod identity;
