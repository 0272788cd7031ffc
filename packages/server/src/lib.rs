//! Dual-transport chat relay library.
//!
//! Clients connect over raw TCP or WebSocket; every message is fanned out to
//! all other connected clients through a single connection registry.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
