//! Transport adapters and the server object that owns them.

mod error;
pub mod handler;
mod server;
mod signal;
pub mod state;
mod status;

pub use error::{HandshakeError, ServerError};
pub use server::Server;
pub use status::render_status_table;
