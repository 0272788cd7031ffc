//! 接続レジストリの実装
//!
//! - `inmemory`: 単一の Mutex で保護されたインメモリ実装

pub mod inmemory;

pub use inmemory::ConnectionRegistry;
