//! `IdentityService` の実装
//!
//! - `http`: reqwest による外部認証サービスの HTTP クライアント

pub mod http;

pub use http::HttpIdentityService;
