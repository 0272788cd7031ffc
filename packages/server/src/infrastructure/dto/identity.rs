//! Identity service wire format.

use serde::{Deserialize, Serialize};

/// Body of `POST /login` and `POST /register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsDto {
    pub username: String,
    pub password: String,
}

/// Body of a successful `POST /login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponseDto {
    pub token: String,
}
