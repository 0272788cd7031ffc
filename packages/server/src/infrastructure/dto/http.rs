//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::TransportKind;

/// One entry of `GET /api/connections`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSummaryDto {
    pub kind: TransportKind,
    pub address: String,
    pub name: String,
    /// RFC 3339 in JST
    pub connected_at: String,
}

/// Body of `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
}
