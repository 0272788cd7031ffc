//! Conversion logic between DTOs and domain types.

use hiroba_shared::time::timestamp_to_jst_rfc3339;

use crate::domain::{ConnectionSnapshot, Credentials};

use super::{http::ConnectionSummaryDto, identity::CredentialsDto};

// ========================================
// Domain → DTO
// ========================================

impl From<ConnectionSnapshot> for ConnectionSummaryDto {
    fn from(snapshot: ConnectionSnapshot) -> Self {
        Self {
            kind: snapshot.kind,
            address: snapshot.address,
            name: snapshot.name,
            connected_at: timestamp_to_jst_rfc3339(snapshot.connected_at.value()),
        }
    }
}

impl From<&Credentials> for CredentialsDto {
    fn from(credentials: &Credentials) -> Self {
        Self {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        }
    }
}
