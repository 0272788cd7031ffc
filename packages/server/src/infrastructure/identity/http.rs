//! HTTP client for the external identity service.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{
    domain::{AuthOutcome, Credentials, IdentityError, IdentityService},
    infrastructure::dto::identity::{CredentialsDto, LoginResponseDto},
};

/// Talks to `POST {base_url}/login` and `POST {base_url}/register`
#[derive(Debug, Clone)]
pub struct HttpIdentityService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdentityService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(
        &self,
        path: &str,
        credentials: &Credentials,
    ) -> Result<reqwest::Response, IdentityError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {} for '{}'", url, credentials.username);
        self.client
            .post(&url)
            .json(&CredentialsDto::from(credentials))
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))
    }
}

fn expect_status(response: &reqwest::Response, expected: StatusCode) -> Result<(), IdentityError> {
    let actual = response.status();
    if actual != expected {
        return Err(IdentityError::UnexpectedStatus {
            expected: expected.as_u16(),
            actual: actual.as_u16(),
        });
    }
    Ok(())
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    async fn login(&self, credentials: &Credentials) -> Result<AuthOutcome, IdentityError> {
        let response = self.post("/login", credentials).await?;
        expect_status(&response, StatusCode::OK)?;
        let body: LoginResponseDto = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;
        Ok(AuthOutcome::LoggedIn { token: body.token })
    }

    async fn register(&self, credentials: &Credentials) -> Result<AuthOutcome, IdentityError> {
        let response = self.post("/register", credentials).await?;
        expect_status(&response, StatusCode::CREATED)?;
        Ok(AuthOutcome::Registered)
    }
}
