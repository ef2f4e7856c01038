use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::models::Identity;
use crate::error::AppError;

/// Operations offered by the hosted authentication provider.
///
/// Abstracted as a trait so tests can use a static user table instead of
/// a live provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Verify credentials and return the account's identity.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AppError>;

    /// Create a new password account. The returned identity is not yet
    /// email-verified.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AppError>;

    /// Ask the provider to send its verification mail.
    async fn send_verification(&self, email: &str) -> Result<(), AppError>;

    /// Re-check the password of an already signed-in account before a
    /// destructive action.
    async fn reauthenticate(&self, email: &str, password: &str) -> Result<(), AppError>;
}

#[derive(Debug, Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    email: &'a str,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: String,
}

/// HTTP implementation of [`AuthProvider`] against the hosted service.
pub struct RestAuthProvider {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl RestAuthProvider {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: String) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Internal(format!("Invalid auth provider URL: {e}")))?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    fn endpoint(&self, operation: &str) -> Result<Url, AppError> {
        let mut url = self
            .base_url
            .join(operation)
            .map_err(|e| AppError::Internal(format!("Invalid auth endpoint: {e}")))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn post<Req, Resp>(&self, operation: &str, body: &Req) -> Result<Resp, AppError>
    where
        Req: Serialize + Sync,
        Resp: for<'de> Deserialize<'de>,
    {
        let url = self.endpoint(operation)?;
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Auth provider unreachable: {e}")))?;

        if !response.status().is_success() {
            let message = response
                .json::<ProviderError>()
                .await
                .map(|e| e.error)
                .unwrap_or_else(|_| "Invalid email or password".to_string());
            return Err(AppError::Auth(message));
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| AppError::Auth(format!("Malformed auth provider response: {e}")))
    }
}

/// Body of acknowledgement-only provider responses; the fields, if any,
/// are not interesting.
#[derive(Debug, Deserialize)]
struct Acknowledged {}

#[async_trait]
impl AuthProvider for RestAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        self.post("sign-in", &CredentialsRequest { email, password })
            .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        self.post("sign-up", &CredentialsRequest { email, password })
            .await
    }

    async fn send_verification(&self, email: &str) -> Result<(), AppError> {
        let _: Acknowledged = self.post("send-verification", &EmailRequest { email }).await?;
        Ok(())
    }

    async fn reauthenticate(&self, email: &str, password: &str) -> Result<(), AppError> {
        let _: Acknowledged = self
            .post("reauthenticate", &CredentialsRequest { email, password })
            .await?;
        Ok(())
    }
}
