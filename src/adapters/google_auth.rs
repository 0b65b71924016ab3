//! OAuth2 access tokens for the Sheets API from a service-account key file.
//!
//! The key file is the JSON document Google issues for a service account. An
//! RS256-signed JWT assertion is exchanged at the key's `token_uri` for a
//! bearer token, which is reused until shortly before it expires.

use crate::adapters::http::{status_error, transport_error};
use crate::utils::error::{Result, SyncError};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const OAUTH_SERVICE: &str = "Google OAuth";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

pub trait TokenProvider: Send + Sync {
    fn access_token(&self) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// A fixed bearer token, e.g. one minted by `gcloud auth print-access-token`.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: i64,
}

pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scope: String,
    client: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| SyncError::ConfigError {
            message: format!(
                "cannot read service-account key {}: {}",
                path.as_ref().display(),
                e
            ),
        })?;
        let key: ServiceAccountKey =
            serde_json::from_str(&content).map_err(|e| SyncError::ConfigError {
                message: format!("invalid service-account key file: {}", e),
            })?;
        Self::new(key)
    }

    pub fn new(key: ServiceAccountKey) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        Ok(Self {
            key,
            encoding_key,
            scope: SPREADSHEETS_SCOPE.to_string(),
            client: Client::new(),
            cached: Mutex::new(None),
        })
    }

    /// Overrides the token endpoint from the key file.
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.key.token_uri = token_uri.into();
        self
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    fn sign_assertion(&self, now: i64) -> Result<String> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        Ok(encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    async fn exchange(&self, now: i64) -> Result<CachedToken> {
        let assertion = self.sign_assertion(now)?;
        tracing::debug!(
            "Requesting access token for {} from {}",
            self.key.client_email,
            self.key.token_uri
        );

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| transport_error(OAUTH_SERVICE, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(OAUTH_SERVICE, e))?;

        if !status.is_success() {
            // invalid_grant and friends come back as 400.
            return Err(match status {
                StatusCode::BAD_REQUEST => SyncError::AuthenticationError {
                    service: OAUTH_SERVICE.to_string(),
                    status: status.as_u16(),
                },
                _ => status_error(OAUTH_SERVICE, status, &body),
            });
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| SyncError::FatalError {
                service: OAUTH_SERVICE.to_string(),
                message: e.to_string(),
            })?;

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS),
        })
    }
}

impl TokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at - EXPIRY_MARGIN_SECS > now {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.exchange(now).await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }
}
