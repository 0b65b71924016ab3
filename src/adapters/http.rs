//! Response classification shared by the commerce and spreadsheet clients.

use crate::utils::error::SyncError;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

/// Longest slice of an error body copied into log lines and error messages.
const BODY_EXCERPT_LEN: usize = 200;

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Maps a failure to send or receive into the error taxonomy: timeouts and
/// connection problems are transient, a body that will not decode is fatal.
pub fn transport_error(service: &str, err: reqwest::Error) -> SyncError {
    if err.is_decode() {
        SyncError::FatalError {
            service: service.to_string(),
            message: err.to_string(),
        }
    } else {
        SyncError::TransientError {
            service: service.to_string(),
            message: err.to_string(),
        }
    }
}

/// Error for a non-success status. 401/403 are authentication failures, 5xx
/// and 429 are transient, anything else is unexpected.
pub fn status_error(service: &str, status: StatusCode, body: &str) -> SyncError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::AuthenticationError {
            service: service.to_string(),
            status: status.as_u16(),
        },
        s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
            SyncError::TransientError {
                service: service.to_string(),
                message: format!("HTTP {}: {}", s.as_u16(), excerpt(body)),
            }
        }
        s => SyncError::FatalError {
            service: service.to_string(),
            message: format!("unexpected HTTP {}: {}", s.as_u16(), excerpt(body)),
        },
    }
}

/// Reads the body and decodes it as JSON, or classifies the failure.
pub async fn read_json<T: DeserializeOwned>(service: &str, response: Response) -> Result<T, SyncError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(service, e))?;

    if !status.is_success() {
        tracing::debug!("{} responded {}: {}", service, status, excerpt(&body));
        return Err(status_error(service, status, &body));
    }

    serde_json::from_str(&body).map_err(|e| SyncError::FatalError {
        service: service.to_string(),
        message: format!("{} (body: {})", e, excerpt(&body)),
    })
}
