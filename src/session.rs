use hyper::header::AUTHORIZATION;
use std::collections::HashMap;
use tracing::{info, warn};
use url::Url;

use crate::client::RequestExecutor;
use crate::error::{HarnessError, Result};
use crate::models::config::Credentials;
use crate::models::measurement::Measurement;
use crate::models::request::RequestSpec;

/// Bearer token obtained at harness start. Read-only once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A session without a token. Requests made with it go out
    /// unauthenticated and fail on their own terms.
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// `Authorization: Bearer <token>`, or an empty map when there is no
    /// token.
    pub fn auth_header(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            headers.insert(AUTHORIZATION.as_str().to_string(), format!("Bearer {}", token));
        }
        headers
    }
}

/// A successful login together with its timing.
#[derive(Debug, Clone)]
pub struct Login {
    pub session: Session,
    pub measurement: Measurement,
}

pub struct SessionManager {
    executor: RequestExecutor,
    login_url: Url,
}

impl SessionManager {
    pub fn new(executor: RequestExecutor, login_url: Url) -> Self {
        Self { executor, login_url }
    }

    pub async fn acquire(&self, credentials: &Credentials) -> Result<Login> {
        let spec = RequestSpec::auth(self.login_url.clone(), credentials.clone());
        let (measurement, body) = self.executor.fetch(&spec).await;

        if !measurement.success {
            let reason = match (measurement.status, measurement.error) {
                (Some(status), _) => format!("login returned HTTP {}", status),
                (None, Some(kind)) => format!("login request failed ({})", kind),
                (None, None) => "login request failed".to_string(),
            };
            warn!(identifier = %credentials.identifier, %reason, "login rejected");
            return Err(HarnessError::Auth(reason));
        }

        let token = body
            .as_deref()
            .and_then(extract_token)
            .ok_or_else(|| HarnessError::Auth("login response has no token".into()))?;

        info!(
            identifier = %credentials.identifier,
            elapsed_ms = measurement.elapsed_ms(),
            "session acquired"
        );
        Ok(Login {
            session: Session::with_token(token),
            measurement,
        })
    }
}

/// Reads `token`, falling back to `data.token`. Empty strings do not count.
fn extract_token(body: &[u8]) -> Option<String> {
    let json: serde_json::Value = serde_json::from_slice(body).ok()?;
    let non_empty = |v: Option<&serde_json::Value>| {
        v.and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    };
    non_empty(json.get("token"))
        .or_else(|| non_empty(json.get("data").and_then(|d| d.get("token"))))
}
