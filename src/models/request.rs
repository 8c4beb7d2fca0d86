use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

use crate::models::config::Credentials;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    GET,
    POST,
}

impl HttpMethod {
    pub fn as_hyper(self) -> hyper::Method {
        match self {
            HttpMethod::GET => hyper::Method::GET,
            HttpMethod::POST => hyper::Method::POST,
        }
    }
}

/// One request template per scenario kind, reused across every repetition.
///
/// Each kind fixes its method and carries only the fields it needs, so a read
/// can never accidentally carry a body and a login always carries credentials.
#[derive(Debug, Clone)]
pub enum RequestSpec {
    Auth {
        url: Url,
        credentials: Credentials,
    },
    Read {
        url: Url,
        headers: HashMap<String, String>,
    },
    Write {
        url: Url,
        body: serde_json::Value,
        headers: HashMap<String, String>,
    },
}

impl RequestSpec {
    pub fn auth(url: Url, credentials: Credentials) -> Self {
        RequestSpec::Auth { url, credentials }
    }

    pub fn read(url: Url, headers: HashMap<String, String>) -> Self {
        RequestSpec::Read { url, headers }
    }

    pub fn write(url: Url, body: serde_json::Value, headers: HashMap<String, String>) -> Self {
        RequestSpec::Write { url, body, headers }
    }

    pub fn url(&self) -> &Url {
        match self {
            RequestSpec::Auth { url, .. }
            | RequestSpec::Read { url, .. }
            | RequestSpec::Write { url, .. } => url,
        }
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            RequestSpec::Read { .. } => HttpMethod::GET,
            RequestSpec::Auth { .. } | RequestSpec::Write { .. } => HttpMethod::POST,
        }
    }

    /// JSON body, if the kind sends one.
    pub fn body(&self) -> Option<serde_json::Value> {
        match self {
            RequestSpec::Auth { credentials, .. } => Some(serde_json::json!({
                "identifier": credentials.identifier,
                "secret": credentials.secret,
            })),
            RequestSpec::Read { .. } => None,
            RequestSpec::Write { body, .. } => Some(body.clone()),
        }
    }

    pub fn headers(&self) -> Option<&HashMap<String, String>> {
        match self {
            RequestSpec::Auth { .. } => None,
            RequestSpec::Read { headers, .. } | RequestSpec::Write { headers, .. } => Some(headers),
        }
    }
}
