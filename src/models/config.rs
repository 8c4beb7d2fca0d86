use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{HarnessError, Result};

#[derive(Deserialize, Clone, PartialEq)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"***")
            .finish()
    }
}

/// Everything a harness run needs. Arrives as JSON (file or WebSocket frame)
/// and may be overridden field by field from the command line.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HarnessConfig {
    pub target_base_url: String,

    #[serde(default = "default_sequential_count")]
    pub sequential_count: usize,

    #[serde(default = "default_concurrent_count")]
    pub concurrent_count: usize,

    #[serde(default = "default_write_count")]
    pub write_count: usize,

    pub credentials: Credentials,

    #[serde(default)]
    pub results_directory: Option<PathBuf>,

    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_read_path")]
    pub read_path: String,

    #[serde(default = "default_write_path")]
    pub write_path: String,

    #[serde(default)]
    pub report_path: Option<String>,

    #[serde(default = "default_write_body")]
    pub write_body: serde_json::Value,
}

fn default_sequential_count() -> usize {
    100
}

fn default_concurrent_count() -> usize {
    10
}

fn default_write_count() -> usize {
    5
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_read_path() -> String {
    "/products".to_string()
}

fn default_write_path() -> String {
    "/sales".to_string()
}

fn default_write_body() -> serde_json::Value {
    serde_json::json!({
        "items": [{ "productId": 1, "quantity": 1 }],
        "paymentMethod": "cash",
    })
}

impl HarnessConfig {
    /// A config with every optional field at its default.
    pub fn new(target_base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            target_base_url: target_base_url.into(),
            sequential_count: default_sequential_count(),
            concurrent_count: default_concurrent_count(),
            write_count: default_write_count(),
            credentials,
            results_directory: None,
            request_timeout_ms: default_timeout_ms(),
            read_path: default_read_path(),
            write_path: default_write_path(),
            report_path: None,
            write_body: default_write_body(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| HarnessError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| HarnessError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, count) in [
            ("sequentialCount", self.sequential_count),
            ("concurrentCount", self.concurrent_count),
            ("writeCount", self.write_count),
        ] {
            if count == 0 {
                return Err(HarnessError::Config(format!("{} must be at least 1", name)));
            }
        }
        if self.request_timeout_ms == 0 {
            return Err(HarnessError::Config("requestTimeoutMs must be at least 1".into()));
        }
        self.base_url().map(|_| ())
    }

    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.target_base_url)
            .map_err(|e| HarnessError::Config(format!("targetBaseUrl: {}", e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(HarnessError::Config(format!(
                "targetBaseUrl: unsupported scheme {}",
                other
            ))),
        }
    }

    /// Resolves an endpoint path against the base URL, keeping any path
    /// prefix the base URL carries (`http://host/api` + `/products` is
    /// `http://host/api/products`).
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let mut base = self.base_url()?;
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|e| HarnessError::Config(format!("{}: {}", path, e)))
    }
}
