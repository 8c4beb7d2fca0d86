use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Why a request produced no HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportErrorKind {
    Timeout,
    Connection,
    Unknown,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connection => "connection",
            TransportErrorKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// How an unsuccessful measurement failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    Http(u16),
    Transport(TransportErrorKind),
}

impl FailureClass {
    /// Grouping key used in reports: `HTTPError` or `TransportError(<kind>)`.
    pub fn label(&self) -> String {
        match self {
            FailureClass::Http(_) => "HTTPError".to_string(),
            FailureClass::Transport(kind) => format!("TransportError({})", kind),
        }
    }
}

/// Outcome of exactly one executed request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub status: Option<u16>,
    #[serde(rename = "elapsedMs", serialize_with = "millis")]
    pub elapsed: Duration,
    pub success: bool,
    pub error: Option<TransportErrorKind>,
}

impl Measurement {
    pub fn response(status: u16, elapsed: Duration) -> Self {
        Self {
            status: Some(status),
            elapsed,
            success: (200..300).contains(&status),
            error: None,
        }
    }

    pub fn transport_failure(kind: TransportErrorKind, elapsed: Duration) -> Self {
        Self {
            status: None,
            elapsed,
            success: false,
            error: Some(kind),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_nanos() as f64 / 1_000_000.0
    }

    pub fn failure(&self) -> Option<FailureClass> {
        if self.success {
            return None;
        }
        match (self.status, self.error) {
            (Some(status), _) => Some(FailureClass::Http(status)),
            (None, kind) => Some(FailureClass::Transport(
                kind.unwrap_or(TransportErrorKind::Unknown),
            )),
        }
    }
}

fn millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_nanos() as f64 / 1_000_000.0)
}

/// Measurements of one scheduled run, in the order the scheduler produced them.
pub type ResultSet = Vec<Measurement>;
