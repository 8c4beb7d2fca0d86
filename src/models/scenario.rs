use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::models::request::RequestSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Sequential,
    Concurrent,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Sequential => f.write_str("sequential"),
            ExecutionMode::Concurrent => f.write_str("concurrent"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub spec: Arc<RequestSpec>,
    pub mode: ExecutionMode,
    pub count: usize,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        spec: RequestSpec,
        mode: ExecutionMode,
        count: usize,
    ) -> Self {
        Self {
            name: name.into(),
            spec: Arc::new(spec),
            mode,
            count,
        }
    }
}
