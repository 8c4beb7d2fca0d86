//! Load-testing harness for the retail POS backend.
//!
//! A run logs in, then drives a fixed sequence of read and write scenarios
//! over HTTP, timing every request and summarising each scenario's latency
//! and success rate. Results go to the console and, optionally, to a JSON
//! artifact per run.

pub mod client;
pub mod error;
pub mod executor;
pub mod models;
pub mod orchestrator;
pub mod report;
pub mod session;
pub mod stats;
pub mod utils;
pub mod ws;

pub use error::{HarnessError, Result};
pub use models::config::{Credentials, HarnessConfig};
pub use orchestrator::Orchestrator;
