pub mod config;
pub mod measurement;
pub mod metrics;
pub mod request;
pub mod scenario;
