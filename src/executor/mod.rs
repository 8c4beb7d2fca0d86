use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::client::RequestExecutor;
use crate::models::measurement::{Measurement, ResultSet, TransportErrorKind};
use crate::models::request::RequestSpec;
use crate::models::scenario::ExecutionMode;

/// Repeats one request template `count` times.
#[derive(Clone)]
pub struct Scheduler {
    executor: RequestExecutor,
}

impl Scheduler {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// The returned set always holds exactly `count` measurements, whatever
    /// happened to the individual requests.
    pub async fn run(
        &self,
        spec: Arc<RequestSpec>,
        count: usize,
        mode: ExecutionMode,
    ) -> ResultSet {
        let started = Instant::now();
        let results = match mode {
            ExecutionMode::Sequential => self.run_sequential(&spec, count).await,
            ExecutionMode::Concurrent => self.run_concurrent(spec.clone(), count).await,
        };
        info!(
            %mode,
            count,
            url = %spec.url(),
            wall_ms = started.elapsed().as_secs_f64() * 1000.0,
            "batch finished"
        );
        results
    }

    async fn run_sequential(&self, spec: &RequestSpec, count: usize) -> ResultSet {
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            results.push(self.executor.execute(spec).await);
        }
        results
    }

    /// Full fan-out: every request is spawned before any is awaited, and the
    /// set is drained in completion order.
    async fn run_concurrent(&self, spec: Arc<RequestSpec>, count: usize) -> ResultSet {
        let started = Instant::now();
        let mut tasks = JoinSet::new();

        for _ in 0..count {
            let executor = self.executor.clone();
            let spec = Arc::clone(&spec);
            tasks.spawn(async move { executor.execute(&spec).await });
        }

        let mut results = Vec::with_capacity(count);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(measurement) => results.push(measurement),
                Err(e) => {
                    error!(error = %e, "request task did not complete");
                    results.push(Measurement::transport_failure(
                        TransportErrorKind::Unknown,
                        started.elapsed(),
                    ));
                }
            }
        }
        results
    }
}
