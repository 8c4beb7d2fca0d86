use chrono::Local;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::client::RequestExecutor;
use crate::error::Result;
use crate::executor::Scheduler;
use crate::models::config::HarnessConfig;
use crate::models::request::RequestSpec;
use crate::models::scenario::{ExecutionMode, Scenario};
use crate::report::{ReportEmitter, RunReport, ScenarioOutcome};
use crate::session::{Session, SessionManager};
use crate::stats;
use crate::utils::hardware::get_hardware_info;

pub const SEQUENTIAL_READ: &str = "sequential read";
pub const CONCURRENT_READ: &str = "concurrent read";
pub const REPORTING_READ: &str = "reporting read";
pub const BOUNDED_WRITE: &str = "bounded write";

/// Runs the fixed scenario sequence against one target.
///
/// Only a failed login stops the run. Every later scenario is executed and
/// recorded regardless of how its requests fare.
pub struct Orchestrator {
    config: HarnessConfig,
    scheduler: Scheduler,
    emitter: ReportEmitter,
    echo: bool,
}

impl Orchestrator {
    pub fn new(config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        let executor = RequestExecutor::new(Duration::from_millis(config.request_timeout_ms));
        let emitter = ReportEmitter::new(config.results_directory.clone());
        Ok(Self {
            config,
            scheduler: Scheduler::new(executor),
            emitter,
            echo: true,
        })
    }

    /// Turns console rendering on or off. Logging and the artifact are
    /// unaffected.
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub async fn run(&self) -> Result<RunReport> {
        let started_at = Local::now();
        info!(target_url = %self.config.target_base_url, "load test starting");
        if self.echo {
            self.emitter.print_header(&self.config.target_base_url, &started_at);
        }

        let sessions = SessionManager::new(
            self.scheduler.executor().clone(),
            self.config.endpoint("/auth/login")?,
        );
        let login = match sessions.acquire(&self.config.credentials).await {
            Ok(login) => login,
            Err(e) => {
                error!(error = %e, "authentication failed, aborting run");
                return Err(e);
            }
        };
        if self.echo {
            self.emitter.print_login(&login.measurement);
        }

        let mut scenarios = Vec::new();
        for scenario in self.scenarios(&login.session)? {
            let outcome = self.run_scenario(&scenario).await;
            if self.echo {
                self.emitter.print_summary(&outcome);
            }
            scenarios.push(outcome);
        }

        let mut report = RunReport {
            started_at,
            target: self.config.target_base_url.clone(),
            host: get_hardware_info(),
            login: login.measurement,
            scenarios,
            artifact: None,
        };

        match self.emitter.persist(&report) {
            Ok(path) => report.artifact = path,
            Err(e) => warn!(error = %e, "results could not be saved"),
        }

        info!(scenarios = report.scenarios.len(), "load test finished");
        Ok(report)
    }

    /// Scenarios after login, in execution order.
    pub fn scenarios(&self, session: &Session) -> Result<Vec<Scenario>> {
        let headers = session.auth_header();
        let read_url = self.config.endpoint(&self.config.read_path)?;

        let mut scenarios = vec![
            Scenario::new(
                SEQUENTIAL_READ,
                RequestSpec::read(read_url.clone(), headers.clone()),
                ExecutionMode::Sequential,
                self.config.sequential_count,
            ),
            Scenario::new(
                CONCURRENT_READ,
                RequestSpec::read(read_url, headers.clone()),
                ExecutionMode::Concurrent,
                self.config.concurrent_count,
            ),
        ];

        if let Some(report_path) = &self.config.report_path {
            scenarios.push(Scenario::new(
                REPORTING_READ,
                RequestSpec::read(self.config.endpoint(report_path)?, headers.clone()),
                ExecutionMode::Sequential,
                self.config.sequential_count,
            ));
        }

        scenarios.push(Scenario::new(
            BOUNDED_WRITE,
            RequestSpec::write(
                self.config.endpoint(&self.config.write_path)?,
                self.config.write_body.clone(),
                headers,
            ),
            ExecutionMode::Sequential,
            self.config.write_count,
        ));
        Ok(scenarios)
    }

    async fn run_scenario(&self, scenario: &Scenario) -> ScenarioOutcome {
        info!(
            scenario = %scenario.name,
            mode = %scenario.mode,
            count = scenario.count,
            "scenario starting"
        );
        let started = Instant::now();
        let results = self
            .scheduler
            .run(scenario.spec.clone(), scenario.count, scenario.mode)
            .await;
        let wall_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        let summary = stats::summarize(&results);
        match &summary {
            Ok(s) => info!(
                scenario = %scenario.name,
                success_rate = s.success_rate,
                median_ms = s.median,
                "scenario finished"
            ),
            Err(e) => warn!(scenario = %scenario.name, error = %e, "scenario has no summary"),
        }

        ScenarioOutcome::new(
            scenario.name.clone(),
            scenario.mode,
            scenario.count,
            wall_time_ms,
            results,
            summary,
        )
    }
}
