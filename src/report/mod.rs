use chrono::{DateTime, Local};
use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{HarnessError, Result};
use crate::models::measurement::{Measurement, ResultSet};
use crate::models::metrics::SummaryStats;
use crate::models::scenario::ExecutionMode;
use crate::utils::hardware::HostInfo;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    /// Position in the scenario's result set.
    pub index: usize,
    pub classification: String,
    pub status: Option<u16>,
}

/// Everything recorded for one scenario, whether or not it could be
/// summarized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcome {
    pub name: String,
    pub mode: ExecutionMode,
    pub count: usize,
    pub wall_time_ms: f64,
    pub measurements: ResultSet,
    pub failures: Vec<FailureRecord>,
    pub summary: Option<SummaryStats>,
    pub error: Option<String>,
}

impl ScenarioOutcome {
    pub fn new(
        name: impl Into<String>,
        mode: ExecutionMode,
        count: usize,
        wall_time_ms: f64,
        measurements: ResultSet,
        summary: Result<SummaryStats>,
    ) -> Self {
        let failures = measurements
            .iter()
            .enumerate()
            .filter_map(|(index, m)| {
                m.failure().map(|class| FailureRecord {
                    index,
                    classification: class.label(),
                    status: m.status,
                })
            })
            .collect();
        let (summary, error) = match summary {
            Ok(stats) => (Some(stats), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            name: name.into(),
            mode,
            count,
            wall_time_ms,
            measurements,
            failures,
            summary,
            error,
        }
    }

    /// Failure count per classification label.
    pub fn failure_breakdown(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for failure in &self.failures {
            *counts.entry(failure.classification.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub target: String,
    pub host: HostInfo,
    pub login: Measurement,
    pub scenarios: Vec<ScenarioOutcome>,
    pub artifact: Option<PathBuf>,
}

impl RunReport {
    pub fn scenario(&self, name: &str) -> Option<&ScenarioOutcome> {
        self.scenarios.iter().find(|s| s.name == name)
    }
}

/// Console rendering plus optional JSON persistence under an explicit
/// results directory.
#[derive(Debug, Clone, Default)]
pub struct ReportEmitter {
    results_dir: Option<PathBuf>,
}

impl ReportEmitter {
    pub fn new(results_dir: Option<PathBuf>) -> Self {
        Self { results_dir }
    }

    pub fn write_header<W: Write>(
        &self,
        out: &mut W,
        target: &str,
        started_at: &DateTime<Local>,
    ) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", "======== POS LOAD TEST ========".bold().white().on_blue())?;
        writeln!(out, "{} {}", "Target    :".blue().bold(), target.bold())?;
        writeln!(
            out,
            "{} {}",
            "Timestamp :".blue().bold(),
            started_at.format("%Y/%m/%d %H:%M:%S").to_string().bold()
        )
    }

    /// One line for the login request: status (or transport error) and
    /// elapsed time.
    pub fn write_login<W: Write>(&self, out: &mut W, login: &Measurement) -> io::Result<()> {
        let outcome = match (login.status, login.error) {
            (Some(status), _) => format!("HTTP {}", status),
            (None, Some(kind)) => format!("TransportError({})", kind),
            (None, None) => "no response".to_string(),
        };
        let outcome = if login.success {
            outcome.green().bold()
        } else {
            outcome.red().bold()
        };
        writeln!(out)?;
        writeln!(
            out,
            "{} {} in {:.2} ms",
            "authenticate     :".bold().cyan(),
            outcome,
            login.elapsed_ms()
        )
    }

    pub fn write_summary<W: Write>(
        &self,
        out: &mut W,
        outcome: &ScenarioOutcome,
    ) -> io::Result<()> {
        writeln!(out)?;
        writeln!(
            out,
            "{} ({}, {} requests, wall {:.2} ms)",
            outcome.name.bold().cyan(),
            outcome.mode,
            outcome.count,
            outcome.wall_time_ms
        )?;

        let stats = match &outcome.summary {
            Some(stats) => stats,
            None => {
                let reason = outcome.error.as_deref().unwrap_or("no summary");
                return writeln!(out, "  {} {}", "skipped :".red().bold(), reason);
            }
        };

        writeln!(out, "  {} {:.2}", "min (ms)         :".bold(), stats.min)?;
        writeln!(out, "  {} {:.2}", "max (ms)         :".bold(), stats.max)?;
        writeln!(out, "  {} {:.2}", "avg (ms)         :".bold(), stats.average)?;
        writeln!(out, "  {} {:.2}", "median (ms)      :".bold(), stats.median)?;
        writeln!(out, "  {} {:.2}", "p95 (ms)         :".bold(), stats.p95)?;

        let rate = format!("{:.2}%", stats.success_rate);
        let rate = if stats.success_rate >= 100.0 {
            rate.green().bold()
        } else {
            rate.yellow().bold()
        };
        writeln!(out, "  {} {}", "success rate     :".bold(), rate)?;
        writeln!(out, "  {} {:.2}", "total            :".bold(), stats.total as f64)?;
        writeln!(out, "  {} {:.2}", "successful       :".bold(), stats.successful as f64)?;

        for (class, count) in outcome.failure_breakdown() {
            writeln!(out, "  {} {}: {}", "•".red(), class, count)?;
        }
        Ok(())
    }

    pub fn print_header(&self, target: &str, started_at: &DateTime<Local>) {
        let stdout = io::stdout();
        let _ = self.write_header(&mut stdout.lock(), target, started_at);
    }

    pub fn print_login(&self, login: &Measurement) {
        let stdout = io::stdout();
        let _ = self.write_login(&mut stdout.lock(), login);
    }

    pub fn print_summary(&self, outcome: &ScenarioOutcome) {
        let stdout = io::stdout();
        let _ = self.write_summary(&mut stdout.lock(), outcome);
    }

    /// Writes the report as JSON into the results directory. Returns `None`
    /// when no directory is configured.
    pub fn persist(&self, report: &RunReport) -> Result<Option<PathBuf>> {
        let dir = match &self.results_dir {
            Some(dir) => dir,
            None => return Ok(None),
        };
        fs::create_dir_all(dir)?;

        let (path, file) = create_artifact(dir, &report.started_at)?;
        let mut writer = io::BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.flush()?;

        info!(path = %path.display(), "results saved");
        Ok(Some(path))
    }
}

/// Opens a fresh `run-<timestamp>[-n].json`, never reusing an existing name.
fn create_artifact(dir: &Path, started_at: &DateTime<Local>) -> Result<(PathBuf, File)> {
    let stem = format!("run-{}", started_at.format("%Y%m%d-%H%M%S-%3f"));
    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            format!("{}.json", stem)
        } else {
            format!("{}-{}.json", stem, attempt)
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(HarnessError::Io(e)),
        }
    }
}
