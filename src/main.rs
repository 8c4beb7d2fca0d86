use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use posbench::{Credentials, HarnessConfig, Orchestrator};

const DEFAULT_LOG_FILTER: &str = "posbench=info";

#[derive(Debug, Parser)]
#[command(name = "posbench", version, about = "Load-test the POS backend over HTTP")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the scenario sequence once and print the results
    Run(RunArgs),
    /// Accept harness configs over WebSocket and reply with run reports
    Serve {
        #[arg(long, env = "POSBENCH_BIND", default_value = "127.0.0.1:8080")]
        bind: String,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// JSON config file; flags and environment override its fields
    #[arg(long, env = "POSBENCH_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "POSBENCH_TARGET")]
    target: Option<String>,

    #[arg(long, env = "POSBENCH_SEQUENTIAL")]
    sequential: Option<usize>,

    #[arg(long, env = "POSBENCH_CONCURRENT")]
    concurrent: Option<usize>,

    #[arg(long, env = "POSBENCH_WRITES")]
    writes: Option<usize>,

    #[arg(long, env = "POSBENCH_IDENTIFIER")]
    identifier: Option<String>,

    #[arg(long, env = "POSBENCH_SECRET", hide_env_values = true)]
    secret: Option<String>,

    #[arg(long, env = "POSBENCH_RESULTS_DIR")]
    results_dir: Option<PathBuf>,

    #[arg(long, env = "POSBENCH_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    #[arg(long, env = "POSBENCH_REPORT_PATH")]
    report_path: Option<String>,
}

impl RunArgs {
    fn into_config(self) -> anyhow::Result<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::from_file(path)?,
            None => {
                let target = self
                    .target
                    .clone()
                    .context("--target is required without --config")?;
                let credentials = Credentials {
                    identifier: self
                        .identifier
                        .clone()
                        .context("--identifier is required without --config")?,
                    secret: self
                        .secret
                        .clone()
                        .context("--secret is required without --config")?,
                };
                HarnessConfig::new(target, credentials)
            }
        };

        if let Some(target) = self.target {
            config.target_base_url = target;
        }
        if let Some(n) = self.sequential {
            config.sequential_count = n;
        }
        if let Some(n) = self.concurrent {
            config.concurrent_count = n;
        }
        if let Some(n) = self.writes {
            config.write_count = n;
        }
        if let Some(identifier) = self.identifier {
            config.credentials.identifier = identifier;
        }
        if let Some(secret) = self.secret {
            config.credentials.secret = secret;
        }
        if let Some(dir) = self.results_dir {
            config.results_directory = Some(dir);
        }
        if let Some(ms) = self.timeout_ms {
            config.request_timeout_ms = ms;
        }
        if let Some(path) = self.report_path {
            config.report_path = Some(path);
        }
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = args.into_config()?;
    let orchestrator = Orchestrator::new(config).context("invalid configuration")?;
    let report = orchestrator.run().await.context("load test aborted")?;
    if let Some(path) = &report.artifact {
        println!();
        println!("Results saved to {}", path.display());
    }
    Ok(())
}

async fn serve(bind: String) -> anyhow::Result<()> {
    tracing::info!(%bind, "worker listening on ws://{}/ws", bind);
    HttpServer::new(|| App::new().route("/ws", web::get().to(posbench::ws::ws_handler)))
        .bind(&bind)
        .with_context(|| format!("cannot bind {}", bind))?
        .run()
        .await?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    match Cli::parse().command {
        // The fan-out gets a multi-threaded runtime; the worker needs actix's.
        Command::Run(args) => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(run(args)),
        Command::Serve { bind } => actix_web::rt::System::new().block_on(serve(bind)),
    }
}
