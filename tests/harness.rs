mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{MockBackend, MockState};
use posbench::client::RequestExecutor;
use posbench::executor::Scheduler;
use posbench::models::measurement::TransportErrorKind;
use posbench::models::request::RequestSpec;
use posbench::models::scenario::ExecutionMode;
use posbench::orchestrator::{BOUNDED_WRITE, CONCURRENT_READ, REPORTING_READ, SEQUENTIAL_READ};
use posbench::session::{Session, SessionManager};
use posbench::{stats, HarnessError, Orchestrator};

fn scheduler(timeout: Duration) -> Scheduler {
    Scheduler::new(RequestExecutor::new(timeout))
}

fn authed_read(backend: &MockBackend) -> Arc<RequestSpec> {
    Arc::new(RequestSpec::read(
        backend.url("/products"),
        Session::with_token(common::TOKEN).auth_header(),
    ))
}

#[actix_web::test]
async fn sequential_reads_at_fixed_latency() {
    let backend = MockBackend::start(MockState::new().latency(Duration::from_millis(50))).await;

    let results = scheduler(Duration::from_secs(5))
        .run(authed_read(&backend), 100, ExecutionMode::Sequential)
        .await;
    assert_eq!(results.len(), 100);

    let s = stats::summarize(&results).unwrap();
    assert_eq!(s.total, 100);
    assert_eq!(s.successful, 100);
    assert_eq!(s.success_rate, 100.0);
    assert!(s.min >= 50.0, "min {}", s.min);
    assert!(s.max < 250.0, "max {}", s.max);
    assert!(s.average >= 50.0 && s.average < 100.0, "avg {}", s.average);
    assert!(s.median >= 50.0 && s.median < 100.0, "median {}", s.median);
    assert!(s.p95 >= 50.0 && s.p95 < 250.0, "p95 {}", s.p95);
    assert_eq!(backend.state.reads.load(Ordering::SeqCst), 100);

    backend.stop().await;
}

#[actix_web::test]
async fn concurrent_reads_overlap() {
    let backend = MockBackend::start(MockState::new().latency(Duration::from_millis(50))).await;

    let started = Instant::now();
    let results = scheduler(Duration::from_secs(5))
        .run(authed_read(&backend), 10, ExecutionMode::Concurrent)
        .await;
    let wall = started.elapsed();

    assert_eq!(results.len(), 10);
    assert!(results.iter().all(|m| m.success));
    assert!(wall >= Duration::from_millis(50));
    assert!(wall < Duration::from_millis(250), "wall {:?}", wall);

    backend.stop().await;
}

#[actix_web::test]
async fn timeouts_are_per_request_failures() {
    let backend = MockBackend::start(MockState::new().latency(Duration::from_millis(400))).await;

    let results = scheduler(Duration::from_millis(50))
        .run(authed_read(&backend), 5, ExecutionMode::Concurrent)
        .await;

    assert_eq!(results.len(), 5);
    for m in &results {
        assert_eq!(m.status, None);
        assert_eq!(m.error, Some(TransportErrorKind::Timeout));
        assert!(m.elapsed < Duration::from_millis(400));
    }
    let s = stats::summarize(&results).unwrap();
    assert_eq!(s.success_rate, 0.0);

    backend.stop().await;
}

#[actix_web::test]
async fn anonymous_session_still_runs_and_records_rejections() {
    let backend = MockBackend::start(MockState::new()).await;
    let spec = Arc::new(RequestSpec::read(
        backend.url("/products"),
        Session::anonymous().auth_header(),
    ));

    let results = scheduler(Duration::from_secs(5))
        .run(spec, 4, ExecutionMode::Sequential)
        .await;

    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|m| m.status == Some(401) && !m.success));
    assert_eq!(backend.state.reads.load(Ordering::SeqCst), 4);

    backend.stop().await;
}

#[actix_web::test]
async fn session_manager_reads_token() {
    let backend = MockBackend::start(MockState::new()).await;
    let config = backend.config();

    let manager = SessionManager::new(
        RequestExecutor::new(Duration::from_secs(5)),
        backend.url("/auth/login"),
    );
    let login = manager.acquire(&config.credentials).await.unwrap();

    assert_eq!(login.session.token(), Some(common::TOKEN));
    assert_eq!(login.measurement.status, Some(200));

    backend.stop().await;
}

#[actix_web::test]
async fn rejected_login_aborts_every_scenario() {
    let backend = MockBackend::start(MockState::new().login_status(401)).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = backend.config();
    config.results_directory = Some(dir.path().join("results"));

    let result = Orchestrator::new(config).unwrap().echo(false).run().await;

    assert!(matches!(result, Err(HarnessError::Auth(_))));
    assert_eq!(backend.state.logins.load(Ordering::SeqCst), 1);
    assert_eq!(backend.state.reads.load(Ordering::SeqCst), 0);
    assert_eq!(backend.state.writes.load(Ordering::SeqCst), 0);
    assert!(!dir.path().join("results").exists());

    backend.stop().await;
}

#[actix_web::test]
async fn login_without_token_aborts_every_scenario() {
    let backend =
        MockBackend::start(MockState::new().login_body(serde_json::json!({ "user": {} }))).await;

    let result = Orchestrator::new(backend.config()).unwrap().echo(false).run().await;

    assert!(matches!(result, Err(HarnessError::Auth(ref m)) if m.contains("no token")));
    assert_eq!(backend.state.logins.load(Ordering::SeqCst), 1);
    assert_eq!(backend.state.reads.load(Ordering::SeqCst), 0);
    assert_eq!(backend.state.writes.load(Ordering::SeqCst), 0);

    backend.stop().await;
}

#[actix_web::test]
async fn bounded_write_with_one_server_error() {
    let backend = MockBackend::start(MockState::new().fail_write_at(2)).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = backend.config();
    config.sequential_count = 3;
    config.concurrent_count = 4;
    config.write_count = 5;
    config.results_directory = Some(dir.path().to_path_buf());

    let report = Orchestrator::new(config).unwrap().echo(false).run().await.unwrap();

    let names: Vec<_> = report.scenarios.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec![SEQUENTIAL_READ, CONCURRENT_READ, BOUNDED_WRITE]);

    let write = report.scenario(BOUNDED_WRITE).unwrap();
    assert_eq!(write.measurements.len(), 5);
    let summary = write.summary.as_ref().unwrap();
    assert_eq!(summary.success_rate, 80.0);
    assert_eq!(summary.successful, 4);
    assert_eq!(write.failures.len(), 1);
    assert_eq!(write.failures[0].classification, "HTTPError");
    assert_eq!(write.failures[0].status, Some(500));
    assert_eq!(backend.state.writes.load(Ordering::SeqCst), 5);

    let read = report.scenario(SEQUENTIAL_READ).unwrap();
    assert_eq!(read.summary.as_ref().unwrap().success_rate, 100.0);

    let artifact = report.artifact.as_ref().expect("artifact written");
    assert!(artifact.starts_with(dir.path()));
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(artifact).unwrap()).unwrap();
    let saved_write = saved["scenarios"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == BOUNDED_WRITE)
        .unwrap();
    let http_errors = saved_write["failures"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|f| f["classification"] == "HTTPError")
        .count();
    assert_eq!(http_errors, 1);
    assert_eq!(saved_write["summary"]["successRate"], 80.0);

    backend.stop().await;
}

#[actix_web::test]
async fn reporting_read_is_included_when_configured() {
    let backend = MockBackend::start(MockState::new()).await;
    let mut config = backend.config();
    config.sequential_count = 2;
    config.concurrent_count = 2;
    config.write_count = 1;
    config.report_path = Some("/reports/sales".into());

    let report = Orchestrator::new(config).unwrap().echo(false).run().await.unwrap();

    let reporting = report.scenario(REPORTING_READ).unwrap();
    assert_eq!(reporting.measurements.len(), 2);
    assert!(reporting.measurements.iter().all(|m| m.success));
    assert!(report.artifact.is_none());

    backend.stop().await;
}

#[actix_web::test]
async fn unreachable_target_is_an_auth_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = posbench::HarnessConfig::new(
        format!("http://{}", addr),
        posbench::Credentials {
            identifier: "admin".into(),
            secret: "admin123".into(),
        },
    );
    let err = Orchestrator::new(config).unwrap().echo(false).run().await.unwrap_err();
    assert!(matches!(err, HarnessError::Auth(ref m) if m.contains("connection")));
}
