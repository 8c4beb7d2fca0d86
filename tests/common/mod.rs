#![allow(dead_code)]

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use posbench::{Credentials, HarnessConfig};

pub const TOKEN: &str = "test-token";

/// Behaviour of the fake POS backend.
pub struct MockState {
    pub login_status: u16,
    /// Body of a successful login; a token by default.
    pub login_body: serde_json::Value,
    pub latency: Duration,
    /// Zero-based index of the write that answers 500.
    pub fail_write_at: Option<usize>,
    pub logins: AtomicUsize,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
}

impl MockState {
    pub fn new() -> Self {
        Self {
            login_status: 200,
            login_body: serde_json::json!({ "token": TOKEN, "user": { "id": 1 } }),
            latency: Duration::ZERO,
            fail_write_at: None,
            logins: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn login_status(mut self, status: u16) -> Self {
        self.login_status = status;
        self
    }

    pub fn login_body(mut self, body: serde_json::Value) -> Self {
        self.login_body = body;
        self
    }

    pub fn fail_write_at(mut self, index: usize) -> Self {
        self.fail_write_at = Some(index);
        self
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: web::Data<MockState>,
    handle: ServerHandle,
}

impl MockBackend {
    pub async fn start(state: MockState) -> Self {
        let state = web::Data::new(state);
        let data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/auth/login", web::post().to(login))
                .route("/products", web::get().to(products))
                .route("/reports/sales", web::get().to(products))
                .route("/sales", web::post().to(create_sale))
        })
        .workers(2)
        .bind(("127.0.0.1", 0))
        .expect("bind mock backend");

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            base_url: format!("http://{}", addr),
            state,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> url::Url {
        url::Url::parse(&format!("{}{}", self.base_url, path)).unwrap()
    }

    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::new(
            self.base_url.clone(),
            Credentials {
                identifier: "admin".into(),
                secret: "admin123".into(),
            },
        )
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}

async fn login(state: web::Data<MockState>) -> HttpResponse {
    state.logins.fetch_add(1, Ordering::SeqCst);
    if state.login_status == 200 {
        HttpResponse::Ok().json(&state.login_body)
    } else {
        let status = StatusCode::from_u16(state.login_status).unwrap();
        HttpResponse::build(status).json(serde_json::json!({ "message": "invalid credentials" }))
    }
}

fn authorized(req: &HttpRequest) -> bool {
    req.headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

async fn products(req: HttpRequest, state: web::Data<MockState>) -> HttpResponse {
    if !state.latency.is_zero() {
        actix_web::rt::time::sleep(state.latency).await;
    }
    state.reads.fetch_add(1, Ordering::SeqCst);
    if !authorized(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    HttpResponse::Ok().json(serde_json::json!([{ "id": 1, "name": "Coffee", "price": 2.5 }]))
}

async fn create_sale(
    req: HttpRequest,
    state: web::Data<MockState>,
    body: web::Json<serde_json::Value>,
) -> HttpResponse {
    let n = state.writes.fetch_add(1, Ordering::SeqCst);
    if !authorized(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    if state.fail_write_at == Some(n) {
        return HttpResponse::InternalServerError()
            .json(serde_json::json!({ "message": "stock error" }));
    }
    HttpResponse::Created()
        .json(serde_json::json!({ "id": n + 1, "items": body["items"].clone() }))
}
