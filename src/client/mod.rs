use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Body as HyperBody, Client, Request, StatusCode, Uri};
use hyper_tls::HttpsConnector;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::models::measurement::{Measurement, TransportErrorKind};
use crate::models::request::RequestSpec;

pub type HttpsClient = Client<HttpsConnector<hyper::client::HttpConnector>>;

/// Issues single timed requests against the target.
///
/// Any HTTP status counts as a response; only failures before a status is
/// obtained are transport errors. Nothing here returns an error: every
/// outcome, good or bad, comes back as a [`Measurement`].
#[derive(Clone)]
pub struct RequestExecutor {
    client: HttpsClient,
    timeout: Duration,
}

impl RequestExecutor {
    pub fn new(timeout: Duration) -> Self {
        let https = HttpsConnector::new();
        let client: HttpsClient = Client::builder().build::<_, HyperBody>(https);
        Self { client, timeout }
    }

    pub async fn execute(&self, spec: &RequestSpec) -> Measurement {
        self.fetch(spec).await.0
    }

    /// Like [`execute`](Self::execute) but also hands back the response body
    /// when one was read.
    pub async fn fetch(&self, spec: &RequestSpec) -> (Measurement, Option<Bytes>) {
        let request = match build_request(spec) {
            Ok(request) => request,
            Err(e) => {
                warn!(url = %spec.url(), error = %e, "request could not be built");
                return (
                    Measurement::transport_failure(TransportErrorKind::Unknown, Duration::ZERO),
                    None,
                );
            }
        };

        let start = Instant::now();
        let outcome = timeout(self.timeout, self.exchange(request)).await;
        let elapsed = start.elapsed();

        let (measurement, body) = match outcome {
            Ok(Ok((status, body))) => (Measurement::response(status.as_u16(), elapsed), body),
            Ok(Err(e)) => (Measurement::transport_failure(classify(&e), elapsed), None),
            Err(_) => (
                Measurement::transport_failure(TransportErrorKind::Timeout, elapsed),
                None,
            ),
        };

        debug!(
            method = ?spec.method(),
            url = %spec.url(),
            status = ?measurement.status,
            error = ?measurement.error,
            elapsed_ms = measurement.elapsed_ms(),
            "request finished"
        );
        (measurement, body)
    }

    async fn exchange(
        &self,
        request: Request<HyperBody>,
    ) -> Result<(StatusCode, Option<Bytes>), hyper::Error> {
        let response = self.client.request(request).await?;
        let status = response.status();

        // The status is already in hand; a broken body does not turn this
        // into a transport failure.
        let body = match hyper::body::to_bytes(response.into_body()).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(status = status.as_u16(), error = %e, "response body could not be read");
                None
            }
        };
        Ok((status, body))
    }
}

fn build_request(spec: &RequestSpec) -> Result<Request<HyperBody>, String> {
    let uri: Uri = spec.url().as_str().parse::<Uri>().map_err(|e| e.to_string())?;

    let mut req_builder = Request::builder()
        .method(spec.method().as_hyper())
        .uri(uri);

    if let Some(headers) = spec.headers() {
        for (key, value) in headers.iter() {
            req_builder = req_builder.header(key.as_str(), value.as_str());
        }
    }

    let body = match spec.body() {
        Some(json) => {
            req_builder = req_builder.header(CONTENT_TYPE, "application/json");
            let json_string = serde_json::to_string(&json).map_err(|e| e.to_string())?;
            HyperBody::from(json_string)
        }
        None => HyperBody::empty(),
    };

    req_builder.body(body).map_err(|e| e.to_string())
}

fn classify(e: &hyper::Error) -> TransportErrorKind {
    if e.is_connect() {
        TransportErrorKind::Connection
    } else if e.is_timeout() {
        TransportErrorKind::Timeout
    } else {
        TransportErrorKind::Unknown
    }
}
