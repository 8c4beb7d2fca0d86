use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::config::HarnessConfig;
use crate::orchestrator::Orchestrator;
use crate::report::RunReport;

/// One controller connection. Each text frame is a harness config; the
/// reply is the run report, or `{"error": ...}`.
pub struct WsSession {
    running: bool,
}

impl WsSession {
    pub fn new() -> Self {
        Self { running: false }
    }
}

impl Default for WsSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("controller connected");
    }
}

impl StreamHandler<std::result::Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(
        &mut self,
        msg: std::result::Result<ws::Message, ws::ProtocolError>,
        ctx: &mut Self::Context,
    ) {
        match msg {
            Ok(ws::Message::Text(text)) => {
                if self.running {
                    ctx.text(error_frame("a run is already in progress"));
                    return;
                }
                let config = match HarnessConfig::from_json(&text) {
                    Ok(config) => config,
                    Err(e) => {
                        warn!(error = %e, "rejected config frame");
                        ctx.text(error_frame(&e.to_string()));
                        return;
                    }
                };

                self.running = true;
                ctx.spawn(run_harness(config).into_actor(self).map(|result, act, ctx| {
                    act.running = false;
                    let json = result.and_then(|report| Ok(serde_json::to_string(&report)?));
                    let frame = match json {
                        Ok(json) => json,
                        Err(e) => error_frame(&e.to_string()),
                    };
                    ctx.text(frame);
                }));
            }
            Ok(ws::Message::Ping(bytes)) => ctx.pong(&bytes),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                warn!(error = %e, "websocket protocol error");
                ctx.stop();
            }
            _ => {}
        }
    }
}

async fn run_harness(config: HarnessConfig) -> Result<RunReport> {
    Orchestrator::new(config)?.echo(false).run().await
}

fn error_frame(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

pub async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
) -> std::result::Result<HttpResponse, Error> {
    ws::start(WsSession::new(), &req, stream)
}
