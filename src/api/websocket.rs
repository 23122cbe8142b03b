//! Live change feed over WebSocket.
//!
//! Streams [`WsEventMessage`]s to connected clients. Events only tell
//! clients which views to re-fetch. Each frame also carries `for_my_zone`,
//! set when a new defect targets the viewer's zone, so group leader
//! dashboards can flag it.
//!
//! # Authentication
//! The connection is authenticated before upgrading, with the same session
//! as the REST API (`Authorization: Bearer` header or `ldt_session` cookie).

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use actix_ws::{Message, Session};
use futures_util::StreamExt;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::SessionAuth;
use crate::models::{WsEvent, WsEventMessage, Zone};
use crate::services::EventBroadcaster;

/// Ping interval for keeping connections alive.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Timeout for receiving pong response.
const PONG_TIMEOUT: Duration = Duration::from_secs(10);

/// Frame sent to a client.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Frame<'a> {
    Event {
        #[serde(flatten)]
        message: &'a WsEventMessage,
        for_my_zone: bool,
    },
    /// Events were dropped for this client; it should re-fetch everything.
    Resync {
        #[serde(rename = "type")]
        kind: &'static str,
        missed: u64,
    },
}

impl<'a> Frame<'a> {
    fn event(message: &'a WsEventMessage, viewer_zone: Option<Zone>) -> Self {
        Frame::Event {
            message,
            for_my_zone: concerns_zone(&message.event, viewer_zone),
        }
    }

    fn resync(missed: u64) -> Self {
        Frame::Resync {
            kind: "resync",
            missed,
        }
    }
}

/// Whether `event` is a new defect aimed at `zone`.
fn concerns_zone(event: &WsEvent, zone: Option<Zone>) -> bool {
    match (event, zone) {
        (WsEvent::DefectCreated(p), Some(zone)) => p.targeted_zones.contains(&zone),
        _ => false,
    }
}

/// Per-connection state.
struct Connection {
    session: Session,
    client_addr: String,
    user_id: Uuid,
    zone: Option<Zone>,
    last_pong: Instant,
    delivered: u64,
}

impl Connection {
    async fn send(&mut self, frame: &Frame<'_>) -> ControlFlow<()> {
        let json = match serde_json::to_string(frame) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize event");
                return ControlFlow::Continue(());
            }
        };
        if self.session.text(json).await.is_err() {
            warn!(client = %self.client_addr, "Failed to send event, closing connection");
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }

    async fn on_client_message(&mut self, msg: Message) -> ControlFlow<()> {
        match msg {
            Message::Ping(bytes) => {
                if self.session.pong(&bytes).await.is_err() {
                    return ControlFlow::Break(());
                }
            }
            Message::Pong(_) => self.last_pong = Instant::now(),
            Message::Text(text) => {
                debug!(client = %self.client_addr, message = %text, "Ignoring client text message");
            }
            Message::Close(reason) => {
                info!(client = %self.client_addr, reason = ?reason, "Client requested close");
                return ControlFlow::Break(());
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }

    async fn on_broadcast(&mut self, result: Result<WsEventMessage, RecvError>) -> ControlFlow<()> {
        match result {
            Ok(message) => {
                let frame = Frame::event(&message, self.zone);
                let flow = self.send(&frame).await;
                if flow.is_continue() {
                    self.delivered += 1;
                }
                flow
            }
            Err(RecvError::Lagged(missed)) => {
                warn!(client = %self.client_addr, missed, "Client lagged, requesting resync");
                self.send(&Frame::resync(missed)).await
            }
            Err(RecvError::Closed) => {
                info!(client = %self.client_addr, "Broadcast channel closed");
                ControlFlow::Break(())
            }
        }
    }

    async fn on_tick(&mut self) -> ControlFlow<()> {
        if self.last_pong.elapsed() > PING_INTERVAL + PONG_TIMEOUT {
            warn!(client = %self.client_addr, "Pong timeout, closing connection");
            return ControlFlow::Break(());
        }
        if self.session.ping(b"").await.is_err() {
            warn!(client = %self.client_addr, "Failed to send ping, closing connection");
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}

/// Authenticate, then upgrade to a WebSocket.
///
/// Unauthenticated requests get a plain HTTP 401 instead of an open socket.
pub async fn websocket_handler(
    req: HttpRequest,
    stream: web::Payload,
    broadcaster: web::Data<EventBroadcaster>,
) -> Result<HttpResponse, actix_web::Error> {
    let auth = {
        let mut payload = actix_web::dev::Payload::None;
        SessionAuth::from_request(&req, &mut payload).await
    };

    let client_addr = req
        .connection_info()
        .realip_remote_addr()
        .map(String::from)
        .unwrap_or_else(|| "unknown".to_string());

    let auth = match auth {
        Ok(auth) => auth,
        Err(err) => {
            warn!(client = %client_addr, "WebSocket authentication failed");
            return Ok(err.error_response());
        }
    };

    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;

    info!(
        client = %client_addr,
        user_id = %auth.principal.user_id,
        role = %auth.principal.role(),
        "WebSocket connection established"
    );

    let connection = Connection {
        session,
        client_addr,
        user_id: auth.principal.user_id,
        zone: auth.principal.zone(),
        last_pong: Instant::now(),
        delivered: 0,
    };
    actix_web::rt::spawn(run_connection(
        connection,
        msg_stream,
        broadcaster.get_ref().clone(),
    ));

    Ok(response)
}

async fn run_connection(
    mut conn: Connection,
    mut msg_stream: actix_ws::MessageStream,
    broadcaster: EventBroadcaster,
) {
    let mut rx = broadcaster.subscribe();
    let mut ping_interval = tokio::time::interval(PING_INTERVAL);

    loop {
        let flow = tokio::select! {
            Some(msg) = msg_stream.next() => match msg {
                Ok(msg) => conn.on_client_message(msg).await,
                Err(e) => {
                    warn!(client = %conn.client_addr, error = %e, "WebSocket message error");
                    ControlFlow::Break(())
                }
            },
            result = rx.recv() => conn.on_broadcast(result).await,
            _ = ping_interval.tick() => conn.on_tick().await,
        };
        if flow.is_break() {
            break;
        }
    }

    info!(
        client = %conn.client_addr,
        user_id = %conn.user_id,
        delivered = conn.delivered,
        "WebSocket connection closed"
    );
    let _ = conn.session.close(None).await;
}

/// Configure WebSocket routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws").route(web::get().to(websocket_handler)));
}
