use crate::RelayService;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tandem_core::{Envelope, PeerId, RelayLink};
use tracing::{error, info, warn};

#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    #[serde(rename = "peerID")]
    pub peer_id: Option<String>,
    pub token: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<ConnectQuery>,
    State(service): State<RelayService>,
) -> Response {
    if !service.authorize(query.token.as_deref()) {
        warn!("Rejected connection with a bad token");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let peer_id = query
        .peer_id
        .filter(|id| !id.is_empty())
        .map(PeerId::from)
        .unwrap_or_default();

    ws.on_upgrade(move |socket| handle_socket(socket, peer_id, service))
        .into_response()
}

async fn handle_socket(socket: WebSocket, peer_id: PeerId, service: RelayService) {
    info!("New WebSocket connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let (mut link, relay_end) = RelayLink::duplex();
    let inbound = link.sender();

    tokio::spawn(service.serve(relay_end, peer_id.clone()));

    let mut send_task = tokio::spawn(async move {
        while let Some(envelope) = link.recv().await {
            let json = match serde_json::to_string(&envelope) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize `{}` frame: {}", envelope.event, e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let peer_id = peer_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<Envelope>(text.as_str()) {
                        Ok(envelope) => {
                            if inbound.send(envelope).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid frame from {}: {}", peer_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    info!("WebSocket disconnected: {}", peer_id);
}
