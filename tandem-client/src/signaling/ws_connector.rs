use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tandem_core::{ConnectError, ConnectParams, Envelope, RelayConnector, RelayLink};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

enum Pumped<T> {
    Outbound(Option<Envelope>),
    Inbound(Option<T>),
}

/// Connects to the relay over WebSocket, one JSON text frame per event.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

#[async_trait]
impl RelayConnector for WsConnector {
    async fn connect(&self, params: &ConnectParams) -> Result<RelayLink, ConnectError> {
        let endpoint = params.endpoint()?;
        let (ws, _) = connect_async(endpoint.as_str())
            .await
            .map_err(|e| ConnectError::Transport(e.to_string()))?;
        info!("WebSocket connected to {}", endpoint);

        let (local, mut remote) = RelayLink::duplex();
        let (mut sink, mut stream) = ws.split();

        tokio::spawn(async move {
            loop {
                let pumped = tokio::select! {
                    outbound = remote.recv() => Pumped::Outbound(outbound),
                    inbound = stream.next() => Pumped::Inbound(inbound),
                };

                match pumped {
                    Pumped::Outbound(None) => {
                        let _ = sink.close().await;
                        break;
                    }
                    Pumped::Outbound(Some(envelope)) => {
                        let text = match serde_json::to_string(&envelope) {
                            Ok(text) => text,
                            Err(e) => {
                                warn!("Failed to encode `{}` frame: {}", envelope.event, e);
                                continue;
                            }
                        };
                        if sink.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    Pumped::Inbound(Some(Ok(Message::Text(text)))) => {
                        match serde_json::from_str::<Envelope>(text.as_str()) {
                            Ok(envelope) => {
                                if remote.send(envelope).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Dropping undecodable relay frame: {}", e),
                        }
                    }
                    Pumped::Inbound(Some(Ok(Message::Close(_)))) | Pumped::Inbound(None) => break,
                    Pumped::Inbound(Some(Ok(_))) => {}
                    Pumped::Inbound(Some(Err(e))) => {
                        debug!("WebSocket error: {}", e);
                        break;
                    }
                }
            }
            debug!("WebSocket pump stopped");
        });

        Ok(local)
    }
}
