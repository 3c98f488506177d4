use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tandem_core::{Envelope, event};
use tandem_relay::{RelayConfig, serve_on};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::integration::init_tracing;
use crate::utils::ROOM;

async fn start_relay(token: Option<&str>) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = RelayConfig {
        token: token.map(str::to_string),
        ..RelayConfig::default()
    };

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    tokio::spawn(serve_on(listener, config, async move {
        let _ = stop_rx.await;
    }));
    (addr, stop_tx)
}

fn frame(envelope: &Envelope) -> Message {
    Message::Text(serde_json::to_string(envelope).unwrap().into())
}

#[tokio::test]
async fn test_websocket_peer_creates_room() {
    init_tracing();

    let (addr, _stop) = start_relay(Some("s3cret")).await;
    let url = format!("ws://{}/tandem/ws?peerID=alice&token=s3cret", addr);
    let (ws, _) = connect_async(url).await.expect("connect failed");
    let (mut sink, mut stream) = ws.split();

    sink.send(frame(&Envelope::new(event::CREATE_OR_JOIN, Some(ROOM.into()))))
        .await
        .unwrap();

    let reply = timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("no reply")
        .expect("socket closed")
        .expect("socket error");
    let Message::Text(text) = reply else {
        panic!("expected text frame, got {:?}", reply);
    };
    let envelope: Envelope = serde_json::from_str(text.as_str()).unwrap();
    assert!(envelope.is(event::CREATED));
    assert_eq!(envelope.data, Some(ROOM.into()));
}

#[tokio::test]
async fn test_bad_token_is_rejected() {
    init_tracing();

    let (addr, _stop) = start_relay(Some("s3cret")).await;
    let url = format!("ws://{}/tandem/ws?peerID=mallory&token=guess", addr);

    assert!(connect_async(url).await.is_err());
}
