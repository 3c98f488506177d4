use std::time::Duration;
use tandem_core::{Envelope, RelayLink, event};
use tandem_relay::RelayService;
use tokio::time::timeout;

pub const ROOM: &str = "lobby";

/// Next event the relay sent to `link`, failing after a second.
pub async fn recv_event(link: &mut RelayLink) -> Envelope {
    timeout(Duration::from_secs(1), link.recv())
        .await
        .expect("timed out waiting for relay event")
        .expect("relay closed the link")
}

/// Asserts nothing arrives on `link` for a short while.
pub async fn assert_silent(link: &mut RelayLink) {
    if let Ok(Some(envelope)) = timeout(Duration::from_millis(100), link.recv()).await {
        panic!("unexpected `{}` event", envelope.event);
    }
}

pub fn create_or_join(link: &RelayLink, room: &str) {
    link.send(Envelope::new(event::CREATE_OR_JOIN, Some(room.into())))
        .expect("relay gone");
}

pub fn send_message(link: &RelayLink, payload: serde_json::Value) {
    link.send(Envelope::new(event::MESSAGE, Some(payload)))
        .expect("relay gone");
}

/// Polls until the relay holds `expected` rooms, giving up after a second.
pub async fn wait_for_room_count(relay: &RelayService, expected: usize) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while tokio::time::Instant::now() < deadline {
        if relay.rooms().room_count() == expected {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    relay.rooms().room_count() == expected
}
