
use std::sync::Arc;
use std::time::Duration;
use tandem_client::{CallError, ClientConfig, ConnectionSupervisor, NegotiationPhase, RetryPolicy};
use tandem_core::{Envelope, IceCandidateMessage, RelayLink, RelayMessage, SignalingState, event};
use tandem_relay::RelayService;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::Level;

use crate::utils::{MediaLedger, MockConnector, MockMediaFactory, RecordingStatus, next_sent};

pub const ROOM: &str = "lobby";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn test_config() -> ClientConfig {
    ClientConfig::new("ws://relay.test", ROOM)
        .with_peer_id("alice")
        .with_retry(RetryPolicy::default())
}

/// A supervisor wired to in-memory relay and media mocks.
pub struct Harness {
    pub supervisor: ConnectionSupervisor<MockMediaFactory>,
    pub connector: Arc<MockConnector>,
    pub ledger: Arc<MediaLedger>,
    pub status: Arc<RecordingStatus>,
}

impl Harness {
    pub fn new() -> Self {
        let connector = Arc::new(MockConnector::new());
        let factory = MockMediaFactory::new();
        let ledger = factory.ledger();
        let status = Arc::new(RecordingStatus::new());
        let supervisor =
            ConnectionSupervisor::new(test_config(), connector.clone(), factory, status.clone());

        Self {
            supervisor,
            connector,
            ledger,
            status,
        }
    }

    /// Starts the call and handles the `connect` event. Returns the relay's
    /// end of the connection with the `create or join` request consumed.
    pub async fn connected() -> (Self, RelayLink) {
        let mut harness = Self::new();
        harness.supervisor.start().await.expect("start failed");
        harness.supervisor.step().await.expect("connect failed");

        let mut far = harness.connector.take_far_end();
        let request = next_sent(&mut far);
        assert!(request.is(event::CREATE_OR_JOIN));
        assert_eq!(request.data, Some(ROOM.into()));
        (harness, far)
    }

    /// Hands `envelope` to the client and lets it handle exactly that event.
    pub async fn deliver(&mut self, far: &RelayLink, envelope: Envelope) {
        far.send(envelope).expect("client link closed");
        self.supervisor.step().await.expect("event escalated");
    }

    pub fn phase(&self) -> NegotiationPhase {
        self.supervisor
            .session()
            .expect("no session")
            .engine()
            .phase()
    }
}

pub fn message(msg: RelayMessage) -> Envelope {
    Envelope::message(&msg).expect("message serializes")
}

pub fn offer(sdp: &str) -> Envelope {
    message(RelayMessage::Offer {
        room: ROOM.to_string(),
        sdp: sdp.to_string(),
    })
}

pub fn answer(sdp: &str) -> Envelope {
    message(RelayMessage::Answer {
        room: ROOM.to_string(),
        sdp: sdp.to_string(),
    })
}

pub fn candidate(line: &str) -> Envelope {
    message(RelayMessage::Candidate(IceCandidateMessage {
        media_line_index: 0,
        mid: "0".to_string(),
        candidate: line.to_string(),
        room: ROOM.to_string(),
    }))
}

/// Decodes a `message` frame the client sent.
pub fn sent_message(envelope: Envelope) -> RelayMessage {
    assert!(envelope.is(event::MESSAGE), "expected message, got {}", envelope.event);
    serde_json::from_value(envelope.data.expect("message without payload"))
        .expect("message decodes")
}

/// A client running its own event loop against an in-process relay.
pub struct RelayPeer {
    pub ledger: Arc<MediaLedger>,
    pub status: Arc<RecordingStatus>,
    state: watch::Receiver<SignalingState>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<Result<(), CallError>>,
}

impl RelayPeer {
    pub async fn spawn(relay: &RelayService, peer_id: &str) -> Self {
        let factory = MockMediaFactory::new();
        let ledger = factory.ledger();
        let status = Arc::new(RecordingStatus::new());
        let mut supervisor = ConnectionSupervisor::new(
            test_config().with_peer_id(peer_id),
            Arc::new(relay.clone()),
            factory,
            status.clone(),
        );
        let state = supervisor.status().subscribe();
        supervisor.start().await.expect("start failed");

        let (shutdown, stop) = oneshot::channel::<()>();
        let task = tokio::spawn(supervisor.run(async move {
            let _ = stop.await;
        }));

        Self {
            ledger,
            status,
            state,
            shutdown,
            task,
        }
    }

    pub async fn wait_for(&mut self, target: SignalingState) {
        timeout(Duration::from_secs(5), self.state.wait_for(|s| *s == target))
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {}", target))
            .expect("status channel closed");
    }

    pub async fn stop(self) -> Result<(), CallError> {
        let _ = self.shutdown.send(());
        self.task.await.expect("client task panicked")
    }
}

/// Polls `condition` until it holds or five seconds pass.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
