use tandem_client::{Membership, NegotiationFlags, NegotiationPhase};
use tandem_core::{Envelope, RelayMessage, Role, SignalingState, event};

use crate::integration::{Harness, init_tracing, offer, sent_message};
use crate::utils::next_sent;

#[tokio::test]
async fn test_created_makes_initiator() {
    init_tracing();

    let (mut harness, far) = Harness::connected().await;
    harness.deliver(&far, Envelope::bare(event::CREATED)).await;

    let session = harness.supervisor.session().expect("no session");
    assert_eq!(session.room().role(), Role::Initiator);
    assert_eq!(session.room().membership(), Membership::Created);
    assert_eq!(
        harness.supervisor.flags(),
        Some(NegotiationFlags {
            is_initiator: true,
            is_channel_ready: false,
            is_started: false,
        })
    );
    assert_eq!(harness.supervisor.status().current(), SignalingState::Created);
    assert_eq!(harness.ledger.count("create_offer"), 0);
}

#[tokio::test]
async fn test_joined_makes_responder_and_starts_without_offer() {
    init_tracing();

    let (mut harness, far) = Harness::connected().await;
    harness.deliver(&far, Envelope::bare(event::JOINED)).await;

    let session = harness.supervisor.session().expect("no session");
    assert_eq!(session.room().role(), Role::Responder);
    assert_eq!(
        harness.supervisor.flags(),
        Some(NegotiationFlags {
            is_initiator: false,
            is_channel_ready: true,
            is_started: true,
        })
    );
    assert_eq!(harness.ledger.count("create_offer"), 0);
    assert!(harness.status.saw(SignalingState::Joined));
}

#[tokio::test]
async fn test_join_before_any_ack_makes_responder() {
    init_tracing();

    let (mut harness, mut far) = Harness::connected().await;
    harness.deliver(&far, Envelope::bare(event::JOIN)).await;

    let session = harness.supervisor.session().expect("no session");
    assert_eq!(session.room().role(), Role::Responder);
    assert_eq!(session.room().membership(), Membership::Joining);
    assert_eq!(
        harness.supervisor.flags(),
        Some(NegotiationFlags {
            is_initiator: false,
            is_channel_ready: true,
            is_started: true,
        })
    );
    assert_eq!(harness.ledger.count("create_offer"), 0);

    harness.deliver(&far, offer("v=0 remote")).await;
    assert_eq!(harness.phase(), NegotiationPhase::Established);
    assert!(matches!(
        sent_message(next_sent(&mut far)),
        RelayMessage::Answer { .. }
    ));
    assert_eq!(harness.supervisor.restarts(), 0);
}

#[tokio::test]
async fn test_role_never_changes_once_assigned() {
    init_tracing();

    let (mut harness, far) = Harness::connected().await;
    harness.deliver(&far, Envelope::bare(event::CREATED)).await;
    harness.deliver(&far, Envelope::bare(event::JOINED)).await;
    harness.deliver(&far, Envelope::bare(event::CREATED)).await;

    let session = harness.supervisor.session().expect("no session");
    assert_eq!(session.room().role(), Role::Initiator);
    assert_eq!(session.room().membership(), Membership::Created);
    assert_eq!(harness.supervisor.restarts(), 0);
}

#[tokio::test]
async fn test_unknown_event_is_dropped() {
    init_tracing();

    let (mut harness, far) = Harness::connected().await;
    harness.deliver(&far, Envelope::bare("bye")).await;

    assert_eq!(
        harness.supervisor.status().current(),
        SignalingState::Connected
    );
    assert_eq!(harness.supervisor.restarts(), 0);
}
