use std::time::Duration;
use tandem_client::{CallError, NegotiationFlags};
use tandem_core::{Envelope, SignalingState, event};

use crate::integration::{Harness, init_tracing};
use crate::utils::StatusRecord;

#[tokio::test]
async fn test_restart_resets_flags_and_disposes_first() {
    init_tracing();

    let (mut harness, far) = Harness::connected().await;
    harness.deliver(&far, Envelope::bare(event::CREATED)).await;
    harness.deliver(&far, Envelope::bare(event::JOIN)).await;
    assert_eq!(
        harness.supervisor.flags(),
        Some(NegotiationFlags {
            is_initiator: true,
            is_channel_ready: true,
            is_started: true,
        })
    );

    harness.supervisor.restart().await.unwrap();

    assert_eq!(harness.supervisor.flags(), Some(NegotiationFlags::default()));
    assert_eq!(harness.supervisor.restarts(), 1);

    let calls = harness.ledger.calls();
    let dispose = calls.iter().position(|c| c == "1:dispose").unwrap();
    let create = calls.iter().position(|c| c == "2:create").unwrap();
    assert!(dispose < create);
    assert_eq!(harness.ledger.max_live(), 1);
    assert!(harness.status.records().contains(&StatusRecord::Cleared));

    // The old link is gone; the new session connects on its own.
    harness.supervisor.step().await.unwrap();
    assert_eq!(
        harness.supervisor.status().current(),
        SignalingState::Connected
    );
}

#[tokio::test]
async fn test_negotiation_failure_restarts_session() {
    init_tracing();

    let (mut harness, far) = Harness::connected().await;
    harness.ledger.fail_create_offer(true);
    harness.deliver(&far, Envelope::bare(event::CREATED)).await;
    harness.deliver(&far, Envelope::bare(event::JOIN)).await;

    assert_eq!(harness.supervisor.restarts(), 1);
    assert_eq!(harness.supervisor.flags(), Some(NegotiationFlags::default()));
    assert_eq!(harness.connector.attempts(), 2);
    assert_eq!(harness.ledger.disposed(), 1);
    assert!(
        harness
            .status
            .failures()
            .iter()
            .any(|reason| reason.contains("create offer failed"))
    );
}

#[tokio::test]
async fn test_remote_description_failure_restarts_session() {
    init_tracing();

    let (mut harness, far) = Harness::connected().await;
    harness.ledger.fail_set_remote(true);
    harness.deliver(&far, Envelope::bare(event::JOINED)).await;
    harness
        .deliver(&far, crate::integration::offer("v=0 remote"))
        .await;

    assert_eq!(harness.supervisor.restarts(), 1);
    assert_eq!(harness.ledger.count("create_answer"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_start_is_not_retried() {
    init_tracing();

    let mut harness = Harness::new();
    harness.connector.fail_next(1);

    let err = harness.supervisor.start().await.unwrap_err();
    assert!(matches!(err, CallError::Connect(_)));
    assert!(harness.supervisor.session().is_none());
    assert_eq!(harness.ledger.created(), 1);
    assert_eq!(harness.ledger.live(), 0);
    assert_eq!(harness.status.failures().len(), 1);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(harness.connector.attempts(), 1);
    assert!(matches!(
        harness.supervisor.step().await,
        Err(CallError::NoSession)
    ));
}
