use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tandem_client::{
    IceCandidate, MediaError, MediaSession, MediaSessionFactory, SessionDescription,
};
use tokio::sync::mpsc;

/// Shared view into every media session a [`MockMediaFactory`] hands out.
#[derive(Default)]
pub struct MediaLedger {
    calls: Mutex<Vec<String>>,
    live: AtomicUsize,
    max_live: AtomicUsize,
    created: AtomicUsize,
    disposed: AtomicUsize,
    fail_create_offer: AtomicBool,
    fail_create_answer: AtomicBool,
    fail_set_remote: AtomicBool,
    candidates: Mutex<Vec<mpsc::UnboundedSender<IceCandidate>>>,
}

impl MediaLedger {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    /// Every call made, prefixed with the session number: `"1:create_offer"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split_once(':').is_some_and(|(_, name)| name == call))
            .count()
    }

    /// Candidates applied, in application order.
    pub fn applied_candidates(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|c| c.split_once(":add_ice_candidate "))
            .map(|(_, line)| line.to_string())
            .collect()
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn disposed(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn fail_create_offer(&self, fail: bool) {
        self.fail_create_offer.store(fail, Ordering::SeqCst);
    }

    pub fn fail_create_answer(&self, fail: bool) {
        self.fail_create_answer.store(fail, Ordering::SeqCst);
    }

    pub fn fail_set_remote(&self, fail: bool) {
        self.fail_set_remote.store(fail, Ordering::SeqCst);
    }

    /// Pretends the newest session discovered a local candidate.
    pub fn discover_candidate(&self, line: &str) {
        let candidates = self.candidates.lock().unwrap();
        let tx = candidates.last().expect("no media session created");
        tx.send(IceCandidate {
            mid: "0".to_string(),
            media_line_index: 0,
            candidate: line.to_string(),
        })
        .expect("candidate receiver dropped");
    }
}

#[derive(Clone, Default)]
pub struct MockMediaFactory {
    ledger: Arc<MediaLedger>,
}

impl MockMediaFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> Arc<MediaLedger> {
        self.ledger.clone()
    }
}

#[async_trait]
impl MediaSessionFactory for MockMediaFactory {
    type Session = MockMedia;

    async fn create(
        &self,
        candidates: mpsc::UnboundedSender<IceCandidate>,
    ) -> Result<MockMedia, MediaError> {
        let id = self.ledger.created.fetch_add(1, Ordering::SeqCst) + 1;
        let live = self.ledger.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.ledger.max_live.fetch_max(live, Ordering::SeqCst);
        self.ledger.candidates.lock().unwrap().push(candidates);
        self.ledger.record(format!("{}:create", id));

        Ok(MockMedia {
            id,
            ledger: self.ledger.clone(),
        })
    }
}

pub struct MockMedia {
    id: usize,
    ledger: Arc<MediaLedger>,
}

impl MockMedia {
    fn record(&self, call: &str) {
        self.ledger.record(format!("{}:{}", self.id, call));
    }

    fn failure(&self, flag: &AtomicBool, what: &str) -> Result<(), MediaError> {
        if flag.load(Ordering::SeqCst) {
            return Err(MediaError::Other(format!("{} refused", what)));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaSession for MockMedia {
    async fn create_offer(&self) -> Result<SessionDescription, MediaError> {
        self.record("create_offer");
        self.failure(&self.ledger.fail_create_offer, "offer")?;
        Ok(SessionDescription::offer(format!("v=0 offer-{}", self.id)))
    }

    async fn create_answer(&self) -> Result<SessionDescription, MediaError> {
        self.record("create_answer");
        self.failure(&self.ledger.fail_create_answer, "answer")?;
        Ok(SessionDescription::answer(format!("v=0 answer-{}", self.id)))
    }

    async fn set_local_description(&self, _desc: SessionDescription) -> Result<(), MediaError> {
        self.record("set_local_description");
        Ok(())
    }

    async fn set_remote_description(&self, _desc: SessionDescription) -> Result<(), MediaError> {
        self.record("set_remote_description");
        self.failure(&self.ledger.fail_set_remote, "remote description")
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), MediaError> {
        self.record(&format!("add_ice_candidate {}", candidate.candidate));
        Ok(())
    }

    async fn dispose(&self) {
        self.record("dispose");
        self.ledger.disposed.fetch_add(1, Ordering::SeqCst);
        self.ledger.live.fetch_sub(1, Ordering::SeqCst);
    }
}
