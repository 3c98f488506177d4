use std::sync::Arc;
use tandem_core::SignalingState;
use tokio::sync::watch;
use tracing::{info, warn};

/// Display side of the client. The core never depends on how, or whether,
/// any of this is rendered.
pub trait StatusSink: Send + Sync {
    fn report(&self, state: SignalingState);

    fn retrying(&self, attempt: u32, max: u32) {
        let _ = (attempt, max);
    }

    fn failed(&self, reason: &str) {
        let _ = reason;
    }

    fn clear(&self) {}
}

/// Writes status changes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatus;

impl StatusSink for TracingStatus {
    fn report(&self, state: SignalingState) {
        info!("status: {}", state);
    }

    fn retrying(&self, attempt: u32, max: u32) {
        warn!("status: retrying ({}/{})", attempt, max);
    }

    fn failed(&self, reason: &str) {
        warn!("status: failed: {}", reason);
    }
}

#[derive(Clone)]
pub struct StatusReporter {
    sink: Arc<dyn StatusSink>,
    state: Arc<watch::Sender<SignalingState>>,
}

impl StatusReporter {
    pub fn new(sink: Arc<dyn StatusSink>) -> Self {
        let (state, _) = watch::channel(SignalingState::Disconnected);
        Self {
            sink,
            state: Arc::new(state),
        }
    }

    pub fn report(&self, state: SignalingState) {
        self.state.send_replace(state);
        self.sink.report(state);
    }

    pub fn retrying(&self, attempt: u32, max: u32) {
        self.sink.retrying(attempt, max);
    }

    pub fn failed(&self, reason: &str) {
        self.sink.failed(reason);
    }

    pub fn clear(&self) {
        self.state.send_replace(SignalingState::Disconnected);
        self.sink.clear();
    }

    pub fn current(&self) -> SignalingState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SignalingState> {
        self.state.subscribe()
    }
}
