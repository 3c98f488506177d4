use crate::config::RetryPolicy;
use crate::error::CallError;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tandem_core::{
    ConnectError, ConnectParams, Envelope, RelayConnector, RelayLink, RelayMessage, event,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub enum ChannelEvent {
    Relay(Envelope),
    /// The reconnect timer fired.
    RetryDue,
}

/// Duplex connection to the relay with bounded reconnect.
///
/// `connect` and `disconnect` are reported as synthetic `connect` /
/// `disconnect` events, queued ahead of anything read from the wire.
pub struct SignalingChannel {
    connector: Arc<dyn RelayConnector>,
    params: ConnectParams,
    link: Option<RelayLink>,
    queued: VecDeque<Envelope>,
    retry: RetryPolicy,
    retry_count: u32,
    retry_timer: Option<JoinHandle<()>>,
    retry_tx: mpsc::UnboundedSender<()>,
    retry_rx: mpsc::UnboundedReceiver<()>,
    torn_down: bool,
}

impl SignalingChannel {
    pub fn new(
        connector: Arc<dyn RelayConnector>,
        params: ConnectParams,
        retry: RetryPolicy,
    ) -> Self {
        let (retry_tx, retry_rx) = mpsc::unbounded_channel();
        Self {
            connector,
            params,
            link: None,
            queued: VecDeque::new(),
            retry,
            retry_count: 0,
            retry_timer: None,
            retry_tx,
            retry_rx,
            torn_down: false,
        }
    }

    pub fn params(&self) -> &ConnectParams {
        &self.params
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn retry_pending(&self) -> bool {
        self.retry_timer
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    pub async fn connect(&mut self) -> Result<(), ConnectError> {
        self.params.validate()?;

        info!(
            "Connecting to relay {} as {} (room {})",
            self.params.base_url, self.params.peer_id, self.params.room
        );
        let link = self.connector.connect(&self.params).await?;

        self.link = Some(link);
        self.torn_down = false;
        self.queued.push_back(Envelope::bare(event::CONNECT));
        Ok(())
    }

    /// Called once the `connect` event has been handled.
    pub fn mark_connected(&mut self) {
        self.retry_count = 0;
    }

    /// Fire-and-forget. Nothing is retried at this layer.
    pub fn emit(&self, event: &str, data: Option<Value>) {
        let Some(link) = &self.link else {
            debug!("Relay not connected; dropping `{}`", event);
            return;
        };
        if link.send(Envelope::new(event, data)).is_err() {
            debug!("Relay link closed; dropping `{}`", event);
        }
    }

    pub fn emit_message(&self, msg: &RelayMessage) {
        match serde_json::to_value(msg) {
            Ok(value) => self.emit(event::MESSAGE, Some(value)),
            Err(e) => error!("Failed to serialize {} message: {}", msg.message_type(), e),
        }
    }

    /// Next event in arrival order. Cancel-safe.
    pub async fn next_event(&mut self) -> ChannelEvent {
        if let Some(envelope) = self.queued.pop_front() {
            return ChannelEvent::Relay(envelope);
        }

        let frame = tokio::select! {
            frame = recv_link(&mut self.link) => Some(frame),
            Some(()) = self.retry_rx.recv() => None,
        };

        match frame {
            Some(Some(envelope)) => ChannelEvent::Relay(envelope),
            Some(None) => {
                self.link = None;
                ChannelEvent::Relay(Envelope::bare(event::DISCONNECT))
            }
            None => ChannelEvent::RetryDue,
        }
    }

    /// Applies the reconnect policy to an unexpected disconnect.
    ///
    /// Returns the attempt number when a reconnect was scheduled, `None`
    /// after an intentional teardown.
    pub fn on_disconnect(&mut self) -> Result<Option<u32>, CallError> {
        self.link = None;
        if self.torn_down {
            return Ok(None);
        }

        self.retry_count += 1;
        if self.retry_count >= self.retry.max_retry {
            self.cancel_retry();
            warn!(
                "Relay disconnected {} times; giving up on reconnect",
                self.retry_count
            );
            return Err(CallError::RetryExhausted {
                attempts: self.retry_count,
            });
        }

        self.schedule_retry();
        Ok(Some(self.retry_count))
    }

    fn schedule_retry(&mut self) {
        if self.retry_pending() {
            debug!("Reconnect already scheduled");
            return;
        }

        let delay = self.retry.retry_delay();
        let retry_tx = self.retry_tx.clone();
        info!(
            "Reconnecting in {:?} (attempt {}/{})",
            delay, self.retry_count, self.retry.max_retry
        );
        self.retry_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = retry_tx.send(());
        }));
    }

    fn cancel_retry(&mut self) {
        if let Some(timer) = self.retry_timer.take() {
            timer.abort();
        }
    }

    /// Reconnect attempt after the timer fired. The outcome is queued as a
    /// `connect` or `disconnect` event.
    pub async fn reconnect(&mut self) {
        self.retry_timer = None;
        if self.torn_down || self.link.is_some() {
            return;
        }

        match self.connector.connect(&self.params).await {
            Ok(link) => {
                info!("Reconnected to relay");
                self.link = Some(link);
                self.queued.push_back(Envelope::bare(event::CONNECT));
            }
            Err(e) => {
                warn!("Reconnect failed: {}", e);
                self.queued.push_back(Envelope::bare(event::DISCONNECT));
            }
        }
    }

    /// Closes the transport. Safe to call when never connected.
    pub fn disconnect(&mut self) {
        self.torn_down = true;
        self.cancel_retry();
        self.queued.clear();
        if self.link.take().is_some() {
            info!("Relay link closed");
        }
    }
}

impl Drop for SignalingChannel {
    fn drop(&mut self) {
        self.cancel_retry();
    }
}

async fn recv_link(link: &mut Option<RelayLink>) -> Option<Envelope> {
    match link {
        Some(link) => link.recv().await,
        None => std::future::pending().await,
    }
}
