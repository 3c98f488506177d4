use super::session::{Session, SessionEvent};
use crate::config::ClientConfig;
use crate::error::CallError;
use crate::media::MediaSessionFactory;
use crate::negotiation::{NegotiationEngine, NegotiationFlags};
use crate::room::RoomCoordinator;
use crate::signaling::SignalingChannel;
use crate::status::{StatusReporter, StatusSink};
use std::future::Future;
use std::sync::Arc;
use tandem_core::{ConnectError, RelayConnector, Room, SignalingState};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Owns the current [`Session`] and rebuilds it when the call can no longer
/// make progress.
pub struct ConnectionSupervisor<F: MediaSessionFactory> {
    config: ClientConfig,
    connector: Arc<dyn RelayConnector>,
    factory: F,
    status: StatusReporter,
    session: Option<Session<F::Session>>,
    restarts: u32,
}

impl<F: MediaSessionFactory> ConnectionSupervisor<F> {
    pub fn new(
        config: ClientConfig,
        connector: Arc<dyn RelayConnector>,
        factory: F,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            config,
            connector,
            factory,
            status: StatusReporter::new(sink),
            session: None,
            restarts: 0,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    pub fn session(&self) -> Option<&Session<F::Session>> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session<F::Session>> {
        self.session.as_mut()
    }

    pub fn flags(&self) -> Option<NegotiationFlags> {
        self.session.as_ref().map(|session| session.engine().flags())
    }

    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    /// Builds a fresh session and connects it. A connect failure is returned
    /// as is; nothing retries it.
    pub async fn start(&mut self) -> Result<(), CallError> {
        if let Some(previous) = self.session.take() {
            warn!("start() with a live session; closing it first");
            previous.close().await;
        }

        let (candidates_tx, candidates_rx) = mpsc::unbounded_channel();
        let media = self
            .factory
            .create(candidates_tx)
            .await
            .map_err(|e| ConnectError::Media(e.to_string()))?;

        let room = Room::new(self.config.room.clone());
        let channel = SignalingChannel::new(
            self.connector.clone(),
            self.config.connect_params(),
            self.config.retry.clone(),
        );
        let mut coordinator = RoomCoordinator::new(room.clone(), self.config.peer_id.clone());
        self.status.report(coordinator.on_connecting());

        let engine = NegotiationEngine::new(media, room, self.status.clone());
        let mut session = Session::new(
            channel,
            coordinator,
            engine,
            candidates_rx,
            self.status.clone(),
            self.config.retry.max_retry,
        );

        if let Err(e) = session.channel_mut().connect().await {
            error!("Failed to connect to relay: {}", e);
            self.status.failed(&e.to_string());
            session.close().await;
            self.status.report(SignalingState::Disconnected);
            return Err(e.into());
        }

        self.session = Some(session);
        Ok(())
    }

    /// Drops the current session, disposing it completely, then starts a new one.
    pub async fn restart(&mut self) -> Result<(), CallError> {
        self.restarts += 1;
        info!("Restarting call (restart #{})", self.restarts);

        if let Some(session) = self.session.take() {
            session.close().await;
        }
        self.status.clear();
        self.start().await
    }

    pub async fn teardown(mut self) {
        if let Some(session) = self.session.take() {
            session.close().await;
        }
        self.status.report(SignalingState::Disconnected);
        info!("Call torn down");
    }

    /// Waits for one event and handles it.
    pub async fn step(&mut self) -> Result<(), CallError> {
        let session = self.session.as_mut().ok_or(CallError::NoSession)?;
        let event = session.next_event().await;
        self.process(event).await
    }

    /// Drives the call until `shutdown` resolves, then tears it down.
    ///
    /// Returns early with the error if a restart cannot reconnect.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> Result<(), CallError> {
        if self.session.is_none() {
            self.start().await?;
        }
        tokio::pin!(shutdown);

        loop {
            let Some(session) = self.session.as_mut() else {
                return Err(CallError::NoSession);
            };
            let event = tokio::select! {
                () = &mut shutdown => break,
                event = session.next_event() => event,
            };

            if let Err(e) = self.process(event).await {
                self.teardown().await;
                return Err(e);
            }
        }

        self.teardown().await;
        Ok(())
    }

    async fn process(&mut self, event: SessionEvent) -> Result<(), CallError> {
        let session = self.session.as_mut().ok_or(CallError::NoSession)?;
        let handled = session.handle(event).await;

        match handled {
            Ok(()) => Ok(()),
            Err(e) if e.requires_restart() => {
                error!("{}", e);
                self.status.failed(&e.to_string());
                self.restart().await
            }
            Err(CallError::Protocol(e)) => {
                warn!("Dropping relay message: {}", e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
