use crate::error::ConnectError;
use crate::model::{Envelope, PeerId, Room};
use async_trait::async_trait;
use tokio::sync::mpsc;
use url::Url;

/// Everything needed to reach the relay for one participant.
#[derive(Debug, Clone)]
pub struct ConnectParams {
    pub base_url: String,
    pub path: String,
    pub auth_token: String,
    pub peer_id: PeerId,
    pub room: Room,
}

impl ConnectParams {
    pub fn validate(&self) -> Result<(), ConnectError> {
        if self.base_url.trim().is_empty() {
            return Err(ConnectError::MissingParameter("relay url"));
        }
        if self.peer_id.as_str().is_empty() {
            return Err(ConnectError::MissingParameter("peer id"));
        }
        if self.room.id().is_empty() {
            return Err(ConnectError::MissingParameter("room"));
        }
        Ok(())
    }

    /// `<base><path>?peerID=<id>&token=<token>`
    pub fn endpoint(&self) -> Result<Url, ConnectError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ConnectError::InvalidUrl(e.to_string()))?;
        if !self.path.is_empty() {
            url.set_path(&self.path);
        }
        url.query_pairs_mut()
            .append_pair("peerID", self.peer_id.as_str())
            .append_pair("token", &self.auth_token);
        Ok(url)
    }
}

/// One end of an open relay connection.
///
/// Dropping the link closes the connection; the peer end then observes
/// `recv()` returning `None`.
pub struct RelayLink {
    outbound: mpsc::UnboundedSender<Envelope>,
    inbound: mpsc::UnboundedReceiver<Envelope>,
}

impl RelayLink {
    pub fn new(
        outbound: mpsc::UnboundedSender<Envelope>,
        inbound: mpsc::UnboundedReceiver<Envelope>,
    ) -> Self {
        Self { outbound, inbound }
    }

    /// Two crossed links: whatever one sends, the other receives.
    pub fn duplex() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        (Self::new(a_tx, a_rx), Self::new(b_tx, b_rx))
    }

    pub fn send(&self, envelope: Envelope) -> Result<(), Envelope> {
        self.outbound.send(envelope).map_err(|e| e.0)
    }

    pub async fn recv(&mut self) -> Option<Envelope> {
        self.inbound.recv().await
    }

    /// Next envelope if one is already waiting.
    pub fn try_recv(&mut self) -> Option<Envelope> {
        self.inbound.try_recv().ok()
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<Envelope> {
        self.outbound.clone()
    }
}

#[async_trait]
pub trait RelayConnector: Send + Sync {
    async fn connect(&self, params: &ConnectParams) -> Result<RelayLink, ConnectError>;
}
