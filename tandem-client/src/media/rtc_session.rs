use crate::error::MediaError;
use crate::media::{IceCandidate, MediaSession, MediaSessionFactory, SessionDescription};
use async_trait::async_trait;
use std::sync::Arc;
use tandem_core::{IceServerConfig, SdpKind};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;

#[derive(Debug, Clone)]
pub struct RtcMediaFactory {
    ice_servers: Vec<IceServerConfig>,
}

impl RtcMediaFactory {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self { ice_servers }
    }
}

#[async_trait]
impl MediaSessionFactory for RtcMediaFactory {
    type Session = RtcMediaSession;

    async fn create(
        &self,
        candidates: mpsc::UnboundedSender<IceCandidate>,
    ) -> Result<RtcMediaSession, MediaError> {
        RtcMediaSession::new(&self.ice_servers, candidates).await
    }
}

/// Media session backed by a `webrtc` peer connection.
///
/// Sends and receives audio; the video transceiver is negotiated inactive.
pub struct RtcMediaSession {
    peer_connection: Arc<RTCPeerConnection>,
}

impl RtcMediaSession {
    pub async fn new(
        ice_servers: &[IceServerConfig],
        candidates: mpsc::UnboundedSender<IceCandidate>,
    ) -> Result<Self, MediaError> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        peer_connection
            .add_transceiver_from_kind(RTPCodecType::Audio, None)
            .await?;
        peer_connection
            .add_transceiver_from_kind(
                RTPCodecType::Video,
                Some(RTCRtpTransceiverInit {
                    direction: RTCRtpTransceiverDirection::Inactive,
                    send_encodings: vec![],
                }),
            )
            .await?;

        peer_connection.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let candidates = candidates.clone();
            Box::pin(async move {
                let Some(candidate) = candidate else {
                    debug!("ICE gathering complete");
                    return;
                };
                match candidate.to_json() {
                    Ok(init) => {
                        let _ = candidates.send(IceCandidate {
                            mid: init.sdp_mid.unwrap_or_default(),
                            media_line_index: init.sdp_mline_index.unwrap_or_default(),
                            candidate: init.candidate,
                        });
                    }
                    Err(e) => warn!("Failed to serialize local ICE candidate: {}", e),
                }
            })
        }));

        peer_connection.on_peer_connection_state_change(Box::new(|state| {
            info!("Peer connection state: {}", state);
            Box::pin(async {})
        }));

        peer_connection.on_track(Box::new(|track, _receiver, _transceiver| {
            info!("Remote {} track received", track.kind());
            Box::pin(async {})
        }));

        Ok(Self { peer_connection })
    }
}

fn to_rtc(desc: SessionDescription) -> Result<RTCSessionDescription, MediaError> {
    let desc = match desc.kind {
        SdpKind::Offer => RTCSessionDescription::offer(desc.sdp)?,
        SdpKind::Answer => RTCSessionDescription::answer(desc.sdp)?,
    };
    Ok(desc)
}

#[async_trait]
impl MediaSession for RtcMediaSession {
    async fn create_offer(&self) -> Result<SessionDescription, MediaError> {
        let offer = self.peer_connection.create_offer(None).await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription, MediaError> {
        let answer = self.peer_connection.create_answer(None).await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), MediaError> {
        self.peer_connection
            .set_local_description(to_rtc(desc)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), MediaError> {
        self.peer_connection
            .set_remote_description(to_rtc(desc)?)
            .await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), MediaError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: Some(candidate.mid),
            sdp_mline_index: Some(candidate.media_line_index),
            username_fragment: None,
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn dispose(&self) {
        if let Err(e) = self.peer_connection.close().await {
            warn!("Failed to close peer connection: {}", e);
        }
    }
}
