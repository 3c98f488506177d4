/// Negotiation guards. Each is set at most once per session; a restart
/// replaces the whole set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NegotiationFlags {
    pub is_initiator: bool,
    pub is_channel_ready: bool,
    pub is_started: bool,
}

impl NegotiationFlags {
    pub fn can_start(&self) -> bool {
        !self.is_started && self.is_channel_ready
    }
}
