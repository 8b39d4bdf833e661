//! Error types for the simulator

use thiserror::Error;

use crate::node::PeerId;

/// Errors surfaced by configuration, codecs and the network substrates
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("unknown peer {0}")]
    UnknownPeer(PeerId),

    #[error("peer {0} inbox closed")]
    ChannelClosed(PeerId),

    #[error("peer task failed: {0}")]
    TaskFailed(String),
}

/// Reasons a received block is discarded without touching the local chain
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BlockRejection {
    #[error("prev hash {got} does not extend local tip {expected}")]
    PrevHashMismatch { expected: String, got: String },

    #[error("advertised hash {advertised} does not match recomputed {computed}")]
    HashMismatch { advertised: String, computed: String },

    #[error("malformed transaction payload: {0}")]
    MalformedPayload(String),
}

pub type SimResult<T> = std::result::Result<T, SimError>;
