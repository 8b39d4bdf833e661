//! Peers and the substrate interface they run against

pub mod peer;
pub mod state;
pub mod transport;

pub use peer::{PeerNode, PeerReport};
pub use state::{PeerState, StateSummary};
pub use transport::{PeerId, RoleAction, ScheduledTask, Transport};
