//! What a peer needs from the messaging substrate
//!
//! Peer discovery, framing and delivery live behind [`Transport`]. A peer
//! only broadcasts, lists peers, schedules its own actions and reads the clock.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::chain::codec::NetworkMessage;

pub type PeerId = u32;

/// Work a role schedules for itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleAction {
    MineBlock,
    ProvideLiquidity,
    WhaleSwap,
}

/// A delayed, optionally repeating, role action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub name: String,
    pub action: RoleAction,
    pub delay: Duration,
    /// `None` fires once
    pub interval: Option<Duration>,
}

impl ScheduledTask {
    pub fn once(name: impl Into<String>, action: RoleAction, delay: Duration) -> Self {
        Self {
            name: name.into(),
            action,
            delay,
            interval: None,
        }
    }

    pub fn repeating(name: impl Into<String>, action: RoleAction, delay: Duration, interval: Duration) -> Self {
        Self {
            name: name.into(),
            action,
            delay,
            interval: Some(interval),
        }
    }
}

/// The substrate as seen from one peer
pub trait Transport {
    /// Fire-and-forget delivery to every other known peer
    fn broadcast(&mut self, msg: NetworkMessage);

    /// Currently known peers, excluding ourselves
    fn peers(&self) -> Vec<PeerId>;

    /// Run `task.action` on this peer after `task.delay`
    fn schedule(&mut self, task: ScheduledTask);

    /// Local clock in seconds
    fn now(&self) -> f64;
}
