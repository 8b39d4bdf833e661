//! Miner Bot
//!
//! The only role that produces blocks. Block production fires on fixed
//! delays; an empty mempool skips the slot.

use std::time::Duration;
use tracing::{debug, warn};

use crate::chain::{codec::BlockMessage, producer::produce_block};
use crate::config::{duration_from_secs, MinerSettings};
use crate::node::{
    state::PeerState,
    transport::{RoleAction, ScheduledTask},
};

#[derive(Debug, Clone)]
pub struct Miner {
    block_delays: Vec<Duration>,
    blocks_mined: u32,
}

impl Miner {
    pub fn new(settings: &MinerSettings) -> Self {
        Self {
            block_delays: settings
                .block_delays_secs
                .iter()
                .map(|secs| duration_from_secs(*secs))
                .collect(),
            blocks_mined: 0,
        }
    }

    /// One one-shot task per configured delay: mine_block1, mine_block2, ...
    pub fn startup_tasks(&self) -> Vec<ScheduledTask> {
        self.block_delays
            .iter()
            .enumerate()
            .map(|(i, delay)| ScheduledTask::once(format!("mine_block{}", i + 1), RoleAction::MineBlock, *delay))
            .collect()
    }

    /// Produce a block from the mempool and return its announcement
    pub fn mine(&mut self, state: &mut PeerState, now: f64) -> Option<BlockMessage> {
        let Some(block) = produce_block(state, now) else {
            debug!("Mempool empty, no block produced");
            return None;
        };
        self.blocks_mined += 1;

        match BlockMessage::from_block(&block) {
            Ok(msg) => Some(msg),
            Err(e) => {
                warn!("Failed to encode block #{}: {}", block.index, e);
                None
            }
        }
    }

    pub fn blocks_mined(&self) -> u32 {
        self.blocks_mined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::transaction::Transaction;
    use crate::config::SimulationConfig;

    #[test]
    fn test_startup_tasks() {
        let miner = Miner::new(&MinerSettings {
            block_delays_secs: vec![3.0, 7.0],
        });
        let tasks = miner.startup_tasks();

        assert_eq!(tasks[0].name, "mine_block1");
        assert_eq!(tasks[0].delay, Duration::from_secs(3));
        assert_eq!(tasks[1].delay, Duration::from_secs(7));
        assert!(tasks.iter().all(|t| t.interval.is_none() && t.action == RoleAction::MineBlock));
    }

    #[test]
    fn test_mine_counts_blocks() {
        let config = SimulationConfig::default();
        let mut miner = Miner::new(&config.roles.miner);
        let mut state = PeerState::new(&config.initial_balances, &config.initial_reserves, config.fee());

        assert!(miner.mine(&mut state, 3.0).is_none());
        assert_eq!(miner.blocks_mined(), 0);

        state.mempool.insert(Transaction::transfer("miner", "user", "TokenA", 1.0));
        let msg = miner.mine(&mut state, 3.0).unwrap();

        assert_eq!(msg.index, 1);
        assert_eq!(miner.blocks_mined(), 1);
    }
}
