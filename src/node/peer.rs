//! Peer Node
//!
//! One simulated participant: its role behaviour plus the state it owns.
//! Scheduled actions and inbound messages are the only entry points and
//! each runs to completion before the next.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bots::{Behavior, Role, SniperStats};
use crate::chain::{codec::NetworkMessage, transaction::Transaction, validator::accept_block};
use crate::config::{PeerSpec, SimulationConfig};
use crate::node::{
    state::{PeerState, StateSummary},
    transport::{PeerId, RoleAction, Transport},
};
use crate::utils::hash::short_hash;

#[derive(Debug, Clone)]
pub struct PeerNode {
    id: PeerId,
    name: String,
    behavior: Behavior,
    pub state: PeerState,
}

/// End-of-run view of one peer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerReport {
    pub id: PeerId,
    pub name: String,
    pub role: Role,
    pub state: StateSummary,
    pub blocks_mined: Option<u32>,
    pub sniper: Option<SniperStats>,
}

impl PeerNode {
    pub fn new(id: PeerId, name: impl Into<String>, behavior: Behavior, state: PeerState) -> Self {
        Self {
            id,
            name: name.into(),
            behavior,
            state,
        }
    }

    /// Build a peer seeded from the shared genesis tables
    pub fn from_config(id: PeerId, spec: &PeerSpec, config: &SimulationConfig) -> Self {
        let state = PeerState::new(&config.initial_balances, &config.initial_reserves, config.fee());
        Self::new(id, spec.name.clone(), Behavior::for_role(spec.role, config), state)
    }

    pub fn id(&self) -> PeerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.behavior.role()
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Register this role's scheduled actions
    pub fn start(&mut self, net: &mut dyn Transport) {
        info!(
            "Peer {} ({}) started, {} peers known",
            self.name,
            self.role(),
            net.peers().len()
        );
        for task in self.behavior.startup_tasks() {
            debug!("{} scheduling {} in {:?}", self.name, task.name, task.delay);
            net.schedule(task);
        }
    }

    /// Run a scheduled action
    pub fn run_action(&mut self, action: RoleAction, net: &mut dyn Transport) {
        let outgoing = match (&mut self.behavior, action) {
            (Behavior::Miner(miner), RoleAction::MineBlock) => {
                if let Some(msg) = miner.mine(&mut self.state, net.now()) {
                    net.broadcast(NetworkMessage::BlockMessage(msg));
                }
                None
            }
            (Behavior::LiquidityProvider(lp), RoleAction::ProvideLiquidity) => Some(lp.build_transaction(&self.name)),
            (Behavior::Whale(whale), RoleAction::WhaleSwap) => Some(whale.build_transaction(&self.name)),
            (behavior, action) => {
                warn!("{} ignoring {:?}: not a {:?} action", self.name, action, behavior.role());
                None
            }
        };

        if let Some(tx) = outgoing {
            self.submit(tx, net);
        }
    }

    /// Handle a message from another peer
    pub fn on_message(&mut self, from: PeerId, msg: NetworkMessage, net: &mut dyn Transport) {
        let msg = match msg {
            NetworkMessage::BlockMessage(block) => {
                if let Err(e) = accept_block(&mut self.state, &block) {
                    warn!(
                        "{} rejected block #{} {} from peer {}: {}",
                        self.name,
                        block.index,
                        short_hash(&block.block_hash),
                        from,
                        e
                    );
                }
                return;
            }
            other => other,
        };

        let Some(tx) = msg.into_transaction() else {
            return;
        };
        debug!("{} received {} from {} (peer {})", self.name, tx.kind(), tx.actor(), from);
        self.state.mempool.insert(tx.clone());

        let reaction = match &mut self.behavior {
            Behavior::Sniper(sniper) => sniper.react(&self.name, &tx, &self.state.pool),
            _ => None,
        };
        if let Some(reaction) = reaction {
            self.submit(reaction, net);
        }
    }

    /// Add a transaction to our own mempool and broadcast it
    fn submit(&mut self, tx: Transaction, net: &mut dyn Transport) {
        info!("{} sends {}", self.name, tx.kind());
        self.state.mempool.insert(tx.clone());
        net.broadcast(NetworkMessage::from_transaction(tx));
    }

    pub fn report(&self) -> PeerReport {
        PeerReport {
            id: self.id,
            name: self.name.clone(),
            role: self.role(),
            state: self.state.summary(),
            blocks_mined: match &self.behavior {
                Behavior::Miner(miner) => Some(miner.blocks_mined()),
                _ => None,
            },
            sniper: match &self.behavior {
                Behavior::Sniper(sniper) => Some(sniper.stats().clone()),
                _ => None,
            },
        }
    }
}
