//! Deterministic in-process network
//!
//! Discrete-event substrate for running peers on one thread. Deliveries
//! and timers sit in a min-heap keyed by virtual time; every broadcast
//! copy gets its own seeded latency and may be dropped. Peers only ever
//! see each other through messages.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};
use tracing::{debug, trace};

use crate::chain::codec::NetworkMessage;
use crate::config::NetworkConfig;
use crate::error::{SimError, SimResult};
use crate::node::{
    peer::PeerNode,
    transport::{PeerId, ScheduledTask, Transport},
};

/// Delivery statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    /// Copies handed to the network (one per recipient)
    pub sent: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub timers_fired: u64,
}

#[derive(Debug)]
enum EventKind {
    Deliver {
        from: PeerId,
        to: PeerId,
        msg: NetworkMessage,
    },
    Fire {
        peer: PeerId,
        task: ScheduledTask,
    },
}

#[derive(Debug)]
struct Event {
    at_ms: u64,
    seq: u64,
    kind: EventKind,
}

// Reversed so BinaryHeap pops the earliest event; seq breaks ties in push order.
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.at_ms, other.seq).cmp(&(self.at_ms, self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        (self.at_ms, self.seq) == (other.at_ms, other.seq)
    }
}

impl Eq for Event {}

/// Pending events and delivery policy, shared by all peers
struct EventBus {
    queue: BinaryHeap<Event>,
    next_seq: u64,
    now_ms: u64,
    peer_ids: Vec<PeerId>,
    isolated: BTreeSet<PeerId>,
    rng: StdRng,
    config: NetworkConfig,
    stats: NetworkStats,
}

impl EventBus {
    fn push(&mut self, at_ms: u64, kind: EventKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Event { at_ms, seq, kind });
    }

    fn latency_ms(&mut self) -> u64 {
        self.rng
            .gen_range(self.config.min_latency_ms..=self.config.max_latency_ms)
    }

    fn should_drop(&mut self, from: PeerId, to: PeerId) -> bool {
        if self.isolated.contains(&from) || self.isolated.contains(&to) {
            return true;
        }
        self.config.drop_probability > 0.0 && self.rng.gen::<f64>() < self.config.drop_probability
    }
}

/// The bus as seen by one sending peer
struct Outbox<'a> {
    bus: &'a mut EventBus,
    me: PeerId,
}

impl Transport for Outbox<'_> {
    fn broadcast(&mut self, msg: NetworkMessage) {
        let recipients: Vec<PeerId> = self.peers();
        for to in recipients {
            self.bus.stats.sent += 1;
            if self.bus.should_drop(self.me, to) {
                self.bus.stats.dropped += 1;
                trace!("Dropped {} from {} to {}", msg.message_type(), self.me, to);
                continue;
            }
            let at_ms = self.bus.now_ms + self.bus.latency_ms();
            self.bus.push(
                at_ms,
                EventKind::Deliver {
                    from: self.me,
                    to,
                    msg: msg.clone(),
                },
            );
        }
    }

    fn peers(&self) -> Vec<PeerId> {
        self.bus
            .peer_ids
            .iter()
            .copied()
            .filter(|id| *id != self.me)
            .collect()
    }

    fn schedule(&mut self, task: ScheduledTask) {
        let at_ms = self.bus.now_ms + task.delay.as_millis() as u64;
        self.bus.push(at_ms, EventKind::Fire { peer: self.me, task });
    }

    fn now(&self) -> f64 {
        self.bus.now_ms as f64 / 1000.0
    }
}

/// Peers plus the event bus connecting them
pub struct SimNetwork {
    nodes: BTreeMap<PeerId, PeerNode>,
    bus: EventBus,
}

impl SimNetwork {
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            nodes: BTreeMap::new(),
            bus: EventBus {
                queue: BinaryHeap::new(),
                next_seq: 0,
                now_ms: 0,
                peer_ids: Vec::new(),
                isolated: BTreeSet::new(),
                rng: StdRng::seed_from_u64(config.seed),
                config,
                stats: NetworkStats::default(),
            },
        }
    }

    pub fn add_peer(&mut self, node: PeerNode) -> SimResult<()> {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(SimError::InvalidConfig(format!("duplicate peer id {}", id)));
        }
        self.bus.peer_ids.push(id);
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Cut a peer off: everything it sends or should receive is lost
    pub fn isolate(&mut self, id: PeerId) -> SimResult<()> {
        if !self.nodes.contains_key(&id) {
            return Err(SimError::UnknownPeer(id));
        }
        self.bus.isolated.insert(id);
        Ok(())
    }

    /// Let every peer register its scheduled actions
    pub fn start(&mut self) {
        for (id, node) in self.nodes.iter_mut() {
            let mut outbox = Outbox {
                bus: &mut self.bus,
                me: *id,
            };
            node.start(&mut outbox);
        }
    }

    /// Process the next event; false when nothing is left
    pub fn step(&mut self) -> bool {
        let Some(event) = self.bus.queue.pop() else {
            return false;
        };
        self.bus.now_ms = event.at_ms;

        match event.kind {
            EventKind::Deliver { from, to, msg } => {
                let Some(node) = self.nodes.get_mut(&to) else {
                    debug!("No peer {} for delivery", to);
                    return true;
                };
                self.bus.stats.delivered += 1;
                let mut outbox = Outbox {
                    bus: &mut self.bus,
                    me: to,
                };
                node.on_message(from, msg, &mut outbox);
            }
            EventKind::Fire { peer, task } => {
                let Some(node) = self.nodes.get_mut(&peer) else {
                    return true;
                };
                self.bus.stats.timers_fired += 1;
                debug!("Peer {} firing {}", peer, task.name);
                let mut outbox = Outbox {
                    bus: &mut self.bus,
                    me: peer,
                };
                node.run_action(task.action, &mut outbox);

                if let Some(interval) = task.interval {
                    let at_ms = self.bus.now_ms + (interval.as_millis() as u64).max(1);
                    self.bus.push(at_ms, EventKind::Fire { peer, task });
                }
            }
        }
        true
    }

    /// Process every event due at or before `horizon_secs`
    pub fn run_until(&mut self, horizon_secs: f64) {
        let horizon_ms = (horizon_secs * 1000.0) as u64;
        while self
            .bus
            .queue
            .peek()
            .map_or(false, |event| event.at_ms <= horizon_ms)
        {
            self.step();
        }
        self.bus.now_ms = self.bus.now_ms.max(horizon_ms);
    }

    /// Virtual time in seconds
    pub fn now(&self) -> f64 {
        self.bus.now_ms as f64 / 1000.0
    }

    pub fn pending_events(&self) -> usize {
        self.bus.queue.len()
    }

    pub fn node(&self, id: PeerId) -> Option<&PeerNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: PeerId) -> Option<&mut PeerNode> {
        self.nodes.get_mut(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &PeerNode> {
        self.nodes.values()
    }

    pub fn stats(&self) -> &NetworkStats {
        &self.bus.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bots::Role;
    use crate::chain::transaction::Transaction;
    use crate::config::{PeerSpec, SimulationConfig};

    fn network(config: &SimulationConfig) -> SimNetwork {
        let mut net = SimNetwork::new(config.network.clone());
        for (i, spec) in config.peers.iter().enumerate() {
            net.add_peer(PeerNode::from_config(i as PeerId, spec, config)).unwrap();
        }
        net
    }

    #[test]
    fn test_broadcast_reaches_everyone_else() {
        let config = SimulationConfig::quick_test();
        let mut net = network(&config);
        {
            let mut outbox = Outbox {
                bus: &mut net.bus,
                me: 1,
            };
            outbox.broadcast(NetworkMessage::from_transaction(Transaction::transfer("user", "x", "TokenA", 1.0)));
        }
        while net.step() {}

        assert_eq!(net.stats().sent, 3);
        assert_eq!(net.stats().delivered, 3);
        assert_eq!(net.node(1).unwrap().state.mempool.len(), 0);
        for id in [0, 2, 3] {
            assert_eq!(net.node(id).unwrap().state.mempool.len(), 1);
        }
    }

    #[test]
    fn test_events_fire_in_time_order() {
        let config = SimulationConfig::quick_test();
        let mut net = network(&config);
        net.start();

        // miner x2, liquidity, whale
        assert_eq!(net.pending_events(), 4);
        net.run_until(2.5);
        assert!(net.now() >= 2.5);
        assert_eq!(net.stats().timers_fired, 1);
        assert_eq!(net.node(0).unwrap().state.mempool.len(), 2);
    }

    #[test]
    fn test_isolated_peer_misses_everything() {
        let config = SimulationConfig::quick_test();
        let mut net = network(&config);
        net.isolate(2).unwrap();
        net.start();
        net.run_until(config.horizon_secs);

        let whale = net.node(2).unwrap();
        assert_eq!(whale.role(), Role::Whale);
        assert_eq!(whale.state.chain.len(), 1);
        assert!(net.stats().dropped > 0);
        assert!(matches!(net.isolate(42), Err(SimError::UnknownPeer(42))));
    }

    #[test]
    fn test_duplicate_peer_rejected() {
        let config = SimulationConfig::quick_test();
        let mut net = network(&config);
        let dup = PeerNode::from_config(0, &PeerSpec::new(Role::Miner), &config);

        assert!(net.add_peer(dup).is_err());
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let config = SimulationConfig::demo();
        let run = || {
            let mut net = network(&config);
            net.start();
            net.run_until(config.horizon_secs);
            net.nodes().map(|n| n.state.chain.tip().hash.clone()).collect::<Vec<_>>()
        };

        assert_eq!(run(), run());
    }
}
