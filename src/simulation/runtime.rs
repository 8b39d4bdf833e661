//! Live tokio runtime
//!
//! Each peer runs as its own task and owns its state outright. Messages
//! travel as JSON frames over unbounded channels; scheduled actions are
//! timers that post back into the owning peer's inbox, so a peer's handlers
//! never run concurrently with each other.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::chain::codec::{self, NetworkMessage};
use crate::error::{SimError, SimResult};
use crate::node::{
    peer::PeerNode,
    transport::{PeerId, ScheduledTask, Transport},
};

enum Inbound {
    Frame { from: PeerId, bytes: Vec<u8> },
    Task(ScheduledTask),
    Shutdown,
}

type Inboxes = Arc<BTreeMap<PeerId, UnboundedSender<Inbound>>>;

struct ChannelTransport {
    me: PeerId,
    inboxes: Inboxes,
    started: Instant,
}

impl Transport for ChannelTransport {
    fn broadcast(&mut self, msg: NetworkMessage) {
        let bytes = match codec::encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Peer {} could not encode {}: {}", self.me, msg.message_type(), e);
                return;
            }
        };

        for (id, inbox) in self.inboxes.iter().filter(|(id, _)| **id != self.me) {
            let frame = Inbound::Frame {
                from: self.me,
                bytes: bytes.clone(),
            };
            if inbox.send(frame).is_err() {
                debug!("Peer {} is gone, frame dropped", id);
            }
        }
    }

    fn peers(&self) -> Vec<PeerId> {
        self.inboxes.keys().copied().filter(|id| *id != self.me).collect()
    }

    fn schedule(&mut self, task: ScheduledTask) {
        let Some(inbox) = self.inboxes.get(&self.me).cloned() else {
            return;
        };
        tokio::spawn(async move {
            tokio::time::sleep(task.delay).await;
            loop {
                let interval = task.interval;
                if inbox.send(Inbound::Task(task.clone())).is_err() {
                    break;
                }
                match interval {
                    Some(interval) => tokio::time::sleep(interval).await,
                    None => break,
                }
            }
        });
    }

    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

async fn peer_loop(mut node: PeerNode, mut inbox: UnboundedReceiver<Inbound>, mut transport: ChannelTransport) -> PeerNode {
    node.start(&mut transport);

    while let Some(inbound) = inbox.recv().await {
        match inbound {
            Inbound::Frame { from, bytes } => match codec::decode(&bytes) {
                Ok(msg) => node.on_message(from, msg, &mut transport),
                Err(e) => warn!("{} dropped undecodable frame from peer {}: {}", node.name(), from, e),
            },
            Inbound::Task(task) => node.run_action(task.action, &mut transport),
            Inbound::Shutdown => break,
        }
    }

    node
}

/// Runs peers as tokio tasks for a wall-clock horizon
pub struct LiveNetwork {
    horizon: Duration,
}

impl LiveNetwork {
    pub fn new(horizon: Duration) -> Self {
        Self { horizon }
    }

    /// Start every peer, wait out the horizon, then hand the peers back
    pub async fn run(&self, nodes: Vec<PeerNode>) -> SimResult<Vec<PeerNode>> {
        let mut senders = BTreeMap::new();
        let mut receivers = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let (tx, rx) = mpsc::unbounded_channel();
            if senders.insert(node.id(), tx).is_some() {
                return Err(SimError::InvalidConfig(format!("duplicate peer id {}", node.id())));
            }
            receivers.push(rx);
        }
        let inboxes: Inboxes = Arc::new(senders);
        let started = Instant::now();

        let mut handles = Vec::with_capacity(nodes.len());
        for (node, rx) in nodes.into_iter().zip(receivers) {
            let transport = ChannelTransport {
                me: node.id(),
                inboxes: Arc::clone(&inboxes),
                started,
            };
            handles.push(tokio::spawn(peer_loop(node, rx, transport)));
        }
        info!("Live network running {} peers for {:?}", handles.len(), self.horizon);

        tokio::time::sleep(self.horizon).await;
        for (id, inbox) in inboxes.iter() {
            inbox.send(Inbound::Shutdown).map_err(|_| SimError::ChannelClosed(*id))?;
        }

        let mut finished = Vec::with_capacity(handles.len());
        for handle in handles {
            let node = handle
                .await
                .map_err(|e| SimError::TaskFailed(e.to_string()))?;
            finished.push(node);
        }
        finished.sort_by_key(|node| node.id());
        Ok(finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;

    fn nodes(config: &SimulationConfig) -> Vec<PeerNode> {
        config
            .peers
            .iter()
            .enumerate()
            .map(|(i, spec)| PeerNode::from_config(i as PeerId, spec, config))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_run_converges() {
        let config = SimulationConfig::demo();
        let finished = LiveNetwork::new(config.horizon()).run(nodes(&config)).await.unwrap();

        assert_eq!(finished.len(), 4);
        let tip = finished[0].state.chain.tip().hash.clone();
        assert!(finished[0].state.chain.height() >= 1);
        assert!(finished.iter().all(|n| n.state.chain.tip().hash == tip));
    }

    #[tokio::test]
    async fn test_duplicate_ids_rejected() {
        let config = SimulationConfig::demo();
        let mut peers = nodes(&config);
        let dup = peers[0].clone();
        peers.push(dup);

        let result = LiveNetwork::new(Duration::from_millis(1)).run(peers).await;
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }
}
