//! In-process transport: every rank is a task, every inbox a channel.

use async_trait::async_trait;
use randwalk_env::{EnvError, Rank, StepReport, Transport};
use std::sync::Arc;
use tokio::sync::mpsc;

type Delivery = (Rank, StepReport);

/// Channel-backed transport endpoint for one rank.
pub struct LocalTransport {
    /// This endpoint's rank
    rank: Rank,

    /// Senders into every rank's inbox, indexed by rank
    peers: Arc<Vec<mpsc::Sender<Delivery>>>,

    /// Receiver for incoming reports (behind tokio mutex for async)
    rx: Arc<tokio::sync::Mutex<mpsc::Receiver<Delivery>>>,
}

/// Builds the endpoints for an in-process run.
pub struct LocalCluster;

impl LocalCluster {
    /// Creates one endpoint per rank, ordered by rank.
    ///
    /// Each inbox holds `world_size` reports, so a walker's single send
    /// never waits on the coordinator.
    pub fn build(world_size: u32) -> Vec<LocalTransport> {
        let capacity = world_size.max(1) as usize;
        let (senders, receivers): (Vec<_>, Vec<_>) =
            (0..world_size).map(|_| mpsc::channel::<Delivery>(capacity)).unzip();

        let peers = Arc::new(senders);

        receivers
            .into_iter()
            .enumerate()
            .map(|(i, rx)| LocalTransport {
                rank: Rank(i as u32),
                peers: Arc::clone(&peers),
                rx: Arc::new(tokio::sync::Mutex::new(rx)),
            })
            .collect()
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn send(&self, target: Rank, report: StepReport) -> Result<(), EnvError> {
        let peer = self
            .peers
            .get(target.get() as usize)
            .ok_or_else(|| EnvError::unreachable(target))?;

        peer.send((self.rank, report))
            .await
            .map_err(|_| EnvError::network("Channel closed"))
    }

    async fn recv_any(&self) -> Result<(Rank, StepReport), EnvError> {
        let mut rx = self.rx.lock().await;
        rx.recv().await.ok_or_else(|| EnvError::network("Channel closed"))
    }

    fn rank(&self) -> Rank {
        self.rank
    }

    fn world_size(&self) -> u32 {
        self.peers.len() as u32
    }
}
