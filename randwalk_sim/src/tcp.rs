//! TCP transport for one-process-per-rank runs.
//!
//! Star topology: rank 0 listens, every walker opens one connection and
//! announces its rank with a hello frame. Frames are newline-delimited
//! JSON. The coordinator runs one reader task per connection, all feeding
//! a single channel that `recv_any()` drains.

use async_trait::async_trait;
use randwalk_env::{EnvError, Rank, StepReport, Transport};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tracing::{debug, warn};

type Delivery = Result<(Rank, StepReport), EnvError>;

/// Wire frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Frame {
    Hello { rank: Rank },
    Report { steps_taken: i64 },
}

impl Frame {
    fn encode(&self) -> Result<Vec<u8>, EnvError> {
        let mut line = serde_json::to_vec(self)
            .map_err(|e| EnvError::SerializationError(e.to_string()))?;
        line.push(b'\n');
        Ok(line)
    }

    fn decode(line: &str) -> Result<Self, EnvError> {
        serde_json::from_str(line).map_err(|e| EnvError::SerializationError(e.to_string()))
    }
}

enum Role {
    Coordinator {
        inbox: tokio::sync::Mutex<mpsc::Receiver<Delivery>>,
        local_addr: SocketAddr,
    },
    Walker {
        writer: tokio::sync::Mutex<OwnedWriteHalf>,
    },
}

/// Socket-backed transport endpoint.
pub struct TcpTransport {
    rank: Rank,
    world_size: u32,
    role: Role,
}

impl TcpTransport {
    /// Binds the coordinator endpoint and starts accepting walkers.
    ///
    /// Exactly `world_size - 1` connections are accepted; the listener is
    /// closed afterwards.
    pub async fn listen(addr: impl ToSocketAddrs, world_size: u32) -> Result<Self, EnvError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let (tx, rx) = mpsc::channel(world_size.max(1) as usize);

        tokio::spawn(accept_walkers(listener, world_size, tx));

        Ok(Self {
            rank: Rank::COORDINATOR,
            world_size,
            role: Role::Coordinator {
                inbox: tokio::sync::Mutex::new(rx),
                local_addr,
            },
        })
    }

    /// Connects a walker endpoint to the coordinator. No retry: the
    /// coordinator must already be listening.
    pub async fn connect(
        addr: impl ToSocketAddrs,
        rank: Rank,
        world_size: u32,
    ) -> Result<Self, EnvError> {
        if rank.is_coordinator() || rank.get() >= world_size {
            return Err(EnvError::ContextError(format!(
                "rank {} is not a walker rank in a world of {}",
                rank, world_size
            )));
        }

        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let (_read, mut writer) = stream.into_split();

        writer.write_all(&Frame::Hello { rank }.encode()?).await?;
        writer.flush().await?;

        Ok(Self {
            rank,
            world_size,
            role: Role::Walker {
                writer: tokio::sync::Mutex::new(writer),
            },
        })
    }

    /// Address the coordinator is listening on.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.role {
            Role::Coordinator { local_addr, .. } => Some(*local_addr),
            Role::Walker { .. } => None,
        }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&self, target: Rank, report: StepReport) -> Result<(), EnvError> {
        let Role::Walker { writer } = &self.role else {
            return Err(EnvError::unreachable(target));
        };
        if !target.is_coordinator() {
            return Err(EnvError::unreachable(target));
        }

        let frame = Frame::Report { steps_taken: report.steps_taken }.encode()?;
        let mut writer = writer.lock().await;
        writer.write_all(&frame).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn recv_any(&self) -> Result<(Rank, StepReport), EnvError> {
        let Role::Coordinator { inbox, .. } = &self.role else {
            return Err(EnvError::ContextError("walker ranks do not receive".to_string()));
        };

        let mut inbox = inbox.lock().await;
        inbox
            .recv()
            .await
            .unwrap_or_else(|| Err(EnvError::network("all walker connections closed")))
    }

    fn rank(&self) -> Rank {
        self.rank
    }

    fn world_size(&self) -> u32 {
        self.world_size
    }
}

/// Ranks that have already identified themselves on some connection.
type SeenRanks = Arc<Mutex<HashSet<Rank>>>;

async fn accept_walkers(listener: TcpListener, world_size: u32, tx: mpsc::Sender<Delivery>) {
    let seen = SeenRanks::default();

    for _ in 1..world_size {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!(%peer, "walker connected");
                tokio::spawn(read_reports(stream, world_size, Arc::clone(&seen), tx.clone()));
            }
            Err(e) => {
                warn!("accept failed: {}", e);
                let _ = tx.send(Err(e.into())).await;
                return;
            }
        }
    }
}

async fn read_reports(
    stream: TcpStream,
    world_size: u32,
    seen: SeenRanks,
    tx: mpsc::Sender<Delivery>,
) {
    if let Err(e) = forward_report(stream, world_size, &seen, &tx).await {
        warn!("walker connection failed: {}", e);
        let _ = tx.send(Err(e)).await;
    }
}

/// Reads the hello frame and the single report of one walker connection.
async fn forward_report(
    stream: TcpStream,
    world_size: u32,
    seen: &SeenRanks,
    tx: &mpsc::Sender<Delivery>,
) -> Result<(), EnvError> {
    let mut lines = BufReader::new(stream).lines();

    let rank = match lines.next_line().await? {
        Some(line) => match Frame::decode(&line)? {
            Frame::Hello { rank } if !rank.is_coordinator() && rank.get() < world_size => rank,
            Frame::Hello { rank } => return Err(EnvError::unreachable(rank)),
            other => {
                return Err(EnvError::protocol(format!(
                    "expected hello frame, got {:?}",
                    other
                )))
            }
        },
        // Connected and left without identifying itself
        None => return Ok(()),
    };

    let first_claim = seen.lock().unwrap_or_else(PoisonError::into_inner).insert(rank);
    if !first_claim {
        return Err(EnvError::protocol(format!("rank {} connected twice", rank)));
    }

    let mut reported = false;
    while let Some(line) = lines.next_line().await? {
        match Frame::decode(&line)? {
            Frame::Report { .. } if reported => {
                return Err(EnvError::protocol(format!("rank {} reported twice", rank)));
            }
            Frame::Report { steps_taken } => {
                reported = true;
                if tx.send(Ok((rank, StepReport::new(steps_taken)))).await.is_err() {
                    return Ok(());
                }
            }
            Frame::Hello { .. } => {
                return Err(EnvError::protocol(format!("duplicate hello from rank {}", rank)));
            }
        }
    }

    debug!(%rank, "walker disconnected");
    Ok(())
}
