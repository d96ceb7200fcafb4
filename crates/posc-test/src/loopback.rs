//! UDP loopback runs
//!
//! Sends pipeline output through a real `UdpSink` to a socket on
//! 127.0.0.1 and decodes what arrives.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;

use posc_core::{PoscError, PoscResult};
use posc_runtime::{LandmarkSource, Pipeline, PipelineConfig, PipelineStats};
use posc_transport::UdpSink;
use posc_wire::{decode, Packet};

/// How long to wait for each datagram
pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Local OSC receiver
pub struct LoopbackReceiver {
    socket: UdpSocket,
}

impl LoopbackReceiver {
    pub async fn bind() -> PoscResult<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0")
            .await
            .map_err(|e| PoscError::Transport(e.to_string()))?;
        Ok(LoopbackReceiver { socket })
    }

    pub fn addr(&self) -> PoscResult<SocketAddr> {
        self.socket
            .local_addr()
            .map_err(|e| PoscError::Transport(e.to_string()))
    }

    /// Receive and decode one packet
    pub async fn recv(&self) -> PoscResult<Packet> {
        let mut buf = vec![0u8; 65_536];
        let (len, _) = tokio::time::timeout(RECV_TIMEOUT, self.socket.recv_from(&mut buf))
            .await
            .map_err(|_| PoscError::Transport("receive timed out".into()))?
            .map_err(|e| PoscError::Transport(e.to_string()))?;
        decode(&buf[..len])
    }

    /// Receive exactly `count` packets
    pub async fn recv_many(&self, count: usize) -> PoscResult<Vec<Packet>> {
        let mut packets = Vec::with_capacity(count);
        for _ in 0..count {
            packets.push(self.recv().await?);
        }
        Ok(packets)
    }
}

/// Run `source` through a pipeline whose sink targets `receiver`
pub async fn run_loopback<L: LandmarkSource>(
    config: PipelineConfig,
    source: &mut L,
    receiver: &LoopbackReceiver,
) -> PoscResult<PipelineStats> {
    let sink = UdpSink::to(receiver.addr()?).await?;
    let mut pipeline = Pipeline::new(config, sink)?;
    pipeline.run(source)
}
