//! UDP sink implementation

use std::io;
use std::net::SocketAddr;

use tokio::net::UdpSocket;

use posc_core::{PoscError, PoscResult};
use posc_wire::{encode, Packet};

use crate::MessageSink;

/// OSC-over-UDP sink with a fixed destination.
///
/// Sending uses `try_send_to`, so it never waits on the socket: a full
/// send buffer is reported as a transport error and the packet is dropped.
pub struct UdpSink {
    socket: UdpSocket,
    local_addr: SocketAddr,
    target: SocketAddr,
}

impl UdpSink {
    /// Bind to a local address and send to `target`
    pub async fn bind(local: SocketAddr, target: SocketAddr) -> PoscResult<Self> {
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| PoscError::Transport(e.to_string()))?;

        let local_addr = socket
            .local_addr()
            .map_err(|e| PoscError::Transport(e.to_string()))?;

        tracing::info!(%local_addr, %target, "UDP sink ready");

        Ok(UdpSink {
            socket,
            local_addr,
            target,
        })
    }

    /// Bind an ephemeral port of the target's address family
    pub async fn to(target: SocketAddr) -> PoscResult<Self> {
        let local: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        Self::bind(local, target).await
    }

    /// Resolve `host:port` and bind towards the first address found
    pub async fn resolve(host: &str, port: u16) -> PoscResult<Self> {
        let target = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| PoscError::Transport(format!("{}: {}", host, e)))?
            .next()
            .ok_or_else(|| PoscError::Transport(format!("{}: no address", host)))?;
        Self::to(target).await
    }

    /// Get local address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Destination address
    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl MessageSink for UdpSink {
    fn send(&mut self, packet: &Packet) -> PoscResult<()> {
        let bytes = encode(packet)?;
        match self.socket.try_send_to(&bytes, self.target) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                Err(PoscError::Transport("send buffer full".into()))
            }
            Err(e) => Err(PoscError::Transport(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use posc_wire::{decode, Bundle, Message, TimeTag, ValueFormat};

    async fn receiver() -> UdpSocket {
        UdpSocket::bind("127.0.0.1:0").await.unwrap()
    }

    async fn recv_packet(socket: &UdpSocket) -> Packet {
        let mut buf = vec![0u8; 4096];
        let (len, _) = tokio::time::timeout(Duration::from_secs(2), socket.recv_from(&mut buf))
            .await
            .expect("timed out waiting for datagram")
            .unwrap();
        decode(&buf[..len]).unwrap()
    }

    #[tokio::test]
    async fn test_udp_sink_bind() {
        let rx = receiver().await;
        let sink = UdpSink::bind("127.0.0.1:0".parse().unwrap(), rx.local_addr().unwrap())
            .await
            .unwrap();

        assert_ne!(sink.local_addr().port(), 0);
        assert_eq!(sink.target(), rx.local_addr().unwrap());
    }

    #[tokio::test]
    async fn test_udp_sink_delivers_message() {
        let rx = receiver().await;
        let mut sink = UdpSink::bind("127.0.0.1:0".parse().unwrap(), rx.local_addr().unwrap())
            .await
            .unwrap();

        let msg = Message::with_values("/nose", &[320.0, 110.0], ValueFormat::Float);
        sink.send(&Packet::from(msg.clone())).unwrap();

        assert_eq!(recv_packet(&rx).await, Packet::Message(msg));
    }

    #[tokio::test]
    async fn test_udp_sink_delivers_bundle() {
        let rx = receiver().await;
        let mut sink = UdpSink::bind("127.0.0.1:0".parse().unwrap(), rx.local_addr().unwrap())
            .await
            .unwrap();

        let bundle = Bundle::new(
            TimeTag::now(),
            (0..11)
                .map(|i| Message::with_values(format!("/{}", i), &[i as f32], ValueFormat::Int))
                .collect(),
        );
        sink.send(&Packet::from(bundle.clone())).unwrap();

        assert_eq!(recv_packet(&rx).await, Packet::Bundle(bundle));
    }

    #[tokio::test]
    async fn test_resolve_localhost() {
        let rx = receiver().await;
        let port = rx.local_addr().unwrap().port();
        let sink = UdpSink::resolve("127.0.0.1", port).await.unwrap();
        assert_eq!(sink.target().port(), port);
    }
}
