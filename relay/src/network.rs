//! Relay network layer: TCP connections feeding a single routing loop

use crate::registry::ConnectionId;
use crate::router::{Delivery, Router};
use log::{debug, error, info, warn};
use shared::framing::{decode_packet, read_frame, write_packet};
use shared::Packet;
use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::interval;

/// Events sent from connection tasks to the routing loop
#[derive(Debug)]
pub enum RelayEvent {
    Connected {
        connection: ConnectionId,
        addr: SocketAddr,
        outbound: mpsc::UnboundedSender<Packet>,
    },
    PacketReceived {
        connection: ConnectionId,
        packet: Packet,
    },
    Disconnected {
        connection: ConnectionId,
    },
}

/// Relay server accepting hosts and controllers.
///
/// Connection tasks only move bytes. Every room mutation happens inside
/// [`RelayServer::run`], one event at a time, so rooms need no locking.
pub struct RelayServer {
    listener: TcpListener,
    router: Router,
    connections: HashMap<ConnectionId, mpsc::UnboundedSender<Packet>>,
    stats_interval: Duration,

    event_tx: mpsc::UnboundedSender<RelayEvent>,
    event_rx: mpsc::UnboundedReceiver<RelayEvent>,
}

impl RelayServer {
    pub async fn bind(addr: &str) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Relay listening on {}", listener.local_addr()?);

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Ok(RelayServer {
            listener,
            router: Router::new(),
            connections: HashMap::new(),
            stats_interval: Duration::from_secs(30),
            event_tx,
            event_rx,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Spawns the reader and writer tasks for one accepted stream
    fn spawn_connection(
        stream: TcpStream,
        addr: SocketAddr,
        connection: ConnectionId,
        event_tx: mpsc::UnboundedSender<RelayEvent>,
    ) {
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Could not disable Nagle for {}: {}", addr, e);
        }
        let (reader, writer) = stream.into_split();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        if event_tx
            .send(RelayEvent::Connected {
                connection,
                addr,
                outbound: outbound_tx,
            })
            .is_err()
        {
            return;
        }

        tokio::spawn(Self::write_loop(connection, writer, outbound_rx));
        tokio::spawn(Self::read_loop(connection, reader, event_tx));
    }

    async fn read_loop(
        connection: ConnectionId,
        mut reader: OwnedReadHalf,
        event_tx: mpsc::UnboundedSender<RelayEvent>,
    ) {
        loop {
            let frame = match read_frame(&mut reader).await {
                Ok(frame) => frame,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => {
                    warn!("Connection {} read failed: {}", connection, e);
                    break;
                }
            };

            match decode_packet(&frame) {
                Ok(packet) => {
                    if event_tx
                        .send(RelayEvent::PacketReceived { connection, packet })
                        .is_err()
                    {
                        return;
                    }
                }
                Err(e) => warn!("Skipping undecodable frame from {}: {}", connection, e),
            }
        }

        let _ = event_tx.send(RelayEvent::Disconnected { connection });
    }

    async fn write_loop(
        connection: ConnectionId,
        mut writer: OwnedWriteHalf,
        mut outbound_rx: mpsc::UnboundedReceiver<Packet>,
    ) {
        while let Some(packet) = outbound_rx.recv().await {
            if let Err(e) = write_packet(&mut writer, &packet).await {
                error!("Failed to send {} to {}: {}", packet.kind(), connection, e);
                break;
            }
        }
    }

    fn deliver(&self, deliveries: Vec<Delivery>) {
        for Delivery { to, packet } in deliveries {
            match self.connections.get(&to) {
                Some(outbound) => {
                    if outbound.send(packet).is_err() {
                        debug!("Connection {} already closed", to);
                    }
                }
                None => debug!("No live connection {} for {}", to, packet.kind()),
            }
        }
    }

    fn handle_event(&mut self, event: RelayEvent) {
        match event {
            RelayEvent::Connected {
                connection,
                addr,
                outbound,
            } => {
                info!("Connection {} opened from {}", connection, addr);
                self.connections.insert(connection, outbound);
            }
            RelayEvent::PacketReceived { connection, packet } => {
                let deliveries = self.router.handle_packet(connection, packet);
                self.deliver(deliveries);
            }
            RelayEvent::Disconnected { connection } => {
                info!("Connection {} closed", connection);
                let deliveries = self.router.handle_disconnect(connection);
                self.deliver(deliveries);
                self.connections.remove(&connection);
            }
        }
    }

    /// Main relay loop: accepts connections and routes their events
    pub async fn run(mut self) -> io::Result<()> {
        let mut next_connection: ConnectionId = 1;
        let mut stats = interval(self.stats_interval);

        info!("Relay started successfully");

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            let connection = next_connection;
                            next_connection += 1;
                            Self::spawn_connection(stream, addr, connection, self.event_tx.clone());
                        }
                        Err(e) => {
                            error!("Error accepting connection: {}", e);
                            tokio::time::sleep(Duration::from_millis(10)).await;
                        }
                    }
                },

                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                },

                _ = stats.tick() => {
                    debug!(
                        "{} connections, {} live rooms",
                        self.connections.len(),
                        self.router.registry().len()
                    );
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::framing::read_packet;

    async fn connect(addr: SocketAddr) -> TcpStream {
        TcpStream::connect(addr).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_room_over_tcp() {
        let server = RelayServer::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());

        let mut host = connect(addr).await;
        write_packet(
            &mut host,
            &Packet::CreateRoom {
                host_id: "host_test".into(),
            },
        )
        .await
        .unwrap();

        match read_packet(&mut host).await.unwrap() {
            Packet::RoomCreated { code } => {
                assert!(shared::RoomCode::is_valid(code.as_str()))
            }
            other => panic!("expected roomCreated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_garbage_frame_does_not_kill_connection() {
        let server = RelayServer::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());

        let mut client = connect(addr).await;
        let garbage = [0u8, 0, 0, 3, 0xFF, 0xFF, 0xFF];
        tokio::io::AsyncWriteExt::write_all(&mut client, &garbage)
            .await
            .unwrap();

        write_packet(
            &mut client,
            &Packet::JoinRoom {
                room_code: "0000".into(),
                player_id: "p".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(
            read_packet(&mut client).await.unwrap(),
            Packet::Error {
                message: "Room not found.".into()
            }
        );
    }
}
