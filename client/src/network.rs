//! Client side of the relay connection.

use crate::error::ClientError;
use log::{debug, error, warn};
use shared::framing::{decode_packet, read_frame, write_packet};
use shared::Packet;
use std::io;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// A framed connection to the relay.
///
/// Reading and writing happen on their own tasks so a slow socket never
/// stalls the tick loop; the session talks to them through channels.
pub struct RelayLink {
    outbound: mpsc::UnboundedSender<Packet>,
    inbound: mpsc::UnboundedReceiver<Packet>,
}

impl RelayLink {
    pub async fn connect(addr: &str) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self::from_stream(stream))
    }

    pub fn from_stream(stream: TcpStream) -> Self {
        let (mut reader, mut writer) = stream.into_split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Packet>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(packet) = outbound_rx.recv().await {
                if let Err(e) = write_packet(&mut writer, &packet).await {
                    error!("Failed to send {}: {}", packet.kind(), e);
                    break;
                }
            }
        });

        tokio::spawn(async move {
            loop {
                let frame = match read_frame(&mut reader).await {
                    Ok(frame) => frame,
                    Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                        debug!("Relay closed the connection");
                        break;
                    }
                    Err(e) => {
                        warn!("Relay read failed: {}", e);
                        break;
                    }
                };
                match decode_packet(&frame) {
                    Ok(packet) => {
                        if inbound_tx.send(packet).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Skipping undecodable frame from relay: {}", e),
                }
            }
        });

        Self {
            outbound: outbound_tx,
            inbound: inbound_rx,
        }
    }

    pub fn send(&self, packet: Packet) -> Result<(), ClientError> {
        self.outbound
            .send(packet)
            .map_err(|_| ClientError::ConnectionClosed)
    }

    /// Next packet from the relay, `None` once the connection is gone.
    pub async fn recv(&mut self) -> Option<Packet> {
        self.inbound.recv().await
    }
}
