//! Message routing between hosts and controllers.
//!
//! The router is pure bookkeeping: it takes one inbound event, mutates the
//! registry, and returns the packets to deliver. The network layer performs
//! the actual writes, which keeps routing rules testable without sockets.

use crate::registry::{ConnectionId, Departure, RoomRegistry};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::Rng;
use shared::{Packet, RoomCode, SessionError};

/// A packet addressed to one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub to: ConnectionId,
    pub packet: Packet,
}

impl Delivery {
    pub fn new(to: ConnectionId, packet: Packet) -> Self {
        Self { to, packet }
    }
}

fn fan_out(recipients: &[ConnectionId], packet: &Packet) -> Vec<Delivery> {
    recipients
        .iter()
        .map(|to| Delivery::new(*to, packet.clone()))
        .collect()
}

pub struct Router<R = StdRng> {
    registry: RoomRegistry<R>,
}

impl Router<StdRng> {
    pub fn new() -> Self {
        Self::with_registry(RoomRegistry::new())
    }
}

impl Default for Router<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Router<R> {
    pub fn with_registry(registry: RoomRegistry<R>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RoomRegistry<R> {
        &self.registry
    }

    /// Routes one packet received from `from`.
    pub fn handle_packet(&mut self, from: ConnectionId, packet: Packet) -> Vec<Delivery> {
        debug!("Connection {} sent {}", from, packet.kind());

        match packet {
            Packet::CreateRoom { host_id } => match self.registry.create_room(from, host_id) {
                Ok(code) => vec![Delivery::new(from, Packet::RoomCreated { code })],
                Err(err) => vec![Delivery::new(from, err.into())],
            },

            Packet::JoinRoom {
                room_code,
                player_id,
            } => self.join(from, &room_code, &player_id),

            Packet::Input {
                room_code,
                player_id,
                direction,
                action,
            } => {
                // Membership is the host's concern; unknown rooms drop silently.
                let host = room_code
                    .parse::<RoomCode>()
                    .ok()
                    .and_then(|code| self.registry.host_of(&code));
                match host {
                    Some(host) => vec![Delivery::new(
                        host,
                        Packet::PlayerInput {
                            player_id,
                            direction,
                            action,
                        },
                    )],
                    None => {
                        debug!("Dropping input for unknown room {}", room_code);
                        Vec::new()
                    }
                }
            }

            Packet::GameStateUpdate {
                room_code,
                tick,
                game_state,
            } => {
                let Ok(code) = room_code.parse::<RoomCode>() else {
                    warn!("State update for malformed room code {:?}", room_code);
                    return Vec::new();
                };
                let packet = Packet::GameState {
                    tick,
                    game_state: game_state.clone(),
                };
                match self.registry.store_snapshot(&code, from, tick, game_state) {
                    Some(recipients) => fan_out(&recipients, &packet),
                    None => Vec::new(),
                }
            }

            Packet::Disconnect => self.handle_disconnect(from),

            other => {
                warn!(
                    "Unexpected {} packet from connection {}",
                    other.kind(),
                    from
                );
                Vec::new()
            }
        }
    }

    fn join(&mut self, from: ConnectionId, raw_code: &str, player_id: &str) -> Vec<Delivery> {
        let result = raw_code
            .parse::<RoomCode>()
            .and_then(|code| self.registry.join_room(&code, player_id, from));

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!("Join of {} to {:?} refused: {}", player_id, raw_code, err);
                return vec![Delivery::new(from, err.into())];
            }
        };

        let mut deliveries = vec![Delivery::new(
            from,
            Packet::JoinSuccess {
                player_id: outcome.player.id.clone(),
                players: outcome.players.clone(),
                game_state: outcome.game_state,
            },
        )];
        deliveries.extend(fan_out(
            &outcome.recipients,
            &Packet::PlayerListUpdate {
                players: outcome.players,
            },
        ));
        deliveries
    }

    /// Routes the loss of `connection`, whether it closed or said goodbye.
    pub fn handle_disconnect(&mut self, connection: ConnectionId) -> Vec<Delivery> {
        match self.registry.disconnect(connection) {
            Some(Departure::RoomClosed { orphans, .. }) => {
                fan_out(&orphans, &Packet::from(SessionError::HostDisconnected))
            }
            Some(Departure::PlayerLeft {
                players, remaining, ..
            }) => fan_out(&remaining, &Packet::PlayerListUpdate { players }),
            None => Vec::new(),
        }
    }
}
