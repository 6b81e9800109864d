//! Room registry for the relay
//!
//! This module owns every live room and the seats inside it:
//! - Room code allocation, unique among live rooms
//! - Seat assignment and capacity enforcement on join
//! - The latest state snapshot, handed to controllers as they join
//! - Teardown when a host drops, seat release when a player drops
//!
//! The registry knows nothing about physics. It only touches `GameState` to
//! keep paddles and scores in step with the seated players.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::room_code::{ROOM_CODE_MAX, ROOM_CODE_MIN};
use shared::{GameState, Player, RoomCode, SessionError, MAX_PLAYERS};
use std::collections::HashMap;

/// Transport-level identity of one client connection. Changes on reconnect.
pub type ConnectionId = u64;

/// A seated player and the connection currently speaking for them.
#[derive(Debug, Clone)]
pub struct Member {
    pub player: Player,
    pub connection: ConnectionId,
}

/// One game session, identified by its room code.
#[derive(Debug)]
pub struct Room {
    pub code: RoomCode,
    /// Connection of the authoritative host
    pub host: ConnectionId,
    /// Identifier the host announced itself with
    pub host_id: String,
    /// Seated players in join order
    pub members: Vec<Member>,
    /// Latest snapshot, used to bootstrap joining controllers
    pub game_state: GameState,
    /// Tick of the last snapshot accepted from the host
    pub last_tick: u64,
}

impl Room {
    fn new(code: RoomCode, host: ConnectionId, host_id: String) -> Self {
        Self {
            code,
            host,
            host_id,
            members: Vec::new(),
            game_state: GameState::new(),
            last_tick: 0,
        }
    }

    pub fn players(&self) -> Vec<Player> {
        self.members.iter().map(|m| m.player.clone()).collect()
    }

    /// Host connection followed by every seated player's connection.
    pub fn connections(&self) -> Vec<ConnectionId> {
        std::iter::once(self.host)
            .chain(self.members.iter().map(|m| m.connection))
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= MAX_PLAYERS
    }

    /// Lowest seat index no current member holds.
    fn free_seat(&self) -> Option<u8> {
        (0..MAX_PLAYERS as u8).find(|seat| self.members.iter().all(|m| m.player.seat != *seat))
    }
}

/// Result of a successful join, carrying everything the joiner needs.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub player: Player,
    pub players: Vec<Player>,
    pub game_state: GameState,
    /// Connections already in the room that must see the new player list,
    /// host first. Includes the joining connection.
    pub recipients: Vec<ConnectionId>,
    /// The player id was already seated and has moved to a new connection
    pub rejoined: bool,
}

/// What a lost connection meant for the room it belonged to.
#[derive(Debug, Clone, PartialEq)]
pub enum Departure {
    /// The host left: the room is gone and these connections are orphaned.
    RoomClosed {
        code: RoomCode,
        orphans: Vec<ConnectionId>,
    },
    /// A player left: the room lives on with an updated roster.
    PlayerLeft {
        code: RoomCode,
        player: Player,
        players: Vec<Player>,
        remaining: Vec<ConnectionId>,
    },
}

/// Owns all live rooms.
///
/// The random source for room codes is injected so tests can pin the
/// sequence of generated codes.
pub struct RoomRegistry<R = StdRng> {
    rooms: HashMap<RoomCode, Room>,
    /// Room each connection hosts or sits in; a connection has at most one.
    roles: HashMap<ConnectionId, RoomCode>,
    rng: R,
}

impl RoomRegistry<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for RoomRegistry<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RoomRegistry<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rooms: HashMap::new(),
            roles: HashMap::new(),
            rng,
        }
    }

    /// Allocates a room for `host` under a fresh code.
    ///
    /// Codes are drawn uniformly from `1000..=9999` and redrawn on collision
    /// with a live room. Fails only when every code is taken.
    pub fn create_room(
        &mut self,
        host: ConnectionId,
        host_id: impl Into<String>,
    ) -> Result<RoomCode, SessionError> {
        if let Some(existing) = self.roles.get(&host) {
            warn!(
                "Connection {} asked for a second room while in room {}",
                host, existing
            );
            return Err(SessionError::AlreadyInRoom);
        }

        let capacity = (ROOM_CODE_MAX - ROOM_CODE_MIN + 1) as usize;
        if self.rooms.len() >= capacity {
            warn!("Refusing room for connection {}: code space exhausted", host);
            return Err(SessionError::NoFreeRoomCodes);
        }

        let code = loop {
            let candidate = self.rng.gen_range(ROOM_CODE_MIN..=ROOM_CODE_MAX);
            if let Some(code) = RoomCode::from_number(candidate) {
                if !self.rooms.contains_key(&code) {
                    break code;
                }
            }
        };

        let host_id = host_id.into();
        info!("Room {} created by host {} (connection {})", code, host_id, host);
        self.rooms
            .insert(code.clone(), Room::new(code.clone(), host, host_id));
        self.roles.insert(host, code.clone());
        Ok(code)
    }

    /// Seats `player_id` in the room behind `code`.
    ///
    /// New players get the lowest free seat, a paddle at that seat's pose and
    /// a zero score. A player id that is already seated is moved to the new
    /// connection and keeps its seat and score.
    pub fn join_room(
        &mut self,
        code: &RoomCode,
        player_id: &str,
        connection: ConnectionId,
    ) -> Result<JoinOutcome, SessionError> {
        if let Some(current) = self.roles.get(&connection) {
            let same_seat = current == code
                && self.rooms.get(code).is_some_and(|room| {
                    room.members
                        .iter()
                        .any(|m| m.connection == connection && m.player.id == player_id)
                });
            if !same_seat {
                warn!(
                    "Connection {} tried to join room {} while in room {}",
                    connection, code, current
                );
                return Err(SessionError::AlreadyInRoom);
            }
        }

        let room = self.rooms.get_mut(code).ok_or(SessionError::RoomNotFound)?;

        let existing = room.members.iter().position(|m| m.player.id == player_id);

        let rejoined = if let Some(index) = existing {
            let member = &mut room.members[index];
            info!(
                "Player {} rejoined room {} (connection {} -> {})",
                player_id, code, member.connection, connection
            );
            self.roles.remove(&member.connection);
            member.connection = connection;
            true
        } else {
            if room.is_full() {
                return Err(SessionError::RoomFull);
            }
            let seat = room.free_seat().ok_or(SessionError::RoomFull)?;
            let player = Player::new(player_id, seat);
            room.game_state.add_player(&player);
            room.members.push(Member { player, connection });
            info!("Player {} joined room {} in seat {}", player_id, code, seat);
            false
        };
        self.roles.insert(connection, code.clone());

        let player = room
            .members
            .iter()
            .find(|m| m.player.id == player_id)
            .map(|m| m.player.clone())
            .ok_or(SessionError::RoomNotFound)?;

        Ok(JoinOutcome {
            player,
            players: room.players(),
            game_state: room.game_state.clone(),
            recipients: room.connections(),
            rejoined,
        })
    }

    /// Replaces the stored snapshot when `sender` is the room's host.
    ///
    /// Returns the connections the snapshot must be forwarded to (everyone
    /// but the host), or `None` if the update was not accepted.
    pub fn store_snapshot(
        &mut self,
        code: &RoomCode,
        sender: ConnectionId,
        tick: u64,
        game_state: GameState,
    ) -> Option<Vec<ConnectionId>> {
        let room = self.rooms.get_mut(code)?;
        if room.host != sender {
            warn!(
                "Connection {} tried to publish state for room {} it does not host",
                sender, code
            );
            return None;
        }

        if tick >= room.last_tick {
            room.last_tick = tick;
            room.game_state = game_state;
        } else {
            debug!("Room {}: not storing stale tick {} < {}", code, tick, room.last_tick);
        }

        Some(room.members.iter().map(|m| m.connection).collect())
    }

    /// Resolves what losing `connection` means.
    ///
    /// Create and join refuse a connection that already has a role, so there
    /// is at most one room to clean up. A connection whose player was moved
    /// to a newer connection has no role left and is ignored.
    pub fn disconnect(&mut self, connection: ConnectionId) -> Option<Departure> {
        let code = self.roles.remove(&connection)?;
        let room = self.rooms.get_mut(&code)?;

        if room.host == connection {
            let orphans: Vec<ConnectionId> = room.members.iter().map(|m| m.connection).collect();
            for orphan in &orphans {
                self.roles.remove(orphan);
            }
            info!("Host of room {} disconnected, closing room", code);
            self.rooms.remove(&code);
            return Some(Departure::RoomClosed { code, orphans });
        }

        let index = room
            .members
            .iter()
            .position(|m| m.connection == connection)?;
        let member = room.members.remove(index);
        room.game_state.remove_player(&member.player.id);
        info!("Player {} left room {}", member.player.id, code);

        Some(Departure::PlayerLeft {
            code,
            player: member.player,
            players: room.players(),
            remaining: room.connections(),
        })
    }

    pub fn host_of(&self, code: &RoomCode) -> Option<ConnectionId> {
        self.rooms.get(code).map(|room| room.host)
    }

    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    /// Returns the number of live rooms
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
