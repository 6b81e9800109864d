//! Controller session: sends paddle intents and follows the host's broadcasts.

use crate::error::ClientError;
use crate::input::{Command, InputManager};
use crate::network::RelayLink;
use log::{debug, info, warn};
use shared::{GameState, GameStatus, Packet, Player, RoomCode};
use tokio::io::{AsyncBufReadExt, BufReader};

pub struct ControllerSession {
    player_id: String,
    room_code: RoomCode,
    seat: Option<u8>,
    players: Vec<Player>,
    game_state: Option<GameState>,
    last_tick: Option<u64>,
    input: InputManager,
}

impl ControllerSession {
    pub fn new(player_id: impl Into<String>, room_code: RoomCode) -> Self {
        Self {
            player_id: player_id.into(),
            room_code,
            seat: None,
            players: Vec::new(),
            game_state: None,
            last_tick: None,
            input: InputManager::new(),
        }
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn seat(&self) -> Option<u8> {
        self.seat
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn game_state(&self) -> Option<&GameState> {
        self.game_state.as_ref()
    }

    pub fn last_tick(&self) -> Option<u64> {
        self.last_tick
    }

    pub fn score(&self) -> Option<u32> {
        self.game_state.as_ref()?.scores.get(&self.player_id).copied()
    }

    pub fn join_packet(&self) -> Packet {
        Packet::JoinRoom {
            room_code: self.room_code.to_string(),
            player_id: self.player_id.clone(),
        }
    }

    /// The input packet for `command`, if it changes what this player holds.
    pub fn input_packet(&mut self, command: Command) -> Option<Packet> {
        if self.seat.is_none() {
            debug!("Not seated yet, ignoring {:?}", command);
            return None;
        }
        let (direction, action) = self.input.update(command)?;
        Some(Packet::Input {
            room_code: self.room_code.to_string(),
            player_id: self.player_id.clone(),
            direction,
            action,
        })
    }

    fn refresh_seat(&mut self, players: Vec<Player>) {
        self.seat = players
            .iter()
            .find(|p| p.id == self.player_id)
            .map(|p| p.seat);
        if let Some(seat) = self.seat {
            self.input.set_seat(seat);
        }
        self.players = players;
    }

    /// Applies one packet from the relay. Returns whether the displayed game
    /// state changed.
    pub fn handle_packet(&mut self, packet: Packet) -> Result<bool, ClientError> {
        match packet {
            Packet::JoinSuccess {
                player_id,
                players,
                game_state,
            } => {
                self.refresh_seat(players);
                let (back, forward) = self.input.axis();
                info!(
                    "Joined room {} as {} in seat {}, steer {}/{}",
                    self.room_code,
                    player_id,
                    self.seat.map_or_else(|| "?".to_string(), |s| s.to_string()),
                    back.as_str(),
                    forward.as_str()
                );
                self.game_state = Some(game_state);
                self.last_tick = None;
                Ok(true)
            }
            Packet::PlayerListUpdate { players } => {
                debug!("Room now has {} players", players.len());
                self.refresh_seat(players);
                Ok(false)
            }
            Packet::GameState { tick, game_state } => {
                if self.last_tick.is_some_and(|last| tick <= last) {
                    debug!("Discarding stale state for tick {}", tick);
                    return Ok(false);
                }
                self.last_tick = Some(tick);
                self.game_state = Some(game_state);
                Ok(true)
            }
            Packet::Error { message } => Err(ClientError::from_relay_message(message)),
            other => {
                warn!("Controller ignoring unexpected {} packet", other.kind());
                Ok(false)
            }
        }
    }
}

fn describe(session: &ControllerSession) -> Option<String> {
    let state = session.game_state()?;
    let mut scores: Vec<String> = session
        .players()
        .iter()
        .map(|p| format!("{} {}", p.name, state.scores.get(&p.id).copied().unwrap_or(0)))
        .collect();
    scores.sort();
    Some(match state.status {
        GameStatus::Waiting => format!("waiting for the host ({})", scores.join(", ")),
        GameStatus::Playing => format!("playing: {}", scores.join(", ")),
        GameStatus::GameOver => format!(
            "game over, {} wins ({})",
            state.winner.as_deref().unwrap_or("Unknown"),
            scores.join(", ")
        ),
    })
}

/// Runs a controller until the host leaves, the relay goes away or `quit`
/// is typed. Each stdin line is one command.
pub async fn run_controller(
    mut link: RelayLink,
    mut session: ControllerSession,
) -> Result<(), ClientError> {
    link.send(session.join_packet())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut shown = None;

    loop {
        tokio::select! {
            packet = link.recv() => {
                let Some(packet) = packet else {
                    return Err(ClientError::ConnectionClosed);
                };
                if session.handle_packet(packet)? {
                    let summary = describe(&session);
                    if summary != shown {
                        if let Some(text) = &summary {
                            info!("{}", text);
                        }
                        shown = summary;
                    }
                }
            },

            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => match Command::parse(&line) {
                        Some(Command::Quit) => {
                            link.send(Packet::Disconnect)?;
                            return Ok(());
                        }
                        Some(command) => {
                            if let Some(packet) = session.input_packet(command) {
                                link.send(packet)?;
                            }
                        }
                        None => warn!("Unknown command {:?}", line.trim()),
                    },
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        warn!("Stopped reading stdin: {}", e);
                        stdin_open = false;
                    }
                }
            },
        }
    }
}
