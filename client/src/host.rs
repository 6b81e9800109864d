//! Host session: owns the simulation and publishes its state through the relay.

use crate::error::ClientError;
use crate::network::RelayLink;
use crate::simulation::Simulation;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::Rng;
use shared::{GameStatus, Packet, Player, RoomCode, MIN_PLAYERS_TO_START};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, MissedTickBehavior};

/// Ticks between periodic stats lines.
const STATS_EVERY: u64 = 60;

pub struct HostSession<R = StdRng> {
    host_id: String,
    room_code: Option<RoomCode>,
    simulation: Simulation<R>,
    auto_start: Option<usize>,
}

impl HostSession<StdRng> {
    pub fn new(host_id: impl Into<String>, auto_start: Option<usize>) -> Self {
        Self::with_simulation(host_id, auto_start, Simulation::new())
    }
}

impl<R: Rng> HostSession<R> {
    pub fn with_simulation(
        host_id: impl Into<String>,
        auto_start: Option<usize>,
        simulation: Simulation<R>,
    ) -> Self {
        Self {
            host_id: host_id.into(),
            room_code: None,
            simulation,
            auto_start,
        }
    }

    pub fn host_id(&self) -> &str {
        &self.host_id
    }

    pub fn room_code(&self) -> Option<&RoomCode> {
        self.room_code.as_ref()
    }

    pub fn simulation(&self) -> &Simulation<R> {
        &self.simulation
    }

    pub fn is_playing(&self) -> bool {
        self.simulation.status() == GameStatus::Playing
    }

    pub fn create_room_packet(&self) -> Packet {
        Packet::CreateRoom {
            host_id: self.host_id.clone(),
        }
    }

    /// Reacts to one packet from the relay, returning what to send back.
    pub fn handle_packet(&mut self, packet: Packet) -> Result<Vec<Packet>, ClientError> {
        match packet {
            Packet::RoomCreated { code } => {
                if let Some(existing) = &self.room_code {
                    warn!("Ignoring second room code {} (already hosting {})", code, existing);
                } else {
                    info!("Room {} ready, controllers join with code {}", code, code);
                    self.room_code = Some(code);
                }
                Ok(Vec::new())
            }
            Packet::PlayerListUpdate { players } => Ok(self.sync_players(players)),
            Packet::PlayerInput {
                player_id,
                direction,
                action,
            } => {
                debug!("{} {:?} {}", player_id, action, direction.as_str());
                self.simulation.set_input(&player_id, direction, action);
                Ok(Vec::new())
            }
            Packet::Error { message } => Err(ClientError::Relay(message)),
            other => {
                warn!("Host ignoring unexpected {} packet", other.kind());
                Ok(Vec::new())
            }
        }
    }

    fn sync_players(&mut self, players: Vec<Player>) -> Vec<Packet> {
        let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        info!("Players seated: {}", names.join(", "));
        let count = players.len();
        self.simulation.sync_roster(players);

        match self.auto_start {
            Some(wanted) if count >= wanted.max(MIN_PLAYERS_TO_START) => {
                self.start().into_iter().collect()
            }
            _ => Vec::new(),
        }
    }

    /// Starts play, returning the first snapshot to publish.
    pub fn start(&mut self) -> Option<Packet> {
        if self.simulation.start() {
            self.snapshot()
        } else {
            if self.simulation.status() == GameStatus::Waiting {
                info!(
                    "Need at least {} players to start, have {}",
                    MIN_PLAYERS_TO_START,
                    self.simulation.players().len()
                );
            }
            None
        }
    }

    /// Current state addressed to the room, once the relay has assigned one.
    pub fn snapshot(&self) -> Option<Packet> {
        let code = self.room_code.as_ref()?;
        Some(Packet::GameStateUpdate {
            room_code: code.to_string(),
            tick: self.simulation.tick(),
            game_state: self.simulation.state().clone(),
        })
    }

    /// Advances the simulation one step and returns the snapshot to publish.
    pub fn tick(&mut self) -> Option<Packet> {
        if !self.simulation.step() {
            return None;
        }

        let tick = self.simulation.tick();
        if tick % STATS_EVERY == 0 {
            let ball = &self.simulation.state().ball;
            debug!(
                "Tick {}: ball ({:.1}, {:.1}) moving ({:.2}, {:.2})",
                tick, ball.x, ball.y, ball.dx, ball.dy
            );
        }
        if self.simulation.status() == GameStatus::GameOver {
            info!(
                "Game over, winner: {}",
                self.simulation
                    .state()
                    .winner
                    .as_deref()
                    .unwrap_or("nobody")
            );
        }

        self.snapshot()
    }
}

/// Runs a host until the relay goes away or `quit` is typed.
///
/// Ticks only while the game is in play. Typing `start` on stdin starts the
/// game by hand.
pub async fn run_host<R: Rng>(
    mut link: RelayLink,
    mut session: HostSession<R>,
    tick_rate: u32,
) -> Result<(), ClientError> {
    info!("Host {} asking the relay for a room", session.host_id());
    link.send(session.create_room_packet())?;

    let mut ticker = interval(Duration::from_secs_f64(1.0 / f64::from(tick_rate.max(1))));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            packet = link.recv() => {
                let Some(packet) = packet else {
                    return Err(ClientError::ConnectionClosed);
                };
                for reply in session.handle_packet(packet)? {
                    link.send(reply)?;
                }
            },

            _ = ticker.tick(), if session.is_playing() => {
                if let Some(snapshot) = session.tick() {
                    link.send(snapshot)?;
                }
            },

            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => match line.trim() {
                        "start" => {
                            if let Some(snapshot) = session.start() {
                                link.send(snapshot)?;
                            }
                        }
                        "quit" | "q" => {
                            info!("Closing room");
                            link.send(Packet::Disconnect)?;
                            return Ok(());
                        }
                        "" => {}
                        other => warn!("Unknown command {:?}, try start or quit", other),
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
