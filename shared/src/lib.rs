//! Types, constants and wire protocol shared by the relay and its clients.
//!
//! Every crate in the workspace agrees on the board geometry, the shape of
//! [`GameState`] and the [`Packet`] enum defined here. The host simulation and
//! the relay's join bookkeeping both build paddles from [`Paddle::for_seat`],
//! so a freshly joined controller and the host always agree on seat poses.

pub mod error;
pub mod framing;
pub mod model;
pub mod protocol;
pub mod room_code;

pub use error::SessionError;
pub use model::{Ball, Direction, GameState, GameStatus, InputAction, Paddle, Player};
pub use protocol::Packet;
pub use room_code::RoomCode;

pub const GAME_WIDTH: f32 = 800.0;
pub const GAME_HEIGHT: f32 = 600.0;

pub const VERTICAL_PADDLE_WIDTH: f32 = 15.0;
pub const VERTICAL_PADDLE_HEIGHT: f32 = 100.0;
pub const HORIZONTAL_PADDLE_WIDTH: f32 = 100.0;
pub const HORIZONTAL_PADDLE_HEIGHT: f32 = 15.0;
pub const PADDLE_MARGIN_X: f32 = 20.0;
pub const PADDLE_MARGIN_Y: f32 = 20.0;
/// Paddle travel per tick while a direction is held.
pub const PADDLE_SPEED: f32 = 8.0;

pub const BALL_RADIUS: f32 = 10.0;
pub const INITIAL_BALL_SPEED_X: f32 = 5.0;
pub const INITIAL_BALL_SPEED_Y: f32 = 5.0;
/// Applied to the reflected velocity component on every paddle hit.
pub const BALL_SPEEDUP: f32 = 1.02;

pub const MAX_PLAYERS: usize = 4;
pub const MIN_PLAYERS_TO_START: usize = 2;
pub const WINNING_SCORE: u32 = 10;

pub const DEFAULT_TICK_RATE: u32 = 60;
pub const DEFAULT_RELAY_PORT: u16 = 3000;
