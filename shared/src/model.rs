//! Game data model: players, paddles, the ball and the full [`GameState`].

use crate::{
    BALL_RADIUS, GAME_HEIGHT, GAME_WIDTH, HORIZONTAL_PADDLE_HEIGHT, HORIZONTAL_PADDLE_WIDTH,
    PADDLE_MARGIN_X, PADDLE_MARGIN_Y, VERTICAL_PADDLE_HEIGHT, VERTICAL_PADDLE_WIDTH,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A seated participant as seen by every client.
///
/// `id` is generated by the controller and stays the same across reconnects,
/// `seat` is fixed when the player first joins and decides the paddle pose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub seat: u8,
}

impl Player {
    pub fn new(id: impl Into<String>, seat: u8) -> Self {
        Self {
            id: id.into(),
            name: format!("Player {}", seat + 1),
            seat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Paddle {
    /// Starting pose for a seat: left, right, top, bottom.
    pub fn for_seat(seat: u8) -> Option<Self> {
        let paddle = match seat {
            0 => Paddle {
                x: PADDLE_MARGIN_X,
                y: GAME_HEIGHT / 2.0 - VERTICAL_PADDLE_HEIGHT / 2.0,
                width: VERTICAL_PADDLE_WIDTH,
                height: VERTICAL_PADDLE_HEIGHT,
            },
            1 => Paddle {
                x: GAME_WIDTH - VERTICAL_PADDLE_WIDTH - PADDLE_MARGIN_X,
                y: GAME_HEIGHT / 2.0 - VERTICAL_PADDLE_HEIGHT / 2.0,
                width: VERTICAL_PADDLE_WIDTH,
                height: VERTICAL_PADDLE_HEIGHT,
            },
            2 => Paddle {
                x: GAME_WIDTH / 2.0 - HORIZONTAL_PADDLE_WIDTH / 2.0,
                y: PADDLE_MARGIN_Y,
                width: HORIZONTAL_PADDLE_WIDTH,
                height: HORIZONTAL_PADDLE_HEIGHT,
            },
            3 => Paddle {
                x: GAME_WIDTH / 2.0 - HORIZONTAL_PADDLE_WIDTH / 2.0,
                y: GAME_HEIGHT - HORIZONTAL_PADDLE_HEIGHT - PADDLE_MARGIN_Y,
                width: HORIZONTAL_PADDLE_WIDTH,
                height: HORIZONTAL_PADDLE_HEIGHT,
            },
            _ => return None,
        };
        Some(paddle)
    }

    pub fn is_vertical(&self) -> bool {
        self.width < self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Ball position and per-tick velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub radius: f32,
}

impl Ball {
    /// A motionless ball in the middle of the board.
    pub fn centered() -> Self {
        Self {
            x: GAME_WIDTH / 2.0,
            y: GAME_HEIGHT / 2.0,
            dx: 0.0,
            dy: 0.0,
            radius: BALL_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Waiting,
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// True for the directions a vertical (left/right seat) paddle travels in.
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputAction {
    Press,
    Release,
}

/// The authoritative snapshot the host advances and the relay fans out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub ball: Ball,
    pub paddles: HashMap<String, Paddle>,
    pub scores: HashMap<String, u32>,
    pub status: GameStatus,
    pub winner: Option<String>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            ball: Ball::centered(),
            paddles: HashMap::new(),
            scores: HashMap::new(),
            status: GameStatus::Waiting,
            winner: None,
        }
    }

    /// Seats a player: paddle at the seat pose and a zero score.
    ///
    /// Does nothing if the player already has a paddle, so a rejoin keeps
    /// the current position and score.
    pub fn add_player(&mut self, player: &Player) {
        if self.paddles.contains_key(&player.id) {
            return;
        }
        if let Some(paddle) = Paddle::for_seat(player.seat) {
            self.paddles.insert(player.id.clone(), paddle);
            self.scores.insert(player.id.clone(), 0);
        }
    }

    pub fn remove_player(&mut self, player_id: &str) {
        self.paddles.remove(player_id);
        self.scores.remove(player_id);
    }

    pub fn is_roster_consistent(&self, players: &[Player]) -> bool {
        players.len() == self.paddles.len()
            && players.len() == self.scores.len()
            && players
                .iter()
                .all(|p| self.paddles.contains_key(&p.id) && self.scores.contains_key(&p.id))
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_seat_poses_on_standard_board() {
        let left = Paddle::for_seat(0).unwrap();
        assert_eq!((left.x, left.y, left.width, left.height), (20.0, 250.0, 15.0, 100.0));
        assert!(left.is_vertical());

        let right = Paddle::for_seat(1).unwrap();
        assert_eq!((right.x, right.y), (765.0, 250.0));
        assert!(right.is_vertical());

        let top = Paddle::for_seat(2).unwrap();
        assert_eq!((top.x, top.y, top.width, top.height), (350.0, 20.0, 100.0, 15.0));
        assert!(!top.is_vertical());

        let bottom = Paddle::for_seat(3).unwrap();
        assert_eq!((bottom.x, bottom.y), (350.0, 565.0));
        assert!(!bottom.is_vertical());

        assert!(Paddle::for_seat(4).is_none());
    }

    #[test]
    fn test_paddle_center() {
        let (cx, cy) = Paddle::for_seat(1).unwrap().center();
        assert_approx_eq!(cx, 772.5, 0.001);
        assert_approx_eq!(cy, 300.0, 0.001);
    }

    #[test]
    fn test_player_name_follows_seat() {
        assert_eq!(Player::new("a", 0).name, "Player 1");
        assert_eq!(Player::new("d", 3).name, "Player 4");
    }

    #[test]
    fn test_new_game_state_is_waiting_with_centered_ball() {
        let state = GameState::new();
        assert_eq!(state.status, GameStatus::Waiting);
        assert_eq!(state.ball.x, GAME_WIDTH / 2.0);
        assert_eq!(state.ball.y, GAME_HEIGHT / 2.0);
        assert_eq!(state.ball.dx, 0.0);
        assert_eq!(state.ball.dy, 0.0);
        assert!(state.paddles.is_empty());
        assert!(state.scores.is_empty());
        assert!(state.winner.is_none());
    }

    #[test]
    fn test_add_and_remove_player_keep_maps_in_step() {
        let mut state = GameState::new();
        let a = Player::new("a", 0);
        let b = Player::new("b", 1);
        state.add_player(&a);
        state.add_player(&b);
        assert!(state.is_roster_consistent(&[a.clone(), b.clone()]));

        state.remove_player("a");
        assert!(state.is_roster_consistent(&[b]));
        assert!(!state.scores.contains_key("a"));
    }

    #[test]
    fn test_add_player_twice_keeps_score() {
        let mut state = GameState::new();
        let a = Player::new("a", 0);
        state.add_player(&a);
        state.scores.insert("a".into(), 3);
        state.add_player(&a);
        assert_eq!(state.scores["a"], 3);
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("UP".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!(" right ".parse::<Direction>(), Ok(Direction::Right));
        assert!("jump".parse::<Direction>().is_err());
        assert!(Direction::Down.is_vertical());
        assert!(!Direction::Left.is_vertical());
    }
}
