//! Authoritative paddle/ball simulation run by the host.
//!
//! Every change to [`GameState`] goes through [`reduce`], one [`GameAction`]
//! at a time. [`Simulation`] strings those actions together into a tick and
//! keeps what the state itself does not hold: the held direction of each
//! player, the roster used for winner names, and the random source for ball
//! serves.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{
    Direction, GameState, GameStatus, InputAction, Paddle, Player, BALL_SPEEDUP, GAME_HEIGHT,
    GAME_WIDTH, INITIAL_BALL_SPEED_X, INITIAL_BALL_SPEED_Y, MIN_PLAYERS_TO_START, PADDLE_SPEED,
    WINNING_SCORE,
};
use std::collections::HashMap;

/// Board edge the ball left through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameAction {
    StartGame,
    MovePaddle {
        player_id: String,
        direction: Direction,
    },
    /// Integrate the ball and bounce it off paddles.
    UpdateGame,
    /// Credit the scorer for the current exit, then serve a new ball.
    ResetRound,
    SetWinner(String),
    /// Make paddles and scores match the seated players.
    SyncRoster(Vec<Player>),
}

/// Which edge, if any, the ball has fully crossed.
pub fn exit_side(state: &GameState) -> Option<Exit> {
    let ball = &state.ball;
    if ball.x + ball.radius < 0.0 {
        Some(Exit::Left)
    } else if ball.x - ball.radius > GAME_WIDTH {
        Some(Exit::Right)
    } else if ball.y + ball.radius < 0.0 {
        Some(Exit::Top)
    } else if ball.y - ball.radius > GAME_HEIGHT {
        Some(Exit::Bottom)
    } else {
        None
    }
}

/// The player defending the edge opposite `exit`, if that seat is taken.
pub fn scorer_for(state: &GameState, exit: Exit) -> Option<String> {
    state
        .paddles
        .iter()
        .find(|(_, paddle)| {
            let (cx, cy) = paddle.center();
            match exit {
                Exit::Left => paddle.is_vertical() && cx > GAME_WIDTH / 2.0,
                Exit::Right => paddle.is_vertical() && cx < GAME_WIDTH / 2.0,
                Exit::Top => !paddle.is_vertical() && cy > GAME_HEIGHT / 2.0,
                Exit::Bottom => !paddle.is_vertical() && cy < GAME_HEIGHT / 2.0,
            }
        })
        .map(|(id, _)| id.clone())
}

fn serve<R: Rng>(state: &mut GameState, rng: &mut R) {
    let ball = &mut state.ball;
    ball.x = GAME_WIDTH / 2.0;
    ball.y = GAME_HEIGHT / 2.0;
    ball.dx = if rng.gen_bool(0.5) {
        INITIAL_BALL_SPEED_X
    } else {
        -INITIAL_BALL_SPEED_X
    };
    ball.dy = if rng.gen_bool(0.5) {
        INITIAL_BALL_SPEED_Y
    } else {
        -INITIAL_BALL_SPEED_Y
    };
}

fn move_paddle(paddle: &mut Paddle, direction: Direction) {
    // Orthogonal directions do not move a paddle.
    if paddle.is_vertical() != direction.is_vertical() {
        return;
    }
    match direction {
        Direction::Up => paddle.y -= PADDLE_SPEED,
        Direction::Down => paddle.y += PADDLE_SPEED,
        Direction::Left => paddle.x -= PADDLE_SPEED,
        Direction::Right => paddle.x += PADDLE_SPEED,
    }
    paddle.x = paddle.x.clamp(0.0, GAME_WIDTH - paddle.width);
    paddle.y = paddle.y.clamp(0.0, GAME_HEIGHT - paddle.height);
}

fn bounce(state: &mut GameState) {
    let ball = &mut state.ball;
    for paddle in state.paddles.values() {
        if paddle.is_vertical() {
            if ball.x - ball.radius < paddle.x + paddle.width
                && ball.x + ball.radius > paddle.x
                && ball.y > paddle.y
                && ball.y < paddle.y + paddle.height
            {
                ball.dx = -ball.dx * BALL_SPEEDUP;
            }
        } else if ball.y - ball.radius < paddle.y + paddle.height
            && ball.y + ball.radius > paddle.y
            && ball.x > paddle.x
            && ball.x < paddle.x + paddle.width
        {
            ball.dy = -ball.dy * BALL_SPEEDUP;
        }
    }
}

/// Applies one action. Never fails: actions that do not fit the current
/// state leave it unchanged.
pub fn reduce<R: Rng>(state: &mut GameState, action: GameAction, rng: &mut R) {
    match action {
        GameAction::StartGame => {
            if state.status == GameStatus::Waiting && state.paddles.len() >= MIN_PLAYERS_TO_START {
                state.status = GameStatus::Playing;
                serve(state, rng);
            }
        }
        GameAction::MovePaddle {
            player_id,
            direction,
        } => {
            if let Some(paddle) = state.paddles.get_mut(&player_id) {
                move_paddle(paddle, direction);
            }
        }
        GameAction::UpdateGame => {
            state.ball.x += state.ball.dx;
            state.ball.y += state.ball.dy;
            bounce(state);
        }
        GameAction::ResetRound => {
            if let Some(scorer) = exit_side(state).and_then(|exit| scorer_for(state, exit)) {
                if let Some(score) = state.scores.get_mut(&scorer) {
                    *score += 1;
                }
            }
            serve(state, rng);
        }
        GameAction::SetWinner(name) => {
            state.winner = Some(name);
            state.status = GameStatus::GameOver;
        }
        GameAction::SyncRoster(players) => {
            state.paddles.retain(|id, _| players.iter().any(|p| &p.id == id));
            state.scores.retain(|id, _| players.iter().any(|p| &p.id == id));
            for player in &players {
                state.add_player(player);
            }
        }
    }
}

/// Host-side engine: owns the state and drives it one tick at a time.
pub struct Simulation<R = StdRng> {
    state: GameState,
    players: Vec<Player>,
    inputs: HashMap<String, Direction>,
    tick: u64,
    rng: R,
}

impl Simulation<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for Simulation<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Simulation<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            state: GameState::new(),
            players: Vec::new(),
            inputs: HashMap::new(),
            tick: 0,
            rng,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Number of ticks advanced so far; stamps outgoing snapshots.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn held_direction(&self, player_id: &str) -> Option<Direction> {
        self.inputs.get(player_id).copied()
    }

    fn apply(&mut self, action: GameAction) {
        reduce(&mut self.state, action, &mut self.rng);
    }

    /// Replaces the roster, seating newcomers and dropping departed players.
    pub fn sync_roster(&mut self, players: Vec<Player>) {
        self.inputs
            .retain(|id, _| players.iter().any(|p| &p.id == id));
        self.players = players.clone();
        self.apply(GameAction::SyncRoster(players));
    }

    /// Starts play if enough players are seated. Returns whether it started.
    pub fn start(&mut self) -> bool {
        if self.state.status != GameStatus::Waiting {
            return false;
        }
        self.apply(GameAction::StartGame);
        let started = self.state.status == GameStatus::Playing;
        if started {
            info!(
                "Game started with {} players, serving ({:.1}, {:.1})",
                self.state.paddles.len(),
                self.state.ball.dx,
                self.state.ball.dy
            );
        }
        started
    }

    /// Records a press or release. Only the latest direction is kept.
    pub fn set_input(&mut self, player_id: &str, direction: Direction, action: InputAction) {
        if self.state.status == GameStatus::GameOver {
            return;
        }
        if !self.state.paddles.contains_key(player_id) {
            debug!("Ignoring input from unseated player {}", player_id);
            return;
        }
        match action {
            InputAction::Press => {
                self.inputs.insert(player_id.to_string(), direction);
            }
            InputAction::Release => {
                self.inputs.remove(player_id);
            }
        }
    }

    fn winner(&self) -> Option<String> {
        let (id, _) = self
            .state
            .scores
            .iter()
            .find(|(_, score)| **score >= WINNING_SCORE)?;
        let name = self
            .players
            .iter()
            .find(|p| &p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        Some(name)
    }

    fn check_winner(&mut self) -> bool {
        match self.winner() {
            Some(name) => {
                info!("{} wins after {} ticks", name, self.tick);
                self.apply(GameAction::SetWinner(name));
                true
            }
            None => false,
        }
    }

    /// Advances one tick. Returns false when nothing ran because the game is
    /// not in play.
    pub fn step(&mut self) -> bool {
        if self.state.status != GameStatus::Playing {
            return false;
        }
        self.tick += 1;

        if self.check_winner() {
            return true;
        }

        let mut held: Vec<(String, Direction)> = self
            .inputs
            .iter()
            .map(|(id, direction)| (id.clone(), *direction))
            .collect();
        held.sort_by(|a, b| a.0.cmp(&b.0));
        for (player_id, direction) in held {
            self.apply(GameAction::MovePaddle {
                player_id,
                direction,
            });
        }

        self.apply(GameAction::UpdateGame);

        if let Some(exit) = exit_side(&self.state) {
            debug!("Ball out {:?} at tick {}", exit, self.tick);
            self.apply(GameAction::ResetRound);
            self.check_winner();
        }

        true
    }
}
