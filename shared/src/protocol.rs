use crate::{Direction, GameState, InputAction, Player, RoomCode};
use serde::{Deserialize, Serialize};

/// Every message exchanged between the relay, the host and controllers.
///
/// Room codes sent by clients stay raw strings: the relay validates them and
/// answers malformed ones with an [`Packet::Error`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Packet {
    // host -> relay
    CreateRoom {
        host_id: String,
    },
    GameStateUpdate {
        room_code: String,
        tick: u64,
        game_state: GameState,
    },

    // controller -> relay
    JoinRoom {
        room_code: String,
        player_id: String,
    },
    Input {
        room_code: String,
        player_id: String,
        direction: Direction,
        action: InputAction,
    },

    // either client -> relay
    Disconnect,

    // relay -> host
    RoomCreated {
        code: RoomCode,
    },
    PlayerInput {
        player_id: String,
        direction: Direction,
        action: InputAction,
    },

    // relay -> controllers
    JoinSuccess {
        player_id: String,
        players: Vec<Player>,
        game_state: GameState,
    },
    GameState {
        tick: u64,
        game_state: GameState,
    },

    // relay -> everyone in a room
    PlayerListUpdate {
        players: Vec<Player>,
    },
    Error {
        message: String,
    },
}

impl Packet {
    pub fn kind(&self) -> &'static str {
        match self {
            Packet::CreateRoom { .. } => "createRoom",
            Packet::GameStateUpdate { .. } => "gameStateUpdate",
            Packet::JoinRoom { .. } => "joinRoom",
            Packet::Input { .. } => "input",
            Packet::Disconnect => "disconnect",
            Packet::RoomCreated { .. } => "roomCreated",
            Packet::PlayerInput { .. } => "playerInput",
            Packet::JoinSuccess { .. } => "joinSuccess",
            Packet::GameState { .. } => "gameState",
            Packet::PlayerListUpdate { .. } => "playerListUpdate",
            Packet::Error { .. } => "error",
        }
    }
}

impl From<crate::SessionError> for Packet {
    fn from(err: crate::SessionError) -> Self {
        Packet::Error {
            message: err.to_string(),
        }
    }
}
