use thiserror::Error;

/// Failures a participant can see. The `Display` text is what travels in
/// [`crate::Packet::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Room not found.")]
    RoomNotFound,
    #[error("Room is full.")]
    RoomFull,
    #[error("Host disconnected. Game over.")]
    HostDisconnected,
    #[error("Invalid room code '{0}': expected 4 digits.")]
    InvalidCode(String),
    #[error("No free room codes right now, try again later.")]
    NoFreeRoomCodes,
    #[error("Already in a room on this connection.")]
    AlreadyInRoom,
}

impl SessionError {
    /// Only a lost host ends the session for everyone else in the room.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionError::HostDisconnected)
    }
}
