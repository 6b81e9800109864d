use shared::SessionError;
use std::io;
use thiserror::Error;

/// Why a host or controller session stopped.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The relay sent an error message; terminal for the session.
    #[error("relay: {0}")]
    Relay(String),
    #[error("connection to relay closed")]
    ConnectionClosed,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ClientError {
    /// Wraps an error message from the relay, recognising the host loss.
    pub fn from_relay_message(message: String) -> Self {
        if message == SessionError::HostDisconnected.to_string() {
            ClientError::Session(SessionError::HostDisconnected)
        } else {
            ClientError::Relay(message)
        }
    }

    /// The room is gone for good; a retry needs a new room code.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClientError::Session(err) if err.is_terminal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_loss_message_is_terminal() {
        let err = ClientError::from_relay_message("Host disconnected. Game over.".into());
        assert!(err.is_terminal());
        assert_eq!(err.to_string(), "Host disconnected. Game over.");
    }

    #[test]
    fn test_other_messages_stay_relay_errors() {
        let err = ClientError::from_relay_message("Room not found.".into());
        assert!(matches!(&err, ClientError::Relay(m) if m == "Room not found."));
        assert!(!err.is_terminal());
        assert!(!ClientError::ConnectionClosed.is_terminal());
    }
}
