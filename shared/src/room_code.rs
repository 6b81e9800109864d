//! Four-digit room codes and deep-link parsing.

use crate::SessionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ROOM_CODE_MIN: u16 = 1000;
pub const ROOM_CODE_MAX: u16 = 9999;

/// Query parameter carrying a room code in a join link.
pub const JOIN_QUERY_PARAM: &str = "join";

/// A string of exactly four ASCII digits.
///
/// Freshly allocated codes are always in `1000..=9999`; parsing accepts any
/// four digits so that a typo like `0420` is reported as an unknown room
/// rather than a malformed one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomCode(String);

impl RoomCode {
    /// Builds a code from an allocated number; `None` outside `1000..=9999`.
    pub fn from_number(value: u16) -> Option<Self> {
        (ROOM_CODE_MIN..=ROOM_CODE_MAX)
            .contains(&value)
            .then(|| RoomCode(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(raw: &str) -> bool {
        raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit())
    }

    /// Extracts the code from a link such as `https://host/?join=1234`.
    ///
    /// Returns `None` when the parameter is absent or malformed, in which
    /// case the caller falls back to manual entry.
    pub fn from_join_link(link: &str) -> Option<Self> {
        let query = link.split_once('?')?.1;
        let query = query.split('#').next().unwrap_or(query);
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == JOIN_QUERY_PARAM)
            .and_then(|(_, value)| value.parse().ok())
    }
}

impl FromStr for RoomCode {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Self::is_valid(s) {
            Ok(RoomCode(s.to_string()))
        } else {
            Err(SessionError::InvalidCode(s.to_string()))
        }
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_codes() {
        assert_eq!("1234".parse::<RoomCode>().unwrap().as_str(), "1234");
        assert!("0420".parse::<RoomCode>().is_ok());
    }

    #[test]
    fn test_parse_rejects_malformed_codes() {
        for raw in ["", "123", "12345", "12a4", "abcd", "-123", "١٢٣٤", " 1234", "5678\n"] {
            assert_eq!(
                raw.parse::<RoomCode>(),
                Err(SessionError::InvalidCode(raw.to_string())),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_number_bounds() {
        assert_eq!(RoomCode::from_number(1000).unwrap().as_str(), "1000");
        assert_eq!(RoomCode::from_number(9999).unwrap().as_str(), "9999");
        assert!(RoomCode::from_number(999).is_none());
        assert!(RoomCode::from_number(10000).is_none());
    }

    #[test]
    fn test_join_link_parsing() {
        let code = RoomCode::from_join_link("https://play.example/?join=4321").unwrap();
        assert_eq!(code.as_str(), "4321");

        let code = RoomCode::from_join_link("http://x/app?lang=en&join=1111#top").unwrap();
        assert_eq!(code.as_str(), "1111");
    }

    #[test]
    fn test_join_link_falls_through_when_absent_or_invalid() {
        assert!(RoomCode::from_join_link("https://play.example/").is_none());
        assert!(RoomCode::from_join_link("https://play.example/?join=").is_none());
        assert!(RoomCode::from_join_link("https://play.example/?join=12345").is_none());
        assert!(RoomCode::from_join_link("https://play.example/?rejoin=1234").is_none());
        assert!(RoomCode::from_join_link("https://play.example/?join= 1234").is_none());
    }
}
