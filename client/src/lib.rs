//! # Paddle Client Library
//!
//! Both ends of a room that are not the relay: the host, which runs the
//! authoritative game, and the controllers, which steer one paddle each.
//!
//! ## Architecture Overview
//!
//! The host is the single writer of [`shared::GameState`]. Controllers never
//! simulate anything; they send press/release intents and display whatever
//! the host last published. The relay sits in between and only routes.
//!
//! ### Authoritative Simulation
//! The host advances the game at a fixed tick rate while it is in play. Every
//! mutation is a [`simulation::GameAction`] applied by
//! [`simulation::reduce`], so the rules can be tested without a network.
//!
//! ### State Broadcasting
//! After each tick the host publishes a snapshot stamped with its tick
//! number. Controllers drop any snapshot that is not newer than the last one
//! they applied.
//!
//! ## Module Organization
//!
//! ### Simulation Module (`simulation`)
//! - Paddle movement and clamping
//! - Ball integration, paddle collisions, speed-up per hit
//! - Scoring, round resets and win detection
//!
//! ### Host Module (`host`)
//! - Room creation and roster tracking
//! - Applying routed player input
//! - Tick loop and snapshot publishing
//!
//! ### Controller Module (`controller`)
//! - Joining a room and learning the seat
//! - Following published state, discarding stale snapshots
//!
//! ### Input Module (`input`)
//! Turns typed commands into press/release events for the seat's axis.
//!
//! ### Network Module (`network`)
//! Framed TCP link to the relay with background reader and writer tasks.

pub mod controller;
pub mod error;
pub mod host;
pub mod input;
pub mod network;
pub mod simulation;

use rand::Rng;

/// A fresh identifier such as `player_3f09a2c1`.
pub fn random_id<R: Rng>(prefix: &str, rng: &mut R) -> String {
    format!("{}_{:08x}", prefix, rng.gen::<u32>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_id_shape() {
        let mut rng = StdRng::seed_from_u64(8);
        let id = random_id("player", &mut rng);
        assert!(id.starts_with("player_"));
        assert_eq!(id.len(), "player_".len() + 8);
        assert_ne!(id, random_id("player", &mut rng));
    }
}
