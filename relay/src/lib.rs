//! # Relay Server Library
//!
//! The relay is the only process every participant connects to. It never runs
//! the game: one host per room owns the simulation, and the relay's job is to
//! keep rooms apart and get each message to the right connections.
//!
//! ## Core Responsibilities
//!
//! ### Room Lifecycle
//! Hosts ask for a room and receive a four-digit code that is unique among
//! live rooms. The room lives exactly as long as the host's connection does.
//! When the host drops, everyone still in the room is told and the code is
//! released.
//!
//! ### Seating
//! Up to four controllers join a room by code. Each gets a seat that fixes
//! its paddle pose, and the room's stored snapshot gains a paddle and a zero
//! score for it, so the joiner can draw the board immediately.
//!
//! ### Routing
//! - Controller inputs go to the room's host and nowhere else
//! - Host state snapshots go to every controller in the room, never back to
//!   the host
//! - Roster changes go to everyone in the room
//!
//! ## Architecture Design
//!
//! ### Single Routing Loop
//! Per-connection tasks read and write frames, but all room mutation happens
//! in one loop that handles one event at a time. Rooms share no state, and
//! no event handler blocks, so a plain `HashMap` is enough.
//!
//! ### Framed TCP
//! Connections are TCP streams carrying length-prefixed bincode
//! [`shared::Packet`]s, which gives reliable in-order delivery per
//! connection.
//!
//! ## Module Organization
//!
//! ### Registry Module (`registry`)
//! Room records, code allocation, seat assignment and departures.
//!
//! ### Router Module (`router`)
//! Turns one inbound packet or disconnect into a list of deliveries.
//!
//! ### Network Module (`network`)
//! Listener, connection tasks and the routing loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use relay::network::RelayServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = RelayServer::bind("0.0.0.0:3000").await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod network;
pub mod registry;
pub mod router;
