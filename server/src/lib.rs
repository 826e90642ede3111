//! # Scoreboard Server Library
//!
//! Authoritative server for a live table-tennis scoreboard. It owns the one
//! match state, applies commands from control clients, and pushes the full
//! state to every connected viewer after each accepted change.
//!
//! ## Architecture
//!
//! ### Single Writer
//! All mutation happens in one task. Connection tasks forward raw text frames
//! to the main loop, which owns the [`dispatcher::Dispatcher`]. Each command
//! is validated, snapshotted for undo, applied and broadcast before the next
//! one is looked at, so viewers never observe a half-applied command.
//!
//! ### Fail Silent
//! Commands that break a rule (scoring after the match ended, a second
//! time-out, an unparseable payload) are dropped without a reply. Inside the
//! server they are explicit [`scoreboard_shared::Rejection`] values, which
//! keeps the behaviour testable and shows up in `debug` logs.
//!
//! ### Full-State Broadcast
//! Viewers always receive the whole `MatchState` as JSON, on connect and
//! after every applied command. There are no diffs to reconcile.
//!
//! ## Module Organization
//!
//! - [`match_store`]: the state aggregate plus its atomic entry points
//! - [`undo_log`]: bounded snapshot history
//! - [`dispatcher`]: command parsing and routing
//! - [`client_manager`]: registry of connected viewers
//! - [`network`]: WebSocket accept loop, main loop and fan-out
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use scoreboard_server::network::Server;
//! use scoreboard_shared::RuleConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::new("0.0.0.0:8787", 64, RuleConfig::default()).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod dispatcher;
pub mod error;
pub mod match_store;
pub mod network;
pub mod undo_log;
pub mod utils;

pub use error::ServerError;
