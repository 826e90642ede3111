//! # Scoreboard Client Library
//!
//! Terminal controller and viewer for the scoreboard server. The same
//! connection type is used for both roles: every viewer receives the full
//! match state on connect and after each applied command, and any viewer may
//! send commands.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! Maps operator actions (score a point, call a time-out, change settings,
//! start the match) onto wire commands. Starting without a chosen server
//! draws lots for who serves first.
//!
//! ### Network Module (`network`)
//! Owns the WebSocket connection: sends commands and decodes state frames.
//! Because the server never replies to a rejected command, a command counts
//! as applied only when a new state arrives within the wait window.
//!
//! ### Rendering Module (`rendering`)
//! Formats the state as a compact text board with sets, points, the serving
//! side, used time-outs and match point.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use scoreboard_client::network::Client;
//! use scoreboard_client::rendering::Renderer;
//! use scoreboard_shared::Command;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::connect("ws://127.0.0.1:8787").await?;
//!     if let Some(state) = client.execute(&Command::PointA, Duration::from_secs(2)).await? {
//!         print!("{}", Renderer::default().render(&state));
//!     }
//!     Ok(())
//! }
//! ```

pub mod input;
pub mod network;
pub mod rendering;
