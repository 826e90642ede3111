//! Types and rules shared by the scoreboard server and its clients
//!
//! - [`state`]: the `MatchState` aggregate broadcast to viewers, plus the ruleset flags
//! - [`rules`]: point, set and match transitions for a best-of-N table-tennis match
//! - [`command`]: the JSON command envelope accepted from control clients

pub mod command;
pub mod rules;
pub mod state;

pub use command::{Command, Settings, SettingsPatch};
pub use rules::{Outcome, Rejection};
pub use state::{HistoryEvent, HistoryRecord, MatchState, Mode, RuleConfig, SetScore, Side};

pub const DEFAULT_PORT: u16 = 8787;
pub const UNDO_LIMIT: usize = 200;
pub const DEFAULT_BEST_OF: u32 = 5;
pub const DEFAULT_NAME_A: &str = "PLAYER A";
pub const DEFAULT_NAME_B: &str = "PLAYER B";

pub const POINTS_TO_WIN_SET: u32 = 11;
pub const DEUCE_THRESHOLD: u32 = 10;
pub const MIN_LEAD: u32 = 2;
