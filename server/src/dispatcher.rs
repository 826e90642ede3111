//! Routes inbound commands to the match store
//!
//! The dispatcher is the only writer of match state. A command is either
//! applied in full or rejected with a [`Rejection`]; only applied commands
//! should be followed by a broadcast.

use crate::match_store::MatchStore;
use log::debug;
use scoreboard_shared::command::parse_side;
use scoreboard_shared::rules::{Outcome, Rejection};
use scoreboard_shared::{Command, MatchState, RuleConfig, Side};

#[derive(Debug, Default)]
pub struct Dispatcher {
    store: MatchStore,
}

impl Dispatcher {
    pub fn new(rules: RuleConfig) -> Self {
        Self {
            store: MatchStore::new(rules),
        }
    }

    pub fn state(&self) -> &MatchState {
        self.store.state()
    }

    pub fn store(&self) -> &MatchStore {
        &self.store
    }

    /// Parses a raw text frame and applies it
    pub fn handle_message(&mut self, payload: &str, at: u64) -> Outcome {
        let command = Command::parse(payload).map_err(|e| Rejection::Malformed(e.to_string()))?;
        self.dispatch(command, at)
    }

    /// Applies one command at time `at` (unix milliseconds)
    pub fn dispatch(&mut self, command: Command, at: u64) -> Outcome {
        debug!("Dispatching {:?}", command);

        match command {
            Command::PointA => self.store.record_point(Side::A, at),
            Command::PointB => self.store.record_point(Side::B, at),
            Command::TimeoutA => self.store.record_timeout_start(Side::A),
            Command::TimeoutB => self.store.record_timeout_start(Side::B),
            Command::EndTimeout => self.store.record_timeout_end(),
            Command::Undo => self.store.undo(),
            Command::ResetMatch => self.store.reset_match_keep_settings(at),
            Command::ResetAll => self.store.reset_all(),
            Command::UpdateSettings(patch) => self.store.apply_settings(&patch.normalize()),
            Command::StartMatch { first_server } => match parse_side(first_server.as_ref()) {
                Some(side) => self.store.start_match(side),
                None => Err(Rejection::Malformed(
                    "firstServer must be \"A\" or \"B\"".to_string(),
                )),
            },
        }
    }

    /// Full-state payload sent to viewers
    pub fn state_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self.store.state())
    }
}
