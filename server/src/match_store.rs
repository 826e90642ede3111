//! Owner of the canonical match state and its undo history
//!
//! Every mutating entry point runs against a working copy of the state. If
//! the rules accept the command, the previous state is pushed onto the undo
//! log and the copy replaces it. A rejected command leaves both untouched, so
//! no partially applied state is ever observable.

use crate::undo_log::UndoLog;
use log::info;
use scoreboard_shared::rules::{self, Outcome, Rejection};
use scoreboard_shared::{HistoryEvent, MatchState, RuleConfig, Settings, Side};

#[derive(Debug, Clone)]
pub struct MatchStore {
    state: MatchState,
    undo: UndoLog,
    rules: RuleConfig,
}

impl MatchStore {
    pub fn new(rules: RuleConfig) -> Self {
        Self {
            state: MatchState::new(&rules),
            undo: UndoLog::new(),
            rules,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Number of commands that can currently be undone
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Pushes a copy of the live state onto the undo log
    pub fn record_snapshot(&mut self) {
        self.undo.push(self.state.clone());
    }

    fn transact<F>(&mut self, mutation: F) -> Outcome
    where
        F: FnOnce(&mut MatchState, &RuleConfig) -> Outcome,
    {
        let mut working = self.state.clone();
        mutation(&mut working, &self.rules)?;

        self.record_snapshot();
        self.state = working;
        Ok(())
    }

    /// Merges validated settings into the state
    ///
    /// Primary names keep their previous value when the new one is blank.
    /// `best_of` only changes while it cannot contradict the sets already
    /// played, and never after an explicit start.
    pub fn apply_settings(&mut self, settings: &Settings) -> Outcome {
        self.transact(|state, rules| {
            let before = state.clone();

            if let Some(mode) = settings.mode {
                state.mode = mode;
            }

            if let Some(name) = settings.a1.as_deref().map(str::trim) {
                if !name.is_empty() {
                    state.a1 = name.to_string();
                }
            }
            if let Some(name) = settings.a2.as_deref() {
                state.a2 = name.trim().to_string();
            }
            if let Some(name) = settings.b1.as_deref().map(str::trim) {
                if !name.is_empty() {
                    state.b1 = name.to_string();
                }
            }
            if let Some(name) = settings.b2.as_deref() {
                state.b2 = name.trim().to_string();
            }

            if let Some(best_of) = settings.best_of {
                let needed = (best_of + 1) / 2;
                let locked = rules.explicit_start && state.match_started;
                let fits = !state.finished && state.sets_a < needed && state.sets_b < needed;
                if !locked && fits {
                    state.best_of = best_of;
                }
            }

            if let Some(side) = settings.server {
                state.server = Some(side);
                state.first_server_of_set = Some(side);
            }

            rules::compute_match_point(state);

            if *state == before {
                return Err(Rejection::NoChange);
            }
            Ok(())
        })
    }

    /// Begins play with `side` serving; only meaningful under explicit start
    pub fn start_match(&mut self, side: Side) -> Outcome {
        self.transact(|state, _| {
            if state.finished {
                return Err(Rejection::MatchFinished);
            }
            if state.match_started {
                return Err(Rejection::MatchAlreadyStarted);
            }

            state.match_started = true;
            state.server = Some(side);
            state.first_server_of_set = Some(side);
            Ok(())
        })
    }

    pub fn record_point(&mut self, side: Side, at: u64) -> Outcome {
        self.transact(|state, rules| rules::add_point(state, side, rules, at))
    }

    pub fn record_timeout_start(&mut self, side: Side) -> Outcome {
        self.transact(|state, _| rules::start_timeout(state, side))
    }

    pub fn record_timeout_end(&mut self) -> Outcome {
        self.transact(|state, _| rules::end_timeout(state))
    }

    /// Clears the score while keeping mode, names and format
    pub fn reset_match_keep_settings(&mut self, at: u64) -> Outcome {
        self.transact(|state, rules| {
            state.points_a = 0;
            state.points_b = 0;
            state.sets_a = 0;
            state.sets_b = 0;

            state.timeout_used_a = false;
            state.timeout_used_b = false;
            state.timeout_active = false;

            state.match_point_for = None;
            state.finished = false;

            if rules.explicit_start {
                state.match_started = false;
                state.server = None;
                state.first_server_of_set = None;
            } else {
                state.first_server_of_set = state.server;
            }

            state.point_history.clear();
            state.push_history(at, HistoryEvent::ResetMatch);

            rules::compute_match_point(state);
            Ok(())
        })
    }

    /// Replaces the state with fresh defaults and forgets all undo history
    pub fn reset_all(&mut self) -> Outcome {
        self.state = MatchState::new(&self.rules);
        self.undo.clear();
        info!("Match state reset to defaults");
        Ok(())
    }

    /// Restores the state captured before the last applied command
    pub fn undo(&mut self) -> Outcome {
        let snapshot = self.undo.pop().ok_or(Rejection::NothingToUndo)?;
        self.state = snapshot;

        if !self.rules.keep_match_point_on_undo {
            rules::compute_match_point(&mut self.state);
        }
        Ok(())
    }
}

impl Default for MatchStore {
    fn default() -> Self {
        Self::new(RuleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoreboard_shared::{Mode, UNDO_LIMIT};

    fn explicit() -> RuleConfig {
        RuleConfig {
            explicit_start: true,
            ..RuleConfig::default()
        }
    }

    fn win_set(store: &mut MatchStore, side: Side) {
        for _ in 0..11 {
            store.record_point(side, 0).unwrap();
        }
    }

    #[test]
    fn test_point_records_undo_snapshot() {
        let mut store = MatchStore::default();
        let before = store.state().clone();

        store.record_point(Side::A, 10).unwrap();
        assert_eq!(store.state().points_a, 1);
        assert_eq!(store.undo_depth(), 1);

        store.undo().unwrap();
        assert_eq!(store.state(), &before);
        assert_eq!(store.undo_depth(), 0);
    }

    #[test]
    fn test_rejected_command_leaves_no_snapshot() {
        let mut store = MatchStore::default();

        assert_eq!(store.record_timeout_end(), Err(Rejection::NoActiveTimeout));
        assert_eq!(store.undo_depth(), 0);
        assert_eq!(store.undo(), Err(Rejection::NothingToUndo));
    }

    #[test]
    fn test_undo_round_trip_every_command() {
        let mut store = MatchStore::default();
        for _ in 0..7 {
            store.record_point(Side::B, 1).unwrap();
        }

        let operations: [fn(&mut MatchStore) -> Outcome; 5] = [
            |s| s.record_point(Side::A, 2),
            |s| s.record_point(Side::B, 2),
            |s| s.record_timeout_start(Side::A),
            |s| s.reset_match_keep_settings(3),
            |s| {
                s.apply_settings(&Settings {
                    mode: Some(Mode::Doubles),
                    a2: Some("PARTNER".to_string()),
                    best_of: Some(3),
                    ..Settings::default()
                })
            },
        ];

        for operation in operations {
            let before = store.state().clone();

            operation(&mut store).unwrap();
            assert_ne!(store.state(), &before);

            store.undo().unwrap();
            assert_eq!(store.state(), &before);
        }
    }

    #[test]
    fn test_undo_round_trip_end_timeout() {
        let mut store = MatchStore::default();
        store.record_timeout_start(Side::B).unwrap();
        let before = store.state().clone();

        store.record_timeout_end().unwrap();
        assert!(!store.state().timeout_active);

        store.undo().unwrap();
        assert_eq!(store.state(), &before);
        assert!(store.state().timeout_active);
    }

    #[test]
    fn test_undo_round_trip_start_match() {
        let mut store = MatchStore::new(explicit());
        let before = store.state().clone();

        store.start_match(Side::B).unwrap();
        assert!(store.state().match_started);
        assert_eq!(store.state().first_server_of_set, Some(Side::B));

        store.undo().unwrap();
        assert_eq!(store.state(), &before);
        assert_eq!(store.state().server, None);
    }

    #[test]
    fn test_record_snapshot_captures_live_state() {
        let mut store = MatchStore::default();
        store.record_point(Side::A, 0).unwrap();
        let current = store.state().clone();

        store.record_snapshot();
        assert_eq!(store.undo_depth(), 2);

        store.undo().unwrap();
        assert_eq!(store.state(), &current);
        assert_eq!(store.undo_depth(), 1);
    }

    #[test]
    fn test_undo_restores_across_set_boundary() {
        let mut store = MatchStore::default();
        for _ in 0..10 {
            store.record_point(Side::A, 0).unwrap();
        }
        let before = store.state().clone();

        store.record_point(Side::A, 0).unwrap();
        assert_eq!(store.state().sets_a, 1);
        assert_eq!(store.state().first_server_of_set, Some(Side::B));

        store.undo().unwrap();
        assert_eq!(store.state(), &before);
        assert_eq!(store.state().points_a, 10);
        assert_eq!(store.state().first_server_of_set, Some(Side::A));
    }

    #[test]
    fn test_undo_recomputes_match_point() {
        let mut store = MatchStore::default();
        store.record_point(Side::A, 0).unwrap();

        let mut tampered = store.state().clone();
        tampered.match_point_for = Some(Side::B);
        store.undo.push(tampered);

        store.undo().unwrap();
        assert_eq!(store.state().match_point_for, None);
    }

    #[test]
    fn test_undo_keeps_match_point_when_configured() {
        let mut store = MatchStore::new(RuleConfig {
            keep_match_point_on_undo: true,
            ..RuleConfig::default()
        });

        let mut tampered = store.state().clone();
        tampered.match_point_for = Some(Side::B);
        store.undo.push(tampered);

        store.undo().unwrap();
        assert_eq!(store.state().match_point_for, Some(Side::B));
    }

    #[test]
    fn test_undo_log_is_bounded() {
        let mut store = MatchStore::default();
        store
            .apply_settings(&Settings {
                a1: Some("FIRST".to_string()),
                ..Settings::default()
            })
            .unwrap();

        for i in 0..UNDO_LIMIT {
            store
                .apply_settings(&Settings {
                    a1: Some(format!("NAME {}", i)),
                    ..Settings::default()
                })
                .unwrap();
        }
        assert_eq!(store.undo_depth(), UNDO_LIMIT);

        while store.undo().is_ok() {}
        // The snapshot taken before "FIRST" was discarded
        assert_eq!(store.state().a1, "FIRST");
    }

    #[test]
    fn test_settings_merge() {
        let mut store = MatchStore::default();
        store
            .apply_settings(&Settings {
                mode: Some(Mode::Doubles),
                a1: Some("  Ma Long ".to_string()),
                a2: Some(" Xu Xin ".to_string()),
                b1: Some("   ".to_string()),
                b2: Some("".to_string()),
                best_of: Some(3),
                server: Some(Side::B),
            })
            .unwrap();

        let state = store.state();
        assert_eq!(state.mode, Mode::Doubles);
        assert_eq!(state.a1, "Ma Long");
        assert_eq!(state.a2, "Xu Xin");
        assert_eq!(state.b1, scoreboard_shared::DEFAULT_NAME_B);
        assert_eq!(state.b2, "");
        assert_eq!(state.best_of, 3);
        assert_eq!(state.server, Some(Side::B));
        assert_eq!(state.first_server_of_set, Some(Side::B));
    }

    #[test]
    fn test_settings_without_effect_are_rejected() {
        let mut store = MatchStore::default();

        assert_eq!(store.apply_settings(&Settings::default()), Err(Rejection::NoChange));
        assert_eq!(
            store.apply_settings(&Settings {
                best_of: Some(5),
                ..Settings::default()
            }),
            Err(Rejection::NoChange)
        );
        assert_eq!(store.undo_depth(), 0);
    }

    #[test]
    fn test_best_of_cannot_contradict_played_sets() {
        let mut store = MatchStore::default();
        win_set(&mut store, Side::A);
        win_set(&mut store, Side::A);
        assert_eq!(store.state().sets_a, 2);

        let result = store.apply_settings(&Settings {
            best_of: Some(3),
            ..Settings::default()
        });

        assert_eq!(result, Err(Rejection::NoChange));
        assert_eq!(store.state().best_of, 5);
    }

    #[test]
    fn test_best_of_change_updates_match_point() {
        let mut store = MatchStore::default();
        win_set(&mut store, Side::A);
        for _ in 0..10 {
            store.record_point(Side::A, 0).unwrap();
        }
        assert_eq!(store.state().match_point_for, None);

        store
            .apply_settings(&Settings {
                best_of: Some(3),
                ..Settings::default()
            })
            .unwrap();
        assert_eq!(store.state().match_point_for, Some(Side::A));
    }

    #[test]
    fn test_reset_match_keeps_settings() {
        let mut store = MatchStore::default();
        store
            .apply_settings(&Settings {
                mode: Some(Mode::Doubles),
                a1: Some("ONE".to_string()),
                a2: Some("TWO".to_string()),
                b1: Some("THREE".to_string()),
                b2: Some("FOUR".to_string()),
                best_of: Some(3),
                server: None,
            })
            .unwrap();
        win_set(&mut store, Side::B);
        store.record_point(Side::A, 0).unwrap();
        store.record_point(Side::A, 0).unwrap();
        store.record_point(Side::A, 0).unwrap();
        store.record_timeout_start(Side::A).unwrap();

        let server_before = store.state().server;
        store.reset_match_keep_settings(99).unwrap();

        let state = store.state();
        assert_eq!(state.mode, Mode::Doubles);
        assert_eq!((state.a1.as_str(), state.a2.as_str()), ("ONE", "TWO"));
        assert_eq!((state.b1.as_str(), state.b2.as_str()), ("THREE", "FOUR"));
        assert_eq!(state.best_of, 3);

        assert_eq!((state.points_a, state.points_b), (0, 0));
        assert_eq!((state.sets_a, state.sets_b), (0, 0));
        assert!(!state.timeout_used_a && !state.timeout_used_b && !state.timeout_active);
        assert!(!state.finished);
        assert_eq!(state.match_point_for, None);
        assert_eq!(state.server, server_before);
        assert_eq!(state.first_server_of_set, server_before);
        assert_eq!(state.point_history.len(), 1);
        assert_eq!(state.point_history[0].event, HistoryEvent::ResetMatch);
    }

    #[test]
    fn test_reset_match_explicit_start_clears_server() {
        let mut store = MatchStore::new(explicit());
        store.start_match(Side::B).unwrap();
        store.record_point(Side::A, 0).unwrap();

        store.reset_match_keep_settings(0).unwrap();

        assert!(!store.state().match_started);
        assert_eq!(store.state().server, None);
        assert_eq!(store.state().first_server_of_set, None);
        assert_eq!(store.record_point(Side::A, 0), Err(Rejection::MatchNotStarted));
    }

    #[test]
    fn test_reset_all_clears_undo() {
        let mut store = MatchStore::default();
        store.record_point(Side::A, 0).unwrap();
        store.record_point(Side::B, 0).unwrap();

        store.reset_all().unwrap();

        assert_eq!(store.state(), &MatchState::new(&RuleConfig::default()));
        assert_eq!(store.undo_depth(), 0);
        assert_eq!(store.undo(), Err(Rejection::NothingToUndo));
    }

    #[test]
    fn test_start_match_explicit() {
        let mut store = MatchStore::new(explicit());
        assert_eq!(store.record_point(Side::A, 0), Err(Rejection::MatchNotStarted));
        assert_eq!(
            store.record_timeout_start(Side::A),
            Err(Rejection::MatchNotStarted)
        );

        store.start_match(Side::B).unwrap();
        assert!(store.state().match_started);
        assert_eq!(store.state().server, Some(Side::B));
        assert_eq!(store.state().first_server_of_set, Some(Side::B));

        assert_eq!(store.start_match(Side::A), Err(Rejection::MatchAlreadyStarted));
        assert!(store.record_point(Side::A, 0).is_ok());
    }

    #[test]
    fn test_best_of_locked_after_explicit_start() {
        let mut store = MatchStore::new(explicit());
        store
            .apply_settings(&Settings {
                best_of: Some(3),
                ..Settings::default()
            })
            .unwrap();
        store.start_match(Side::A).unwrap();

        let result = store.apply_settings(&Settings {
            best_of: Some(5),
            ..Settings::default()
        });
        assert_eq!(result, Err(Rejection::NoChange));
        assert_eq!(store.state().best_of, 3);
    }

    #[test]
    fn test_start_match_rejected_in_canonical_ruleset() {
        let mut store = MatchStore::default();
        assert_eq!(store.start_match(Side::B), Err(Rejection::MatchAlreadyStarted));
        assert_eq!(store.state().server, Some(Side::A));
    }

    #[test]
    fn test_full_match_then_points_rejected() {
        let mut store = MatchStore::default();
        for _ in 0..3 {
            win_set(&mut store, Side::A);
        }

        assert!(store.state().finished);
        assert_eq!((store.state().sets_a, store.state().sets_b), (3, 0));

        let frozen = store.state().clone();
        assert_eq!(store.record_point(Side::B, 0), Err(Rejection::MatchFinished));
        assert_eq!(store.record_timeout_start(Side::B), Err(Rejection::MatchFinished));
        assert_eq!(store.state(), &frozen);
    }
}
