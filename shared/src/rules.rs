//! Table-tennis rules engine
//!
//! Every function here takes the match state by mutable reference and
//! applies one rule transition. Timestamps for history records are supplied
//! by the caller so the transitions stay deterministic.
//!
//! Service rotation follows the laws of the game: the server changes after
//! every two points, and after every point once both sides reach 10. The
//! side that served first in a set receives first in the next one.

use thiserror::Error;

use crate::state::{HistoryEvent, MatchState, RuleConfig, SetScore, Side};
use crate::{DEUCE_THRESHOLD, MIN_LEAD, POINTS_TO_WIN_SET};

/// Why a command left the state untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("match is already finished")]
    MatchFinished,
    #[error("match has not been started")]
    MatchNotStarted,
    #[error("match has already started")]
    MatchAlreadyStarted,
    #[error("a time-out is in progress")]
    TimeoutInProgress,
    #[error("side {0:?} has already used its time-out")]
    TimeoutAlreadyUsed(Side),
    #[error("no time-out is active")]
    NoActiveTimeout,
    #[error("undo history is empty")]
    NothingToUndo,
    #[error("command would not change the state")]
    NoChange,
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// `Ok(())` when the command was applied
pub type Outcome = Result<(), Rejection>;

/// Side that has won the set at this score, if the set is over
pub fn set_winner(points_a: u32, points_b: u32) -> Option<Side> {
    let reached = points_a >= POINTS_TO_WIN_SET || points_b >= POINTS_TO_WIN_SET;
    if !reached || points_a.abs_diff(points_b) < MIN_LEAD {
        return None;
    }

    if points_a > points_b {
        Some(Side::A)
    } else {
        Some(Side::B)
    }
}

pub fn switch_server(state: &mut MatchState) {
    state.server = state.server.map(Side::other);
}

/// Recomputes `match_point_for` from the current score
pub fn compute_match_point(state: &mut MatchState) {
    state.match_point_for = None;
    if state.finished {
        return;
    }

    let last_set = state.needed_sets().saturating_sub(1);

    for side in [Side::A, Side::B] {
        if state.sets(side) != last_set {
            continue;
        }

        let own = state.points(side);
        let other = state.points(side.other());
        let set_already_won = own >= POINTS_TO_WIN_SET && own >= other + MIN_LEAD;

        if !set_already_won && own >= POINTS_TO_WIN_SET - 1 && own > other {
            state.match_point_for = Some(side);
            return;
        }
    }
}

/// Scores a point for `side` and applies every rule that follows from it
pub fn add_point(state: &mut MatchState, side: Side, rules: &RuleConfig, at: u64) -> Outcome {
    if state.finished {
        return Err(Rejection::MatchFinished);
    }
    if !state.match_started {
        return Err(Rejection::MatchNotStarted);
    }
    if rules.timeout_blocks_scoring && state.timeout_active {
        return Err(Rejection::TimeoutInProgress);
    }

    *state.points_mut(side) += 1;
    state.push_history(at, HistoryEvent::point(side));

    let deuce = state.points_a >= DEUCE_THRESHOLD && state.points_b >= DEUCE_THRESHOLD;
    let total = state.points_a + state.points_b;

    if deuce || total % 2 == 0 {
        switch_server(state);
    }

    check_set_winner(state, rules, at);
    Ok(())
}

/// Closes the set if the score has reached a decided state
pub fn check_set_winner(state: &mut MatchState, rules: &RuleConfig, at: u64) {
    let Some(winner) = set_winner(state.points_a, state.points_b) else {
        compute_match_point(state);
        return;
    };

    *state.sets_mut(winner) += 1;
    state.push_history(
        at,
        HistoryEvent::SetEnd {
            score: SetScore {
                a: state.points_a,
                b: state.points_b,
            },
        },
    );

    state.points_a = 0;
    state.points_b = 0;
    state.timeout_active = false;

    state.first_server_of_set = state.first_server_of_set.map(Side::other);
    state.server = state.first_server_of_set;

    check_match_winner(state, rules, at);
}

/// Marks the match finished once a side reaches the needed set count
pub fn check_match_winner(state: &mut MatchState, rules: &RuleConfig, at: u64) {
    let target = state.needed_sets();
    if state.sets_a == target || state.sets_b == target {
        state.finished = true;
        state.timeout_active = false;
        state.match_point_for = None;
        if rules.explicit_start {
            state.match_started = false;
        }
        state.push_history(at, HistoryEvent::MatchEnd);
    }

    compute_match_point(state);
}

/// Starts the single time-out `side` is entitled to
pub fn start_timeout(state: &mut MatchState, side: Side) -> Outcome {
    if state.finished {
        return Err(Rejection::MatchFinished);
    }
    if !state.match_started {
        return Err(Rejection::MatchNotStarted);
    }
    if state.timeout_used(side) {
        return Err(Rejection::TimeoutAlreadyUsed(side));
    }

    *state.timeout_used_mut(side) = true;
    state.timeout_active = true;
    Ok(())
}

pub fn end_timeout(state: &mut MatchState) -> Outcome {
    if state.finished {
        return Err(Rejection::MatchFinished);
    }
    if !state.timeout_active {
        return Err(Rejection::NoActiveTimeout);
    }

    state.timeout_active = false;
    Ok(())
}
