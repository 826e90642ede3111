//! Match state aggregate and the ruleset that governs it
//!
//! `MatchState` is the single value broadcast to every viewer. Its serde
//! representation is the wire format, so field names follow the JSON keys
//! viewers expect (`pointsA`, `firstServerOfSet`, `A1`, ...).

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_BEST_OF, DEFAULT_NAME_A, DEFAULT_NAME_B};

/// One of the two competing parties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Singles,
    Doubles,
}

impl Mode {
    pub fn parse(value: &str) -> Option<Mode> {
        match value {
            "singles" => Some(Mode::Singles),
            "doubles" => Some(Mode::Doubles),
            _ => None,
        }
    }
}

/// Final game score carried by a `SET_END` record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetScore {
    pub a: u32,
    pub b: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryEvent {
    PointA,
    PointB,
    SetEnd { score: SetScore },
    MatchEnd,
    ResetMatch,
}

impl HistoryEvent {
    pub fn point(side: Side) -> Self {
        match side {
            Side::A => HistoryEvent::PointA,
            Side::B => HistoryEvent::PointB,
        }
    }
}

/// Audit entry, never read back by the scoring logic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Unix time in milliseconds
    pub t: u64,
    #[serde(flatten)]
    pub event: HistoryEvent,
}

/// Selects between the two rule variants the scoreboard supports
///
/// The default value is the canonical ruleset: serving starts with side A
/// as soon as the state is created, undo recomputes match point, and an
/// active time-out does not block scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuleConfig {
    /// Points are only accepted after an explicit `START_MATCH`
    pub explicit_start: bool,
    /// Undo trusts the restored snapshot's `matchPointFor` as-is
    pub keep_match_point_on_undo: bool,
    /// `POINT_X` is rejected while a time-out is active
    pub timeout_blocks_scoring: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    pub mode: Mode,

    #[serde(rename = "A1")]
    pub a1: String,
    #[serde(rename = "A2")]
    pub a2: String,
    #[serde(rename = "B1")]
    pub b1: String,
    #[serde(rename = "B2")]
    pub b2: String,

    pub points_a: u32,
    pub points_b: u32,
    pub sets_a: u32,
    pub sets_b: u32,

    pub best_of: u32,

    pub server: Option<Side>,
    pub first_server_of_set: Option<Side>,
    pub match_started: bool,

    pub timeout_used_a: bool,
    pub timeout_used_b: bool,
    pub timeout_active: bool,

    pub match_point_for: Option<Side>,
    pub finished: bool,

    pub point_history: Vec<HistoryRecord>,
}

impl MatchState {
    /// Creates a fresh match with default names and best of five
    pub fn new(rules: &RuleConfig) -> Self {
        let opening_server = if rules.explicit_start {
            None
        } else {
            Some(Side::A)
        };

        Self {
            mode: Mode::Singles,
            a1: DEFAULT_NAME_A.to_string(),
            a2: String::new(),
            b1: DEFAULT_NAME_B.to_string(),
            b2: String::new(),
            points_a: 0,
            points_b: 0,
            sets_a: 0,
            sets_b: 0,
            best_of: DEFAULT_BEST_OF,
            server: opening_server,
            first_server_of_set: opening_server,
            match_started: !rules.explicit_start,
            timeout_used_a: false,
            timeout_used_b: false,
            timeout_active: false,
            match_point_for: None,
            finished: false,
            point_history: Vec::new(),
        }
    }

    /// Sets required to win the match, `ceil(best_of / 2)`
    pub fn needed_sets(&self) -> u32 {
        (self.best_of + 1) / 2
    }

    pub fn points(&self, side: Side) -> u32 {
        match side {
            Side::A => self.points_a,
            Side::B => self.points_b,
        }
    }

    pub fn sets(&self, side: Side) -> u32 {
        match side {
            Side::A => self.sets_a,
            Side::B => self.sets_b,
        }
    }

    pub fn timeout_used(&self, side: Side) -> bool {
        match side {
            Side::A => self.timeout_used_a,
            Side::B => self.timeout_used_b,
        }
    }

    pub(crate) fn points_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::A => &mut self.points_a,
            Side::B => &mut self.points_b,
        }
    }

    pub(crate) fn sets_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::A => &mut self.sets_a,
            Side::B => &mut self.sets_b,
        }
    }

    pub(crate) fn timeout_used_mut(&mut self, side: Side) -> &mut bool {
        match side {
            Side::A => &mut self.timeout_used_a,
            Side::B => &mut self.timeout_used_b,
        }
    }

    /// Side that has won the match, if any
    pub fn winner(&self) -> Option<Side> {
        let target = self.needed_sets();
        if self.sets_a >= target {
            Some(Side::A)
        } else if self.sets_b >= target {
            Some(Side::B)
        } else {
            None
        }
    }

    /// Display names for a side, joined with " / " in doubles
    pub fn team_name(&self, side: Side) -> String {
        let (first, second) = match side {
            Side::A => (&self.a1, &self.a2),
            Side::B => (&self.b1, &self.b2),
        };

        if self.mode == Mode::Doubles && !second.is_empty() {
            format!("{} / {}", first, second)
        } else {
            first.clone()
        }
    }

    pub fn push_history(&mut self, at: u64, event: HistoryEvent) {
        self.point_history.push(HistoryRecord { t: at, event });
    }
}
