//! Text rendering of the scoreboard for terminal viewers

use scoreboard_shared::{MatchState, Mode, Side};

pub struct Renderer {
    name_width: usize,
    clear_screen: bool,
}

impl Renderer {
    pub fn new(name_width: usize, clear_screen: bool) -> Self {
        Self {
            name_width,
            clear_screen,
        }
    }

    /// Formats the full board; one row per side plus status lines
    pub fn render(&self, state: &MatchState) -> String {
        let mut out = String::new();

        if self.clear_screen {
            out.push_str("\x1b[2J\x1b[H");
        }

        let format = match state.mode {
            Mode::Singles => "singles",
            Mode::Doubles => "doubles",
        };
        out.push_str(&format!("Best of {} - {}\n", state.best_of, format));
        out.push_str(&format!(
            "{:<width$}  SETS  PTS\n",
            "",
            width = self.name_width
        ));

        for side in [Side::A, Side::B] {
            out.push_str(&self.side_row(state, side));
            out.push('\n');
        }

        for line in status_lines(state) {
            out.push_str(&line);
            out.push('\n');
        }

        out
    }

    fn side_row(&self, state: &MatchState, side: Side) -> String {
        let mut name = state.team_name(side);
        if name.chars().count() > self.name_width {
            name = name.chars().take(self.name_width).collect();
        }

        let serve = if state.server == Some(side) { "*" } else { " " };
        let timeout = if state.timeout_used(side) { " [T]" } else { "" };

        format!(
            "{:<width$}  {:>4}  {:>3} {}{}",
            name,
            state.sets(side),
            state.points(side),
            serve,
            timeout,
            width = self.name_width
        )
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(24, false)
    }
}

fn status_lines(state: &MatchState) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(winner) = state.winner().filter(|_| state.finished) {
        lines.push(format!("FINISHED - {} wins", state.team_name(winner)));
        return lines;
    }

    if !state.match_started {
        lines.push("Waiting for the match to start".to_string());
    }
    if state.timeout_active {
        lines.push("TIME-OUT".to_string());
    }
    if let Some(side) = state.match_point_for {
        lines.push(format!("MATCH POINT {}", state.team_name(side)));
    }

    lines
}
