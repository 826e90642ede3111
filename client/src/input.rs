//! Controller actions and their translation into wire commands

use clap::{Subcommand, ValueEnum};
use rand::Rng;
use scoreboard_shared::{Command, Mode, Settings, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SideArg {
    A,
    B,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::A => Side::A,
            SideArg::B => Side::B,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Singles,
    Doubles,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Singles => Mode::Singles,
            ModeArg::Doubles => Mode::Doubles,
        }
    }
}

/// What the operator asked the client to do
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Show the scoreboard and redraw it on every update
    Watch,
    /// Score a point for a side
    Point { side: SideArg },
    /// Call a side's time-out
    Timeout { side: SideArg },
    /// End the running time-out
    EndTimeout,
    /// Revert the last applied command
    Undo,
    /// Clear the score but keep names and format
    ResetMatch,
    /// Restore every default and drop the undo history
    ResetAll,
    /// Change mode, names, format or the serving side
    Settings {
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        #[arg(long)]
        a1: Option<String>,
        #[arg(long)]
        a2: Option<String>,
        #[arg(long)]
        b1: Option<String>,
        #[arg(long)]
        b2: Option<String>,
        /// 3 or 5; anything else is ignored by the server
        #[arg(long)]
        best_of: Option<u32>,
        #[arg(long, value_enum)]
        server: Option<SideArg>,
    },
    /// Start the match; without a side, a coin toss decides who serves
    Start { side: Option<SideArg> },
}

impl Action {
    /// Builds the wire command, or `None` for actions that only listen
    pub fn to_command<R: Rng>(&self, rng: &mut R) -> Option<Command> {
        let command = match self {
            Action::Watch => return None,
            Action::Point { side } => Command::point((*side).into()),
            Action::Timeout { side } => Command::timeout((*side).into()),
            Action::EndTimeout => Command::EndTimeout,
            Action::Undo => Command::Undo,
            Action::ResetMatch => Command::ResetMatch,
            Action::ResetAll => Command::ResetAll,
            Action::Settings {
                mode,
                a1,
                a2,
                b1,
                b2,
                best_of,
                server,
            } => Command::UpdateSettings(
                Settings {
                    mode: mode.map(Mode::from),
                    a1: a1.clone(),
                    a2: a2.clone(),
                    b1: b1.clone(),
                    b2: b2.clone(),
                    best_of: *best_of,
                    server: server.map(Side::from),
                }
                .into(),
            ),
            Action::Start { side } => {
                let side = side.map(Side::from).unwrap_or_else(|| toss(rng));
                Command::start_match(side)
            }
        };

        Some(command)
    }
}

/// Draws lots for the first server
pub fn toss<R: Rng>(rng: &mut R) -> Side {
    if rng.gen_bool(0.5) {
        Side::A
    } else {
        Side::B
    }
}
