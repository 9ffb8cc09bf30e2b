//! Timed command scripts given on the command line.
//!
//! A command is written `<ms>:<action>[:<kind>]`, for example
//! `1500:spawn:tank`, `3000:shift-gears` or `4500:toggle-sirens`.

use std::str::FromStr;

use derby_core::{Derby, DerbyError, RenderBackend, VehicleKind};

/// Failure to parse a scripted command.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// The command does not have the `<ms>:<action>` shape.
    #[error("expected `<ms>:<action>[:<kind>]`, got `{0}`")]
    Malformed(String),

    /// The time is not a whole number of milliseconds.
    #[error("invalid time `{0}`")]
    InvalidTime(String),

    /// The action name is not known.
    #[error("unknown action `{0}` (expected spawn, shift-gears or toggle-sirens)")]
    UnknownAction(String),

    /// A `spawn` command without a kind.
    #[error("spawn needs a vehicle kind, e.g. `{0}:spawn:sedan`")]
    MissingKind(u64),

    /// The kind given to `spawn` is not known.
    #[error(transparent)]
    Kind(#[from] DerbyError),
}

/// What a command does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Spawn a vehicle at a random position.
    Spawn(VehicleKind),
    /// Shift gears on every sedan and police car.
    ShiftGears,
    /// Toggle the global siren flag.
    ToggleSirens,
}

/// An action scheduled at a simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// Simulation time at which the action runs.
    pub at_ms: u64,
    /// The action.
    pub action: Action,
}

impl Command {
    /// Runs the action against a derby.
    pub fn apply<R: RenderBackend>(&self, derby: &mut Derby<R>) -> derby_core::Result<()> {
        match self.action {
            Action::Spawn(kind) => {
                derby.spawn(kind)?;
            }
            Action::ShiftGears => derby.shift_gears(),
            Action::ToggleSirens => derby.toggle_sirens(),
        }
        Ok(())
    }
}

impl FromStr for Command {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, ':');
        let (Some(time), Some(action)) = (parts.next(), parts.next()) else {
            return Err(ScriptError::Malformed(s.to_string()));
        };
        let kind = parts.next();

        let at_ms = time
            .trim()
            .parse()
            .map_err(|_| ScriptError::InvalidTime(time.to_string()))?;

        let action = match action.trim().to_ascii_lowercase().as_str() {
            "spawn" => {
                let kind = kind.ok_or(ScriptError::MissingKind(at_ms))?;
                Action::Spawn(kind.parse()?)
            }
            "shift-gears" | "shift_gears" | "gears" => Action::ShiftGears,
            "toggle-sirens" | "toggle_sirens" | "sirens" => Action::ToggleSirens,
            other => return Err(ScriptError::UnknownAction(other.to_string())),
        };

        Ok(Self { at_ms, action })
    }
}
