//! Transition modes.
//!
//! The closed set of tile transitions, each carrying its timing parameters.
//! String names are accepted only at the API boundary (config, CLI) and
//! rejected explicitly when unknown; inside the engine the enum is matched
//! exhaustively.

use std::fmt;
use std::str::FromStr;

use crate::easing::Easing;
use crate::error::EngineError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransitionMode {
    /// Nudge the tile upward by half its height.
    Up,
    /// Nudge the tile downward by half its height.
    Down,
    /// Grow vertical scale from zero back to the captured size.
    Open,
    /// Collapse vertical scale to zero.
    Close,
    /// Double horizontal scale, keeping the plane-size uniform in sync and
    /// re-fitting the aspect on completion.
    Fit,
    /// Double horizontal scale, letting the shader's cover-crop math absorb
    /// the change.
    Contain,
}

/// Timing parameters for one mode.
#[derive(Copy, Clone, Debug)]
pub struct ModeSpec {
    pub duration_ms: f64,
    pub easing: Easing,
}

impl TransitionMode {
    pub fn spec(&self) -> ModeSpec {
        match self {
            TransitionMode::Up | TransitionMode::Down => ModeSpec {
                duration_ms: 3000.0,
                easing: Easing::bezier(0.22, 1.0, 0.36, 1.0),
            },
            TransitionMode::Open | TransitionMode::Close => ModeSpec {
                duration_ms: 1500.0,
                easing: Easing::bezier(0.645, 0.045, 0.355, 1.0),
            },
            TransitionMode::Fit | TransitionMode::Contain => ModeSpec {
                duration_ms: 1500.0,
                easing: Easing::bezier(0.25, 0.1, 0.25, 1.0),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransitionMode::Up => "up",
            TransitionMode::Down => "down",
            TransitionMode::Open => "open",
            TransitionMode::Close => "close",
            TransitionMode::Fit => "fit",
            TransitionMode::Contain => "contain",
        }
    }
}

impl fmt::Display for TransitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransitionMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(TransitionMode::Up),
            "down" => Ok(TransitionMode::Down),
            "open" => Ok(TransitionMode::Open),
            "close" => Ok(TransitionMode::Close),
            "fit" => Ok(TransitionMode::Fit),
            "contain" => Ok(TransitionMode::Contain),
            other => Err(EngineError::UnknownMode(other.to_string())),
        }
    }
}
