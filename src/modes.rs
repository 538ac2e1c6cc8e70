//! Surface modes
//!
//! The active mode decides how the shared physical controls are interpreted.
//! Modes form a closed enumeration grouped into dispatch scopes; commands
//! match on the scope so the branch set stays exhaustive and compiler
//! checked. Modes outside the known scopes are inert for commands, not an
//! error: a surface extension may add its own interpretation on top.

use serde::{Deserialize, Serialize};

/// Active interpretation of the surface controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Track selection and per-track functions.
    Track,
    /// Per-track volume editing.
    Volume,
    /// Per-track pan editing.
    Pan,
    /// Per-track send editing.
    Send,
    /// Layers / drum pads of the active device.
    Layer,
    /// Master channel strip.
    Master,
    /// Content browser.
    Browse,
}

/// Dispatch category of a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeScope {
    /// Mutations target the selected top-level track.
    Track,
    /// Mutations target the selected layer/pad of the active device.
    Layer,
    /// Mutations target the master channel unconditionally.
    Master,
    /// No track-function dispatch in this mode.
    Other,
}

impl Mode {
    pub fn scope(&self) -> ModeScope {
        match self {
            Mode::Track | Mode::Volume | Mode::Pan | Mode::Send => ModeScope::Track,
            Mode::Layer => ModeScope::Layer,
            Mode::Master => ModeScope::Master,
            Mode::Browse => ModeScope::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Track => "track",
            Mode::Volume => "volume",
            Mode::Pan => "pan",
            Mode::Send => "send",
            Mode::Layer => "layer",
            Mode::Master => "master",
            Mode::Browse => "browse",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "track" => Some(Mode::Track),
            "volume" => Some(Mode::Volume),
            "pan" => Some(Mode::Pan),
            "send" => Some(Mode::Send),
            "layer" => Some(Mode::Layer),
            "master" => Some(Mode::Master),
            "browse" => Some(Mode::Browse),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scopes() {
        assert_eq!(Mode::Track.scope(), ModeScope::Track);
        assert_eq!(Mode::Pan.scope(), ModeScope::Track);
        assert_eq!(Mode::Layer.scope(), ModeScope::Layer);
        assert_eq!(Mode::Master.scope(), ModeScope::Master);
        assert_eq!(Mode::Browse.scope(), ModeScope::Other);
    }

    #[test]
    fn test_parse_round_trip() {
        for mode in [
            Mode::Track,
            Mode::Volume,
            Mode::Pan,
            Mode::Send,
            Mode::Layer,
            Mode::Master,
            Mode::Browse,
        ] {
            assert_eq!(Mode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(Mode::parse("clip"), None);
    }
}
