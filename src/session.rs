//! Session-scoped surface state
//!
//! All mutable configuration a controller session accumulates: the latched
//! track function, the mute/solo lock, the transient long-press flags, the
//! shift modifier, and the active mode. One instance per physical surface;
//! two surfaces run two independent sessions with no cross-talk.

use crate::modes::Mode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Which per-track function the function buttons currently apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackFunction {
    Mute,
    Solo,
}

impl std::fmt::Display for TrackFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackFunction::Mute => write!(f, "mute"),
            TrackFunction::Solo => write!(f, "solo"),
        }
    }
}

/// Controller capability profile.
///
/// `Simple` models first-generation hardware whose function buttons only
/// latch (no lock, no long press); `Advanced` enables the full decision
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerProfile {
    Simple,
    #[default]
    Advanced,
}

/// Mutable per-session state.
///
/// Created at session start, mutated only from the surface callback thread,
/// dropped at teardown. No global singleton.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    profile: ControllerProfile,
    active_mode: Mode,
    track_function: Option<TrackFunction>,
    mute_solo_locked: bool,
    mute_long_pressed: bool,
    solo_long_pressed: bool,
    shift_held: bool,
}

impl SessionState {
    pub fn new(profile: ControllerProfile) -> Self {
        Self {
            profile,
            active_mode: Mode::Track,
            track_function: None,
            mute_solo_locked: false,
            mute_long_pressed: false,
            solo_long_pressed: false,
            shift_held: false,
        }
    }

    pub fn profile(&self) -> ControllerProfile {
        self.profile
    }

    pub fn active_mode(&self) -> Mode {
        self.active_mode
    }

    pub fn set_active_mode(&mut self, mode: Mode) {
        if self.active_mode != mode {
            info!("mode: {} -> {}", self.active_mode, mode);
            self.active_mode = mode;
        }
    }

    pub fn shift_held(&self) -> bool {
        self.shift_held
    }

    pub fn set_shift_held(&mut self, held: bool) {
        self.shift_held = held;
    }

    /// Currently latched function, None before the first latch.
    pub fn track_function(&self) -> Option<TrackFunction> {
        self.track_function
    }

    /// Latch a function persistently.
    pub fn latch(&mut self, function: TrackFunction) {
        if self.track_function != Some(function) {
            debug!("track function latched: {}", function);
            self.track_function = Some(function);
        }
    }

    /// Whether the latched behavior is locked in (shift toggle).
    pub fn is_locked(&self) -> bool {
        self.mute_solo_locked
    }

    pub fn toggle_lock(&mut self) {
        self.mute_solo_locked = !self.mute_solo_locked;
        info!(
            "mute/solo lock {}",
            if self.mute_solo_locked { "engaged" } else { "released" }
        );
    }

    /// Transient long-press marker for a function, reset every press cycle.
    pub fn long_pressed(&self, function: TrackFunction) -> bool {
        match function {
            TrackFunction::Mute => self.mute_long_pressed,
            TrackFunction::Solo => self.solo_long_pressed,
        }
    }

    pub fn set_long_pressed(&mut self, function: TrackFunction, value: bool) {
        match function {
            TrackFunction::Mute => self.mute_long_pressed = value,
            TrackFunction::Solo => self.solo_long_pressed = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_defaults() {
        let session = SessionState::new(ControllerProfile::Advanced);
        assert_eq!(session.active_mode(), Mode::Track);
        assert_eq!(session.track_function(), None);
        assert!(!session.is_locked());
        assert!(!session.shift_held());
    }

    #[test]
    fn test_long_press_flags_are_per_function() {
        let mut session = SessionState::new(ControllerProfile::Advanced);
        session.set_long_pressed(TrackFunction::Mute, true);
        assert!(session.long_pressed(TrackFunction::Mute));
        assert!(!session.long_pressed(TrackFunction::Solo));
    }

    #[test]
    fn test_lock_toggles() {
        let mut session = SessionState::new(ControllerProfile::Advanced);
        session.toggle_lock();
        assert!(session.is_locked());
        session.toggle_lock();
        assert!(!session.is_locked());
    }
}
