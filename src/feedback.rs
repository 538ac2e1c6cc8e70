//! LED feedback derivation
//!
//! Pure functions from cached state to surface feedback. `None` means the
//! rendered appearance is unchanged and no update needs to be sent to the
//! hardware.

use crate::model::Color;
use crate::notecache::NoteState;
use crate::session::{SessionState, TrackFunction};

/// Visual state of a pad LED.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PadLed {
    Off,
    /// Steady on, fresh attack.
    On(Color),
    /// Retrigger while already sounding; views flash to make it visible.
    Flash(Color),
}

/// Visual state of a function button LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionLed {
    Off,
    On,
    /// Locked: lit brighter so the sticky state is obvious.
    Bright,
}

/// Pad update for a note transition, or None when nothing changed visually.
///
/// Both On and OnNew render as lit; the distinction only matters on the
/// transition into OnNew, which flashes.
pub fn pad_led(prior: NoteState, current: NoteState, color: Color) -> Option<PadLed> {
    match (prior, current) {
        (NoteState::Off, NoteState::Off) => None,
        (_, NoteState::Off) => Some(PadLed::Off),
        (NoteState::Off, _) => Some(PadLed::On(color)),
        (_, NoteState::OnNew) => Some(PadLed::Flash(color)),
        // On -> On does not occur (a second attack always yields OnNew)
        (_, NoteState::On) => None,
    }
}

/// LED of a function button, derived from the session latch and lock.
pub fn function_led(session: &SessionState, function: TrackFunction) -> FunctionLed {
    if session.track_function() == Some(function) {
        if session.is_locked() {
            FunctionLed::Bright
        } else {
            FunctionLed::On
        }
    } else {
        FunctionLed::Off
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ControllerProfile;

    const RED: Color = Color::new(1.0, 0.0, 0.0);

    #[test]
    fn test_pad_transitions() {
        assert_eq!(pad_led(NoteState::Off, NoteState::Off, RED), None);
        assert_eq!(
            pad_led(NoteState::Off, NoteState::On, RED),
            Some(PadLed::On(RED))
        );
        assert_eq!(
            pad_led(NoteState::On, NoteState::OnNew, RED),
            Some(PadLed::Flash(RED))
        );
        assert_eq!(
            pad_led(NoteState::OnNew, NoteState::OnNew, RED),
            Some(PadLed::Flash(RED))
        );
        assert_eq!(
            pad_led(NoteState::OnNew, NoteState::Off, RED),
            Some(PadLed::Off)
        );
        assert_eq!(pad_led(NoteState::On, NoteState::Off, RED), Some(PadLed::Off));
    }

    #[test]
    fn test_function_led_follows_latch_and_lock() {
        let mut session = SessionState::new(ControllerProfile::Advanced);
        assert_eq!(function_led(&session, TrackFunction::Mute), FunctionLed::Off);

        session.latch(TrackFunction::Mute);
        assert_eq!(function_led(&session, TrackFunction::Mute), FunctionLed::On);
        assert_eq!(function_led(&session, TrackFunction::Solo), FunctionLed::Off);

        session.toggle_lock();
        assert_eq!(
            function_led(&session, TrackFunction::Mute),
            FunctionLed::Bright
        );
    }
}
