//! Button event classification
//!
//! Turns raw press/release pairs plus a timer into semantic DOWN/UP/LONG
//! events. Long-press cancellation is epoch-based: every press bumps a
//! per-button epoch, and a pending timer only fires if its captured epoch is
//! still current. Releasing early or cancelling (mode change) bumps the
//! epoch, so a stale timer silently expires instead of emitting an orphan
//! LONG.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::trace;

/// Physical controls the classifier tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Mute,
    Solo,
    Shift,
    /// Scene launch button of a window scene row.
    Scene(u8),
}

impl Button {
    /// Parse a console token ("mute", "solo", "shift", "scene3").
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "mute" => Some(Button::Mute),
            "solo" => Some(Button::Solo),
            "shift" => Some(Button::Shift),
            other => other
                .strip_prefix("scene")
                .and_then(|n| n.parse().ok())
                .map(Button::Scene),
        }
    }
}

impl std::fmt::Display for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Button::Mute => write!(f, "mute"),
            Button::Solo => write!(f, "solo"),
            Button::Shift => write!(f, "shift"),
            Button::Scene(n) => write!(f, "scene{}", n),
        }
    }
}

/// Semantic button event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Down,
    Up,
    Long,
}

/// Handle for a pending long press, captured at press time.
///
/// The token is only valid for the press that created it; firing it after
/// the button was released or cancelled is a silent no-op.
#[derive(Debug, Clone, Copy)]
pub struct LongPressToken {
    pub button: Button,
    epoch: u32,
}

#[derive(Default)]
struct PressState {
    pressed: bool,
    epoch: u32,
    long_fired: bool,
}

/// Per-button press state machine.
///
/// Exactly one open press per button at a time; a DOWN before the matching
/// UP is a caller bug and panics.
pub struct ButtonClassifier {
    states: RwLock<HashMap<Button, PressState>>,
    long_press: Duration,
}

impl ButtonClassifier {
    pub fn new(long_press: Duration) -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
            long_press,
        }
    }

    /// Threshold after which a held press counts as LONG.
    pub fn long_press_threshold(&self) -> Duration {
        self.long_press
    }

    /// Register a physical press. Emits DOWN and returns the token a
    /// long-press timer must present to fire.
    pub fn press(&self, button: Button) -> (ButtonEvent, LongPressToken) {
        let mut states = self.states.write().unwrap();
        let state = states.entry(button).or_default();
        assert!(
            !state.pressed,
            "re-entrant press for {} without matching release",
            button
        );
        state.pressed = true;
        state.long_fired = false;
        state.epoch += 1;
        trace!("{} down (epoch {})", button, state.epoch);
        (
            ButtonEvent::Down,
            LongPressToken {
                button,
                epoch: state.epoch,
            },
        )
    }

    /// Register a physical release. Emits UP and invalidates any pending
    /// long-press timer for this press.
    pub fn release(&self, button: Button) -> ButtonEvent {
        let mut states = self.states.write().unwrap();
        let state = states.entry(button).or_default();
        assert!(state.pressed, "release for {} without open press", button);
        state.pressed = false;
        state.epoch += 1;
        trace!("{} up", button);
        ButtonEvent::Up
    }

    /// Attempt to fire the LONG event for a press.
    ///
    /// Returns None when the press is no longer current (released or
    /// cancelled in the meantime). Firing twice for the same press is a
    /// timer bug and panics.
    pub fn fire_long(&self, token: LongPressToken) -> Option<ButtonEvent> {
        let mut states = self.states.write().unwrap();
        let state = states.entry(token.button).or_default();
        if !state.pressed || state.epoch != token.epoch {
            trace!("{} long-press timer expired stale", token.button);
            return None;
        }
        assert!(
            !state.long_fired,
            "long press for {} fired twice",
            token.button
        );
        state.long_fired = true;
        trace!("{} long", token.button);
        Some(ButtonEvent::Long)
    }

    /// Invalidate a pending long-press timer without closing the press.
    ///
    /// Used when the owning mode changes while the button is held: the press
    /// stays open (the UP will still arrive) but no LONG may fire for it.
    pub fn cancel(&self, button: Button) {
        let mut states = self.states.write().unwrap();
        let state = states.entry(button).or_default();
        if state.pressed {
            state.epoch += 1;
            trace!("{} pending long press cancelled", button);
        }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.states
            .read()
            .unwrap()
            .get(&button)
            .is_some_and(|state| state.pressed)
    }
}

/// Arm the long-press timer for a fresh press.
///
/// Sleeps for the classifier's threshold, then fires the token; if the press
/// is still open the LONG event is forwarded on `events`. Cancellation needs
/// no task abort, a stale epoch simply no-ops.
pub fn arm_long_press(
    classifier: Arc<ButtonClassifier>,
    token: LongPressToken,
    events: mpsc::UnboundedSender<(Button, ButtonEvent)>,
) -> tokio::task::JoinHandle<()> {
    let delay = classifier.long_press_threshold();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Some(event) = classifier.fire_long(token) {
            let _ = events.send((token.button, event));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> ButtonClassifier {
        ButtonClassifier::new(Duration::from_millis(500))
    }

    #[test]
    fn test_press_release_cycle() {
        let c = classifier();
        let (down, _token) = c.press(Button::Mute);
        assert_eq!(down, ButtonEvent::Down);
        assert!(c.is_pressed(Button::Mute));
        assert_eq!(c.release(Button::Mute), ButtonEvent::Up);
        assert!(!c.is_pressed(Button::Mute));
    }

    #[test]
    fn test_long_fires_while_held() {
        let c = classifier();
        let (_, token) = c.press(Button::Solo);
        assert_eq!(c.fire_long(token), Some(ButtonEvent::Long));
    }

    #[test]
    fn test_token_stale_after_release() {
        let c = classifier();
        let (_, token) = c.press(Button::Mute);
        c.release(Button::Mute);
        assert_eq!(c.fire_long(token), None);
    }

    #[test]
    fn test_token_stale_after_cancel() {
        let c = classifier();
        let (_, token) = c.press(Button::Mute);
        c.cancel(Button::Mute);
        assert_eq!(c.fire_long(token), None);
        // The press is still open and closes normally
        assert!(c.is_pressed(Button::Mute));
        assert_eq!(c.release(Button::Mute), ButtonEvent::Up);
    }

    #[test]
    fn test_token_from_previous_press_never_fires() {
        let c = classifier();
        let (_, old_token) = c.press(Button::Mute);
        c.release(Button::Mute);
        let (_, _new_token) = c.press(Button::Mute);
        assert_eq!(c.fire_long(old_token), None);
    }

    #[test]
    #[should_panic(expected = "re-entrant press")]
    fn test_double_press_panics() {
        let c = classifier();
        c.press(Button::Mute);
        c.press(Button::Mute);
    }

    #[test]
    #[should_panic(expected = "without open press")]
    fn test_release_without_press_panics() {
        let c = classifier();
        c.release(Button::Solo);
    }

    #[test]
    #[should_panic(expected = "fired twice")]
    fn test_double_long_fire_panics() {
        let c = classifier();
        let (_, token) = c.press(Button::Mute);
        c.fire_long(token);
        c.fire_long(token);
    }

    #[test]
    fn test_buttons_are_independent() {
        let c = classifier();
        let (_, mute_token) = c.press(Button::Mute);
        c.press(Button::Solo);
        c.release(Button::Solo);
        // Releasing solo must not invalidate mute's pending timer
        assert_eq!(c.fire_long(mute_token), Some(ButtonEvent::Long));
    }

    #[test]
    fn test_button_parse() {
        assert_eq!(Button::parse("mute"), Some(Button::Mute));
        assert_eq!(Button::parse("scene3"), Some(Button::Scene(3)));
        assert_eq!(Button::parse("fader"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_armed_timer_delivers_long() {
        let c = Arc::new(ButtonClassifier::new(Duration::from_millis(500)));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let (_, token) = c.press(Button::Mute);
        let handle = arm_long_press(c.clone(), token, tx);

        tokio::time::advance(Duration::from_millis(600)).await;
        handle.await.unwrap();
        assert_eq!(rx.recv().await, Some((Button::Mute, ButtonEvent::Long)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_armed_timer_stale_after_early_release() {
        let c = Arc::new(ButtonClassifier::new(Duration::from_millis(500)));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let (_, token) = c.press(Button::Mute);
        let handle = arm_long_press(c.clone(), token, tx);

        tokio::time::advance(Duration::from_millis(100)).await;
        c.release(Button::Mute);
        tokio::time::advance(Duration::from_millis(600)).await;
        handle.await.unwrap();
        assert_eq!(rx.recv().await, None);
    }
}
