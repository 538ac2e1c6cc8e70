//! Function button commands (mute/solo pattern)
//!
//! One physical button serves three purposes: a momentary latch, a sticky
//! lock toggled with shift, and a long-press latch. The precedence lives in
//! a single decision table evaluated top to bottom:
//!
//! 1. simple profile        -> latch on every event
//! 2. shift held, UP        -> toggle lock
//! 3. locked                -> latch (press duration irrelevant)
//! 4. DOWN                  -> clear the long-press flag (arm)
//! 5. LONG                  -> set the long-press flag, latch
//! 6. long-press flag set   -> consume the UP that follows a LONG
//! 7. plain short UP        -> dispatch the toggle for the active mode scope
//!
//! Lock beats long press beats plain toggle, so behavior stays predictable
//! regardless of press duration once locked.

use crate::bank::BankWindow;
use crate::button::ButtonEvent;
use crate::model::ModelProvider;
use crate::modes::ModeScope;
use crate::session::{ControllerProfile, SessionState, TrackFunction};
use std::sync::Arc;
use tracing::debug;

/// Command bound to one function button (mute, solo, and by extension any
/// latching per-track function).
pub struct FunctionCommand {
    function: TrackFunction,
    bank: Arc<BankWindow>,
    provider: Arc<dyn ModelProvider>,
}

impl FunctionCommand {
    pub fn new(
        function: TrackFunction,
        bank: Arc<BankWindow>,
        provider: Arc<dyn ModelProvider>,
    ) -> Self {
        Self {
            function,
            bank,
            provider,
        }
    }

    pub fn function(&self) -> TrackFunction {
        self.function
    }

    /// Run the decision table for one classified event.
    pub fn execute(&self, event: ButtonEvent, session: &mut SessionState) {
        if session.profile() == ControllerProfile::Simple {
            session.latch(self.function);
            return;
        }

        if session.shift_held() {
            // Only the UP toggles; the DOWN of a shifted press is consumed
            if event == ButtonEvent::Up {
                session.toggle_lock();
            }
            return;
        }

        if session.is_locked() {
            session.latch(self.function);
            return;
        }

        match event {
            ButtonEvent::Down => {
                session.set_long_pressed(self.function, false);
            }
            ButtonEvent::Long => {
                session.set_long_pressed(self.function, true);
                session.latch(self.function);
            }
            ButtonEvent::Up => {
                if session.long_pressed(self.function) {
                    // The UP matching a LONG carries no further action
                    session.set_long_pressed(self.function, false);
                    return;
                }
                self.toggle(session);
            }
        }
    }

    /// Route the short-press toggle to exactly one target, decided by the
    /// active mode's scope.
    fn toggle(&self, session: &SessionState) {
        match session.active_mode().scope() {
            ModeScope::Track => {
                if let Some(channel) = self.bank.selected_channel() {
                    debug!("toggle {} on track {}", self.function, channel.index);
                    match self.function {
                        TrackFunction::Mute => self.provider.toggle_mute(channel.index),
                        TrackFunction::Solo => self.provider.toggle_solo(channel.index),
                    }
                }
            }
            ModeScope::Layer => {
                if let Some(layer) = self.provider.selected_layer_index() {
                    debug!("toggle {} on layer {}", self.function, layer);
                    match self.function {
                        TrackFunction::Mute => self.provider.toggle_layer_mute(layer),
                        TrackFunction::Solo => self.provider.toggle_layer_solo(layer),
                    }
                }
            }
            ModeScope::Master => {
                debug!("toggle {} on master", self.function);
                match self.function {
                    TrackFunction::Mute => self.provider.toggle_master_mute(),
                    TrackFunction::Solo => self.provider.toggle_master_solo(),
                }
            }
            ModeScope::Other => {
                // Modes outside the known scopes are inert, not an error
            }
        }
    }
}
