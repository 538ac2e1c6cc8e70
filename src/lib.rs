//! Gridbank - windowed bank, note cache, and mode dispatch core for grid
//! control surfaces
//!
//! An in-process coordination layer between a fixed-size physical grid of
//! buttons, pads, and encoders and an arbitrarily larger, dynamically
//! changing model of tracks, scenes, and devices:
//!
//! - [`bank::BankWindow`] maps a fixed hardware page onto the unbounded
//!   track/scene list with scroll/page operations and aggregate queries
//! - [`notecache::NoteCache`] deduplicates and classifies polyphonic note
//!   events (off / on / on-new) for correct pad feedback
//! - [`observer::ObserverRegistry`] fans selection and note events out to
//!   independently registered views and modes
//! - [`button::ButtonClassifier`] turns raw press/release timing into
//!   DOWN/UP/LONG semantic events with cancellable long-press timers
//! - [`command::FunctionCommand`] implements the mute/solo-style mode/lock
//!   decision table and routes toggles by the active mode's scope
//!
//! The host side is consumed through the [`model::ModelProvider`] trait;
//! [`model::sim::SimModel`] is an in-memory implementation for development
//! and tests.

pub mod bank;
pub mod button;
pub mod command;
pub mod config;
pub mod console;
pub mod feedback;
pub mod model;
pub mod modes;
pub mod notecache;
pub mod observer;
pub mod session;

pub use bank::{BankWindow, NoteEvent, SelectionEvent};
pub use button::{Button, ButtonClassifier, ButtonEvent};
pub use command::FunctionCommand;
pub use config::SurfaceSettings;
pub use model::{Channel, Color, ModelProvider, SceneBank, Slot};
pub use modes::{Mode, ModeScope};
pub use notecache::{NoteCache, NoteState};
pub use observer::ObserverRegistry;
pub use session::{ControllerProfile, SessionState, TrackFunction};
