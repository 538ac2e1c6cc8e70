//! Model provider boundary
//!
//! The bank window never talks to a host/DAW bridge directly; it consumes
//! these traits. A real integration implements [`ModelProvider`] (and
//! optionally [`SceneBank`]) on top of its host API. The crate ships an
//! in-memory [`sim::SimModel`] used by the demo binary and the tests.

pub mod sim;

use serde::{Deserialize, Serialize};

/// RGB color with float components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Black / LED off.
    pub const OFF: Color = Color { r: 0.0, g: 0.0, b: 0.0 };

    /// Sentinel returned for scenes that contain no clip (green, so an empty
    /// scene row still renders as launchable).
    pub const EMPTY_SLOT: Color = Color { r: 0.0, g: 0.8, b: 0.0 };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Logical channel handle mirrored into the bank window.
///
/// One handle exists per window row at all times; rows with no logical track
/// mapped report `exists == false`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    /// Index within the current window (not the global track index).
    pub index: usize,
    pub exists: bool,
    pub selected: bool,
    pub mute: bool,
    pub solo: bool,
    pub name: String,
    pub color: Color,
}

impl Channel {
    /// Handle for a window row with no logical track behind it.
    pub fn absent(index: usize) -> Self {
        Self {
            index,
            exists: false,
            selected: false,
            mute: false,
            solo: false,
            name: String::new(),
            color: Color::OFF,
        }
    }
}

/// A track/scene intersection (clip container), read fresh from the provider
/// on every query and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Slot {
    pub exists: bool,
    pub has_content: bool,
    pub recording: bool,
    pub color: Color,
}

impl Slot {
    /// Slot for a position with no track or scene behind it.
    pub fn absent() -> Self {
        Self {
            exists: false,
            has_content: false,
            recording: false,
            color: Color::OFF,
        }
    }
}

/// The external model consumed by the bank window and the commands.
///
/// All indices are window indices (0-based within the current page). Methods
/// take `&self`; implementations use interior mutability so handles can be
/// shared as `Arc<dyn ModelProvider>`.
pub trait ModelProvider: Send + Sync {
    /// Channel mapped to a window row, or None when the row is past the end
    /// of the track list.
    fn channel_at(&self, window_index: usize) -> Option<Channel>;

    /// Slot at a track/scene intersection of the current window.
    fn slot(&self, track: usize, scene: usize) -> Slot;

    /// Window index of the selected channel, if one is inside the window.
    fn selected_channel_index(&self) -> Option<usize>;

    fn can_scroll_tracks_up(&self) -> bool;
    fn can_scroll_tracks_down(&self) -> bool;
    fn scroll_tracks_up(&self);
    fn scroll_tracks_down(&self);
    fn scroll_tracks_page_up(&self);
    fn scroll_tracks_page_down(&self);

    fn toggle_mute(&self, window_index: usize);
    fn toggle_solo(&self, window_index: usize);

    /// Master channel mutations, valid regardless of the window position.
    fn toggle_master_mute(&self);
    fn toggle_master_solo(&self);

    /// Selected layer/drum pad of the active device, if any.
    fn selected_layer_index(&self) -> Option<usize>;
    fn toggle_layer_mute(&self, layer_index: usize);
    fn toggle_layer_solo(&self, layer_index: usize);
}

/// Optional scene section of a provider.
///
/// A controller without scene buttons simply configures its bank window
/// without one; the window then answers scene queries with safe defaults.
pub trait SceneBank: Send + Sync {
    fn can_scroll_up(&self) -> bool;
    fn can_scroll_down(&self) -> bool;
    fn scroll_up(&self);
    fn scroll_down(&self);
    fn scroll_page_up(&self);
    fn scroll_page_down(&self);

    /// Launch the scene at a window scene index.
    fn launch_scene(&self, scene: usize);

    /// Stop scene playback.
    fn stop(&self);

    /// Absolute scroll position of the scene window.
    fn scroll_position(&self) -> isize;
}
