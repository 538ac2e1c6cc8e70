//! In-memory model provider
//!
//! A simulated track/scene/device model so the bank, commands, and console
//! can be exercised without any host bridge or hardware. Used by the demo
//! binary and throughout the tests.

use super::{Channel, Color, ModelProvider, SceneBank, Slot};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// A clip slot of the simulated model (absolute scene position).
#[derive(Debug, Clone, Copy)]
pub struct SimSlot {
    pub has_content: bool,
    pub recording: bool,
    pub color: Color,
}

impl SimSlot {
    pub fn empty() -> Self {
        Self {
            has_content: false,
            recording: false,
            color: Color::OFF,
        }
    }

    pub fn clip(color: Color) -> Self {
        Self {
            has_content: true,
            recording: false,
            color,
        }
    }
}

/// A track of the simulated model.
#[derive(Debug, Clone)]
pub struct SimTrack {
    pub name: String,
    pub color: Color,
    pub mute: bool,
    pub solo: bool,
    pub slots: Vec<SimSlot>,
}

impl SimTrack {
    pub fn new(name: impl Into<String>, color: Color, num_scenes: usize) -> Self {
        Self {
            name: name.into(),
            color,
            mute: false,
            solo: false,
            slots: vec![SimSlot::empty(); num_scenes],
        }
    }

    /// Place a clip at an absolute scene position.
    pub fn with_clip(mut self, scene: usize, color: Color) -> Self {
        self.slots[scene] = SimSlot::clip(color);
        self
    }
}

/// A device layer / drum pad of the simulated model.
#[derive(Debug, Clone)]
pub struct SimLayer {
    pub name: String,
    pub mute: bool,
    pub solo: bool,
}

struct SimState {
    tracks: Vec<SimTrack>,
    track_offset: usize,
    scene_offset: usize,
    num_scenes_total: usize,
    selected: Option<usize>,
    master_mute: bool,
    master_solo: bool,
    layers: Vec<SimLayer>,
    selected_layer: Option<usize>,
    last_launched: Option<usize>,
}

/// Simulated model provider over an in-memory track list.
///
/// Interior mutability via `RwLock` so the same instance can be shared as
/// `Arc<dyn ModelProvider>` and mutated through the trait methods.
pub struct SimModel {
    state: Arc<RwLock<SimState>>,
    num_tracks: usize,
    num_scenes: usize,
}

impl SimModel {
    /// Build a model over the given tracks with a window of
    /// `num_tracks` x `num_scenes`.
    pub fn new(
        num_tracks: usize,
        num_scenes: usize,
        num_scenes_total: usize,
        tracks: Vec<SimTrack>,
        layers: Vec<SimLayer>,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(SimState {
                tracks,
                track_offset: 0,
                scene_offset: 0,
                num_scenes_total,
                selected: None,
                master_mute: false,
                master_solo: false,
                layers,
                selected_layer: None,
                last_launched: None,
            })),
            num_tracks,
            num_scenes,
        }
    }

    /// A small demo project: 12 tracks, a few clips, 4 drum pads.
    pub fn demo(num_tracks: usize, num_scenes: usize) -> Self {
        let red = Color::new(0.9, 0.1, 0.1);
        let blue = Color::new(0.1, 0.2, 0.9);
        let orange = Color::new(0.9, 0.5, 0.1);
        let purple = Color::new(0.6, 0.1, 0.8);
        let cyan = Color::new(0.1, 0.8, 0.8);
        let yellow = Color::new(0.9, 0.9, 0.1);

        let total_scenes = 16;
        let names = [
            ("Drums", red),
            ("Bass", blue),
            ("Keys", orange),
            ("Lead", purple),
            ("Pads", cyan),
            ("Vox", yellow),
            ("Gtr", red),
            ("Perc", blue),
            ("FX", orange),
            ("Arp", purple),
            ("Strings", cyan),
            ("Brass", yellow),
        ];
        let tracks = names
            .iter()
            .enumerate()
            .map(|(i, (name, color))| {
                let mut track = SimTrack::new(*name, *color, total_scenes);
                // Clips on a diagonal plus a full first scene
                track = track.with_clip(0, *color);
                track = track.with_clip(i % total_scenes, *color);
                track
            })
            .collect();

        let layers = ["Kick", "Snare", "HiHat", "Clap"]
            .iter()
            .map(|name| SimLayer {
                name: (*name).to_string(),
                mute: false,
                solo: false,
            })
            .collect();

        Self::new(num_tracks, num_scenes, total_scenes, tracks, layers)
    }

    /// Scene section sharing this model's state.
    pub fn scene_bank(&self) -> SimSceneBank {
        SimSceneBank {
            state: self.state.clone(),
            num_scenes: self.num_scenes,
        }
    }

    fn max_track_offset(&self, state: &SimState) -> usize {
        state.tracks.len().saturating_sub(self.num_tracks)
    }

    /// Select the track at a window index. Returns false when no track is
    /// mapped there.
    pub fn select_window(&self, window_index: usize) -> bool {
        let mut state = self.state.write().unwrap();
        let abs = state.track_offset + window_index;
        if abs < state.tracks.len() {
            state.selected = Some(abs);
            debug!("selected track {} ({})", abs, state.tracks[abs].name);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&self) {
        self.state.write().unwrap().selected = None;
    }

    /// Select a device layer, or None to deselect.
    pub fn select_layer(&self, layer: Option<usize>) -> bool {
        let mut state = self.state.write().unwrap();
        match layer {
            Some(i) if i >= state.layers.len() => false,
            other => {
                state.selected_layer = other;
                true
            }
        }
    }

    /// Toggle the recording flag of a slot at window coordinates.
    pub fn toggle_slot_recording(&self, track: usize, scene: usize) -> bool {
        let mut state = self.state.write().unwrap();
        let abs_t = state.track_offset + track;
        let abs_s = state.scene_offset + scene;
        if abs_t >= state.tracks.len() || abs_s >= state.num_scenes_total {
            return false;
        }
        let slot = &mut state.tracks[abs_t].slots[abs_s];
        slot.recording = !slot.recording;
        slot.recording
    }

    /// Mute/solo flags of an absolute track (test observation).
    pub fn track_flags(&self, abs_index: usize) -> (bool, bool) {
        let state = self.state.read().unwrap();
        let track = &state.tracks[abs_index];
        (track.mute, track.solo)
    }

    /// Master mute/solo flags (test observation).
    pub fn master_flags(&self) -> (bool, bool) {
        let state = self.state.read().unwrap();
        (state.master_mute, state.master_solo)
    }

    /// Mute/solo flags of a device layer (test observation).
    pub fn layer_flags(&self, index: usize) -> (bool, bool) {
        let state = self.state.read().unwrap();
        let layer = &state.layers[index];
        (layer.mute, layer.solo)
    }

    /// Scene most recently launched through the scene bank, if any.
    pub fn last_launched_scene(&self) -> Option<usize> {
        self.state.read().unwrap().last_launched
    }

    /// Current track scroll offset.
    pub fn track_offset(&self) -> usize {
        self.state.read().unwrap().track_offset
    }
}

impl ModelProvider for SimModel {
    fn channel_at(&self, window_index: usize) -> Option<Channel> {
        let state = self.state.read().unwrap();
        let abs = state.track_offset + window_index;
        state.tracks.get(abs).map(|track| Channel {
            index: window_index,
            exists: true,
            selected: state.selected == Some(abs),
            mute: track.mute,
            solo: track.solo,
            name: track.name.clone(),
            color: track.color,
        })
    }

    fn slot(&self, track: usize, scene: usize) -> Slot {
        let state = self.state.read().unwrap();
        let abs_t = state.track_offset + track;
        let abs_s = state.scene_offset + scene;
        if abs_s >= state.num_scenes_total {
            return Slot::absent();
        }
        match state.tracks.get(abs_t) {
            Some(t) => {
                let slot = t.slots[abs_s];
                Slot {
                    exists: true,
                    has_content: slot.has_content,
                    recording: slot.recording,
                    color: slot.color,
                }
            }
            None => Slot::absent(),
        }
    }

    fn selected_channel_index(&self) -> Option<usize> {
        let state = self.state.read().unwrap();
        state.selected.and_then(|abs| {
            if abs >= state.track_offset && abs < state.track_offset + self.num_tracks {
                Some(abs - state.track_offset)
            } else {
                None
            }
        })
    }

    fn can_scroll_tracks_up(&self) -> bool {
        self.state.read().unwrap().track_offset > 0
    }

    fn can_scroll_tracks_down(&self) -> bool {
        let state = self.state.read().unwrap();
        state.track_offset < self.max_track_offset(&state)
    }

    fn scroll_tracks_up(&self) {
        let mut state = self.state.write().unwrap();
        state.track_offset = state.track_offset.saturating_sub(1);
    }

    fn scroll_tracks_down(&self) {
        let mut state = self.state.write().unwrap();
        let max = self.max_track_offset(&state);
        state.track_offset = (state.track_offset + 1).min(max);
    }

    fn scroll_tracks_page_up(&self) {
        let mut state = self.state.write().unwrap();
        state.track_offset = state.track_offset.saturating_sub(self.num_tracks);
    }

    fn scroll_tracks_page_down(&self) {
        let mut state = self.state.write().unwrap();
        let max = self.max_track_offset(&state);
        state.track_offset = (state.track_offset + self.num_tracks).min(max);
    }

    fn toggle_mute(&self, window_index: usize) {
        let mut state = self.state.write().unwrap();
        let abs = state.track_offset + window_index;
        if let Some(track) = state.tracks.get_mut(abs) {
            track.mute = !track.mute;
            debug!("track {} mute -> {}", track.name, track.mute);
        }
    }

    fn toggle_solo(&self, window_index: usize) {
        let mut state = self.state.write().unwrap();
        let abs = state.track_offset + window_index;
        if let Some(track) = state.tracks.get_mut(abs) {
            track.solo = !track.solo;
            debug!("track {} solo -> {}", track.name, track.solo);
        }
    }

    fn toggle_master_mute(&self) {
        let mut state = self.state.write().unwrap();
        state.master_mute = !state.master_mute;
        debug!("master mute -> {}", state.master_mute);
    }

    fn toggle_master_solo(&self) {
        let mut state = self.state.write().unwrap();
        state.master_solo = !state.master_solo;
        debug!("master solo -> {}", state.master_solo);
    }

    fn selected_layer_index(&self) -> Option<usize> {
        self.state.read().unwrap().selected_layer
    }

    fn toggle_layer_mute(&self, layer_index: usize) {
        let mut state = self.state.write().unwrap();
        if let Some(layer) = state.layers.get_mut(layer_index) {
            layer.mute = !layer.mute;
            debug!("layer {} mute -> {}", layer.name, layer.mute);
        }
    }

    fn toggle_layer_solo(&self, layer_index: usize) {
        let mut state = self.state.write().unwrap();
        if let Some(layer) = state.layers.get_mut(layer_index) {
            layer.solo = !layer.solo;
            debug!("layer {} solo -> {}", layer.name, layer.solo);
        }
    }
}

/// Scene section of [`SimModel`], sharing its state.
pub struct SimSceneBank {
    state: Arc<RwLock<SimState>>,
    num_scenes: usize,
}

impl SimSceneBank {
    fn max_scene_offset(&self, state: &SimState) -> usize {
        state.num_scenes_total.saturating_sub(self.num_scenes)
    }
}

impl SceneBank for SimSceneBank {
    fn can_scroll_up(&self) -> bool {
        self.state.read().unwrap().scene_offset > 0
    }

    fn can_scroll_down(&self) -> bool {
        let state = self.state.read().unwrap();
        state.scene_offset < self.max_scene_offset(&state)
    }

    fn scroll_up(&self) {
        let mut state = self.state.write().unwrap();
        state.scene_offset = state.scene_offset.saturating_sub(1);
    }

    fn scroll_down(&self) {
        let mut state = self.state.write().unwrap();
        let max = self.max_scene_offset(&state);
        state.scene_offset = (state.scene_offset + 1).min(max);
    }

    fn scroll_page_up(&self) {
        let mut state = self.state.write().unwrap();
        state.scene_offset = state.scene_offset.saturating_sub(self.num_scenes);
    }

    fn scroll_page_down(&self) {
        let mut state = self.state.write().unwrap();
        let max = self.max_scene_offset(&state);
        state.scene_offset = (state.scene_offset + self.num_scenes).min(max);
    }

    fn launch_scene(&self, scene: usize) {
        let mut state = self.state.write().unwrap();
        let abs = state.scene_offset + scene;
        state.last_launched = Some(abs);
        info!("launch scene {}", abs);
    }

    fn stop(&self) {
        let mut state = self.state.write().unwrap();
        state.last_launched = None;
        info!("scene playback stopped");
    }

    fn scroll_position(&self) -> isize {
        self.state.read().unwrap().scene_offset as isize
    }
}
