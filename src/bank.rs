//! Bank window - fixed-size view onto the unbounded track/scene list
//!
//! The bank window maps a hardware page of N tracks x M scenes x K sends onto
//! the model provider, mirrors channel handles into a fixed-size array, owns
//! the per-track note cache, and fans selection/note events out to registered
//! observers. Scrolling is delegated to the provider; the window only knows
//! its page size.

use crate::model::{Channel, Color, ModelProvider, SceneBank};
use crate::notecache::{NoteCache, NoteState};
use crate::observer::{ObserverRegistry, SubscriptionId};
use anyhow::Result;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tracing::{debug, trace};

/// Emitted when the selected flag of a window row changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionEvent {
    /// Window index of the affected track.
    pub track: usize,
    pub selected: bool,
}

/// Emitted for every note input reaching the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoteEvent {
    pub note: u8,
    pub velocity: u8,
}

/// Windowed channel/scene/send abstraction.
///
/// The channel array always has exactly the configured track page size;
/// rows with no logical track report `exists == false`. All methods take
/// `&self` and complete synchronously.
pub struct BankWindow {
    provider: Arc<dyn ModelProvider>,
    scene_bank: Option<Arc<dyn SceneBank>>,
    num_tracks: usize,
    num_scenes: usize,
    num_sends: usize,
    channels: RwLock<Vec<Channel>>,
    notes: RwLock<NoteCache>,
    selection_observers: ObserverRegistry<SelectionEvent>,
    note_observers: ObserverRegistry<NoteEvent>,
}

impl BankWindow {
    /// Create a window of the given page sizes over a provider.
    ///
    /// All rows start absent; call [`refresh`](Self::refresh) to pull the
    /// initial channel data.
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        scene_bank: Option<Arc<dyn SceneBank>>,
        num_tracks: usize,
        num_scenes: usize,
        num_sends: usize,
    ) -> Self {
        assert!(num_tracks > 0, "track page size must be non-zero");
        let channels = (0..num_tracks).map(Channel::absent).collect();
        Self {
            provider,
            scene_bank,
            num_tracks,
            num_scenes,
            num_sends,
            channels: RwLock::new(channels),
            notes: RwLock::new(NoteCache::new(num_tracks)),
            selection_observers: ObserverRegistry::new(),
            note_observers: ObserverRegistry::new(),
        }
    }

    pub fn num_tracks(&self) -> usize {
        self.num_tracks
    }

    pub fn num_scenes(&self) -> usize {
        self.num_scenes
    }

    pub fn num_sends(&self) -> usize {
        self.num_sends
    }

    /// The cached channel handle of a window row. Never absent as a value:
    /// unmapped rows return a handle with `exists == false`.
    pub fn channel(&self, index: usize) -> Channel {
        assert!(
            index < self.num_tracks,
            "window index {} out of range (page size {})",
            index,
            self.num_tracks
        );
        self.channels.read().unwrap()[index].clone()
    }

    /// First channel in the window reporting selected, if any.
    ///
    /// Linear scan; the window is small and this runs at most once per
    /// refresh tick. At most one row is selected (provider guarantee).
    pub fn selected_channel(&self) -> Option<Channel> {
        self.channels
            .read()
            .unwrap()
            .iter()
            .find(|channel| channel.selected)
            .cloned()
    }

    /// True when any slot in the current window is recording.
    ///
    /// Short-circuits on the first hit; bounded by tracks x scenes.
    pub fn is_any_clip_recording(&self) -> bool {
        for track in 0..self.num_tracks {
            for scene in 0..self.num_scenes {
                if self.provider.slot(track, scene).recording {
                    return true;
                }
            }
        }
        false
    }

    /// Color of the leftmost slot with content in a scene row, or the empty
    /// sentinel when the scene holds no clip. Leftmost wins by contract so
    /// multi-clip scenes render deterministically.
    pub fn color_of_first_clip_in_scene(&self, scene: usize) -> Color {
        assert!(
            scene < self.num_scenes,
            "scene {} out of range (page size {})",
            scene,
            self.num_scenes
        );
        for track in 0..self.num_tracks {
            let slot = self.provider.slot(track, scene);
            if slot.exists && slot.has_content {
                return slot.color;
            }
        }
        Color::EMPTY_SLOT
    }

    /// Re-pull all window rows from the provider and emit selection events
    /// for rows whose selected flag changed.
    ///
    /// This is the only path that mutates the channel array. Returns the
    /// first listener error, leaving earlier listeners notified.
    pub fn refresh(&self) -> Result<()> {
        let mut events = Vec::new();
        {
            let mut channels = self.channels.write().unwrap();
            for index in 0..self.num_tracks {
                let fresh = self
                    .provider
                    .channel_at(index)
                    .map(|channel| Channel { index, ..channel })
                    .unwrap_or_else(|| Channel::absent(index));
                if channels[index].selected != fresh.selected {
                    events.push(SelectionEvent {
                        track: index,
                        selected: fresh.selected,
                    });
                }
                channels[index] = fresh;
            }
        }
        // Lock released before fan-out: listeners may query the window.
        for event in &events {
            trace!("selection changed: track {} -> {}", event.track, event.selected);
            self.notify_selection(event.track, event.selected)?;
        }
        Ok(())
    }

    // --- Track scrolling -------------------------------------------------

    pub fn can_scroll_tracks_up(&self) -> bool {
        self.provider.can_scroll_tracks_up()
    }

    pub fn can_scroll_tracks_down(&self) -> bool {
        self.provider.can_scroll_tracks_down()
    }

    /// Scroll one track towards the start of the list.
    pub fn scroll_tracks_up(&self) -> Result<()> {
        self.provider.scroll_tracks_up();
        self.after_track_scroll()
    }

    /// Scroll one track towards the end of the list.
    pub fn scroll_tracks_down(&self) -> Result<()> {
        self.provider.scroll_tracks_down();
        self.after_track_scroll()
    }

    /// Scroll a full page towards the start of the list.
    pub fn scroll_tracks_page_up(&self) -> Result<()> {
        self.provider.scroll_tracks_page_up();
        self.after_track_scroll()
    }

    /// Scroll a full page towards the end of the list.
    pub fn scroll_tracks_page_down(&self) -> Result<()> {
        self.provider.scroll_tracks_page_down();
        self.after_track_scroll()
    }

    /// Every track scroll remaps rows to different logical tracks, so the
    /// whole note cache is stale and must be dropped before refreshing.
    fn after_track_scroll(&self) -> Result<()> {
        debug!("track window scrolled, invalidating note cache");
        self.notes.write().unwrap().reset_all();
        self.refresh()
    }

    // --- Scene sub-window ------------------------------------------------
    //
    // All scene operations are safe no-ops (or defaults) when the window was
    // built without a scene section: a controller without scene buttons must
    // still function.

    pub fn can_scroll_scenes_up(&self) -> bool {
        self.scene_bank.as_ref().is_some_and(|bank| bank.can_scroll_up())
    }

    pub fn can_scroll_scenes_down(&self) -> bool {
        self.scene_bank.as_ref().is_some_and(|bank| bank.can_scroll_down())
    }

    pub fn scroll_scenes_up(&self) {
        if let Some(bank) = &self.scene_bank {
            bank.scroll_up();
        }
    }

    pub fn scroll_scenes_down(&self) {
        if let Some(bank) = &self.scene_bank {
            bank.scroll_down();
        }
    }

    pub fn scroll_scenes_page_up(&self) {
        if let Some(bank) = &self.scene_bank {
            bank.scroll_page_up();
        }
    }

    pub fn scroll_scenes_page_down(&self) {
        if let Some(bank) = &self.scene_bank {
            bank.scroll_page_down();
        }
    }

    pub fn launch_scene(&self, scene: usize) {
        assert!(
            scene < self.num_scenes,
            "scene {} out of range (page size {})",
            scene,
            self.num_scenes
        );
        if let Some(bank) = &self.scene_bank {
            bank.launch_scene(scene);
        }
    }

    /// Stop scene playback.
    pub fn stop(&self) {
        if let Some(bank) = &self.scene_bank {
            bank.stop();
        }
    }

    /// Scene scroll position, -1 when there is no scene section.
    pub fn scene_position(&self) -> isize {
        self.scene_bank
            .as_ref()
            .map_or(-1, |bank| bank.scroll_position())
    }

    // --- Note cache ------------------------------------------------------

    /// Record a note for a window row and return the prior cached state.
    pub fn record_note(&self, track: usize, note: u8, velocity: u8) -> NoteState {
        self.notes.write().unwrap().record(track, note, velocity)
    }

    /// Cached state of a note on a window row.
    pub fn note_state(&self, track: usize, note: u8) -> NoteState {
        self.notes.read().unwrap().state(track, note)
    }

    // --- Observers -------------------------------------------------------

    pub fn add_selection_observer<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&SelectionEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.selection_observers.subscribe(listener)
    }

    pub fn add_note_observer<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&NoteEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.note_observers.subscribe(listener)
    }

    pub fn remove_selection_observer(&self, id: SubscriptionId) -> bool {
        self.selection_observers.unsubscribe(id)
    }

    pub fn remove_note_observer(&self, id: SubscriptionId) -> bool {
        self.note_observers.unsubscribe(id)
    }

    /// Emit a selection-changed event. Called from the model-refresh path,
    /// never from command handlers.
    pub fn notify_selection(&self, track: usize, selected: bool) -> Result<()> {
        self.selection_observers
            .notify(&SelectionEvent { track, selected })
    }

    /// Emit a note-changed event. Called from the model-refresh path, never
    /// from command handlers.
    pub fn notify_note(&self, note: u8, velocity: u8) -> Result<()> {
        self.note_observers.notify(&NoteEvent { note, velocity })
    }
}
