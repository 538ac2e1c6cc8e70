//! Per-track note state cache
//!
//! Tracks the last-known state of every note number per hardware track row so
//! pad feedback can distinguish a fresh attack from a retrigger of a note that
//! is already sounding. One row per window track, 128 cells per row, sized
//! once at construction.

use serde::Serialize;

/// Number of note cells per track row (full MIDI note range).
pub const NOTE_RANGE: usize = 128;

/// Cached playing state of a single note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteState {
    /// Note is not sounding.
    Off,
    /// Note was attacked while previously off.
    On,
    /// Note was retriggered while already sounding.
    OnNew,
}

impl NoteState {
    /// Compute the state following this one for an incoming velocity.
    ///
    /// Velocity 0 always releases the note. A non-zero velocity on an off
    /// note is a fresh attack; on an already-sounding note it is a retrigger.
    pub fn advance(self, velocity: u8) -> NoteState {
        if velocity == 0 {
            NoteState::Off
        } else if self == NoteState::Off {
            NoteState::On
        } else {
            NoteState::OnNew
        }
    }

    /// Whether the note is audible in this state.
    pub fn is_sounding(self) -> bool {
        self != NoteState::Off
    }
}

/// Fixed-size note state cache, one row per window track.
///
/// The cache never grows or shrinks after construction. Out-of-range indices
/// are caller bugs and panic.
pub struct NoteCache {
    rows: Vec<[NoteState; NOTE_RANGE]>,
}

impl NoteCache {
    /// Create a cache for `num_tracks` rows, all cells off.
    pub fn new(num_tracks: usize) -> Self {
        Self {
            rows: vec![[NoteState::Off; NOTE_RANGE]; num_tracks],
        }
    }

    /// Number of track rows.
    pub fn num_tracks(&self) -> usize {
        self.rows.len()
    }

    /// Record a note event and return the state the cell had before it.
    ///
    /// Callers use the prior state to decide whether a visual transition is
    /// needed at all.
    pub fn record(&mut self, track: usize, note: u8, velocity: u8) -> NoteState {
        assert!(
            track < self.rows.len(),
            "track {} out of range (window has {} rows)",
            track,
            self.rows.len()
        );
        assert!((note as usize) < NOTE_RANGE, "note {} out of range", note);

        let cell = &mut self.rows[track][note as usize];
        let prior = *cell;
        *cell = prior.advance(velocity);
        prior
    }

    /// Current cached state of a note.
    pub fn state(&self, track: usize, note: u8) -> NoteState {
        assert!(
            track < self.rows.len(),
            "track {} out of range (window has {} rows)",
            track,
            self.rows.len()
        );
        assert!((note as usize) < NOTE_RANGE, "note {} out of range", note);
        self.rows[track][note as usize]
    }

    /// Clear all cells of one track row to off.
    ///
    /// Called when a track scrolls out of the window: cached state for a row
    /// must not leak into the channel newly mapped there.
    pub fn reset(&mut self, track: usize) {
        assert!(
            track < self.rows.len(),
            "track {} out of range (window has {} rows)",
            track,
            self.rows.len()
        );
        self.rows[track] = [NoteState::Off; NOTE_RANGE];
    }

    /// Clear every row.
    pub fn reset_all(&mut self) {
        for row in &mut self.rows {
            *row = [NoteState::Off; NOTE_RANGE];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_off_is_idempotent() {
        let mut cache = NoteCache::new(4);
        assert_eq!(cache.record(0, 36, 0), NoteState::Off);
        assert_eq!(cache.record(0, 36, 0), NoteState::Off);
        assert_eq!(cache.state(0, 36), NoteState::Off);
    }

    #[test]
    fn test_repeated_attack_goes_on_then_on_new() {
        let mut cache = NoteCache::new(4);
        assert_eq!(cache.record(2, 60, 100), NoteState::Off);
        assert_eq!(cache.state(2, 60), NoteState::On);
        assert_eq!(cache.record(2, 60, 100), NoteState::On);
        assert_eq!(cache.state(2, 60), NoteState::OnNew);
        // Further retriggers stay in the retrigger state
        assert_eq!(cache.record(2, 60, 64), NoteState::OnNew);
        assert_eq!(cache.state(2, 60), NoteState::OnNew);
    }

    #[test]
    fn test_release_returns_to_off() {
        let mut cache = NoteCache::new(1);
        cache.record(0, 60, 100);
        cache.record(0, 60, 100);
        assert_eq!(cache.record(0, 60, 0), NoteState::OnNew);
        assert_eq!(cache.state(0, 60), NoteState::Off);
    }

    #[test]
    fn test_reset_clears_whole_row() {
        let mut cache = NoteCache::new(2);
        for note in 0..NOTE_RANGE as u8 {
            cache.record(1, note, 100);
        }
        cache.reset(1);
        for note in 0..NOTE_RANGE as u8 {
            assert_eq!(cache.state(1, note), NoteState::Off);
        }
    }

    #[test]
    fn test_rows_are_independent() {
        let mut cache = NoteCache::new(3);
        cache.record(0, 40, 100);
        assert_eq!(cache.state(1, 40), NoteState::Off);
        cache.reset(0);
        cache.record(2, 40, 100);
        assert_eq!(cache.state(2, 40), NoteState::On);
        assert_eq!(cache.state(0, 40), NoteState::Off);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_track_panics() {
        let mut cache = NoteCache::new(2);
        cache.record(2, 0, 100);
    }

    proptest! {
        /// Velocity 0 lands on Off and non-zero velocity never does,
        /// regardless of the prior state.
        #[test]
        fn prop_advance_matches_velocity(velocity in 0u8..=127) {
            for prior in [NoteState::Off, NoteState::On, NoteState::OnNew] {
                let next = prior.advance(velocity);
                if velocity == 0 {
                    prop_assert_eq!(next, NoteState::Off);
                } else {
                    prop_assert!(next.is_sounding());
                    // OnNew only ever follows a sounding note
                    if prior == NoteState::Off {
                        prop_assert_eq!(next, NoteState::On);
                    } else {
                        prop_assert_eq!(next, NoteState::OnNew);
                    }
                }
            }
        }

        /// Replaying any event sequence, the cache state always equals the
        /// fold of `advance` over that sequence.
        #[test]
        fn prop_cache_folds_advance(events in proptest::collection::vec(0u8..=127, 0..32)) {
            let mut cache = NoteCache::new(1);
            let mut expected = NoteState::Off;
            for velocity in events {
                let prior = cache.record(0, 60, velocity);
                prop_assert_eq!(prior, expected);
                expected = expected.advance(velocity);
            }
            prop_assert_eq!(cache.state(0, 60), expected);
        }
    }
}
