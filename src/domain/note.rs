// ============================================================
// Layer 3 — Note Domain Types
// ============================================================
// A NoteEvent is one row of a parsed MIDI table: which pitch
// sounds, and over which closed time interval [start, end].
// Events may overlap freely (chords, legato lines).
//
// PitchRange fixes the width of every activity frame. It is
// captured from the training table once and reused for every
// later inference so that index i always means the same pitch.

use serde::{Deserialize, Serialize};

/// One sounding note. Times share whatever unit the framer's
/// `time_fraction` is expressed in (seconds for parsed MIDI).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub pitch: u8,
    pub start: f64,
    pub end:   f64,
}

impl NoteEvent {
    pub fn new(pitch: u8, start: f64, end: f64) -> Self {
        Self { pitch, start, end }
    }

    /// Closed-interval test: a note sounds at both of its boundary instants.
    pub fn is_active_at(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Inclusive `[min, max]` pitch bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchRange {
    pub min: u8,
    pub max: u8,
}

impl PitchRange {
    /// Returns `None` when `min > max`.
    pub fn new(min: u8, max: u8) -> Option<Self> {
        (min <= max).then_some(Self { min, max })
    }

    /// Width of an activity frame: `max - min + 1`.
    pub fn dim(&self) -> usize {
        (self.max - self.min) as usize + 1
    }

    pub fn contains(&self, pitch: u8) -> bool {
        self.min <= pitch && pitch <= self.max
    }

    /// Frame index of `pitch`, or `None` if it falls outside the range.
    pub fn index_of(&self, pitch: u8) -> Option<usize> {
        self.contains(pitch).then(|| (pitch - self.min) as usize)
    }

    /// Inverse of `index_of`. Callers guarantee `index < dim()`.
    pub fn pitch_at(&self, index: usize) -> u8 {
        self.min + index as u8
    }
}

/// The tabular input: an ordered list of note events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTable {
    events: Vec<NoteEvent>,
}

impl EventTable {
    pub fn new(events: Vec<NoteEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Lowest and highest pitch in the table, `None` for an empty table.
    pub fn pitch_range(&self) -> Option<PitchRange> {
        let min = self.events.iter().map(|e| e.pitch).min()?;
        let max = self.events.iter().map(|e| e.pitch).max()?;
        PitchRange::new(min, max)
    }

    /// `(min start, max end)` over all events, `None` for an empty table.
    pub fn time_span(&self) -> Option<(f64, f64)> {
        if self.events.is_empty() {
            return None;
        }
        let start = self.events.iter().map(|e| e.start).fold(f64::INFINITY, f64::min);
        let end   = self.events.iter().map(|e| e.end).fold(f64::NEG_INFINITY, f64::max);
        Some((start, end))
    }

    /// Copy of the table keeping only pitches inside `range`.
    /// Use before inference when the input may drift outside the
    /// range the model was trained on.
    pub fn within(&self, range: PitchRange) -> Self {
        Self::new(
            self.events
                .iter()
                .filter(|e| range.contains(e.pitch))
                .copied()
                .collect(),
        )
    }
}

impl From<Vec<NoteEvent>> for EventTable {
    fn from(events: Vec<NoteEvent>) -> Self {
        Self::new(events)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_interval_activity() {
        let n = NoteEvent::new(60, 1.0, 2.0);
        assert!(n.is_active_at(1.0));
        assert!(n.is_active_at(2.0));
        assert!(!n.is_active_at(2.0001));
        assert!(!n.is_active_at(0.9999));
    }

    #[test]
    fn test_pitch_range_dim_and_index() {
        let r = PitchRange::new(60, 69).unwrap();
        assert_eq!(r.dim(), 10);
        assert_eq!(r.index_of(63), Some(3));
        assert_eq!(r.index_of(70), None);
        assert_eq!(r.pitch_at(3), 63);
        assert!(PitchRange::new(61, 60).is_none());
    }

    #[test]
    fn test_table_range_and_span() {
        let t = EventTable::from(vec![
            NoteEvent::new(64, 0.5, 1.0),
            NoteEvent::new(40, 0.2, 0.4),
            NoteEvent::new(80, 0.3, 2.5),
        ]);
        assert_eq!(t.pitch_range(), PitchRange::new(40, 80));
        assert_eq!(t.time_span(), Some((0.2, 2.5)));
    }

    #[test]
    fn test_empty_table_has_no_range() {
        let t = EventTable::default();
        assert!(t.pitch_range().is_none());
        assert!(t.time_span().is_none());
    }

    #[test]
    fn test_within_filters_out_of_range_pitches() {
        let t = EventTable::from(vec![
            NoteEvent::new(30, 0.0, 1.0),
            NoteEvent::new(50, 0.0, 1.0),
            NoteEvent::new(90, 0.0, 1.0),
        ]);
        let kept = t.within(PitchRange::new(40, 80).unwrap());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.events()[0].pitch, 50);
    }
}
