//! Fixed-width embedding vectors
//!
//! An embedding is a one-hot vector over the piano range followed by an
//! optional duration slot. Slots `0..PITCH_WIDTH` stand for MIDI notes
//! `MIN_NOTE..MAX_NOTE`; the final slot of a full-width embedding holds the
//! elapsed time in milliseconds.
//!
//! The pitch range is part of the embedding shape. Changing it invalidates
//! every model trained on the old width.

use serde::{Deserialize, Serialize};

use crate::{CodecError, Result};

/// Lowest encodable MIDI note (A0)
pub const MIN_NOTE: u8 = 21;

/// Upper bound of the encodable range (C8), exclusive for encoding
pub const MAX_NOTE: u8 = 108;

/// Number of pitch slots
pub const PITCH_WIDTH: usize = (MAX_NOTE - MIN_NOTE) as usize;

/// Pitch slots plus the trailing duration slot
pub const EMBEDDING_WIDTH: usize = PITCH_WIDTH + 1;

/// Notes currently sounding, in the order they were pressed
///
/// The same note may appear more than once if it is re-triggered before being
/// released. Only membership and the highest note matter to the encoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteState {
    notes: Vec<u8>,
}

impl NoteState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, note: u8) {
        self.notes.push(note);
    }

    /// Remove one instance of `note`, returning whether it was sounding
    pub fn release(&mut self, note: u8) -> bool {
        match self.notes.iter().position(|&n| n == note) {
            Some(idx) => {
                self.notes.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Highest sounding note
    pub fn top(&self) -> Option<u8> {
        self.notes.iter().copied().max()
    }

    pub fn contains(&self, note: u8) -> bool {
        self.notes.contains(&note)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// One step of an embedding sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Embedding {
    values: Vec<f64>,
}

impl Embedding {
    /// Encode the highest sounding note of `state` and an elapsed duration
    ///
    /// A top note outside `MIN_NOTE..MAX_NOTE` leaves every pitch slot at
    /// zero, the same as silence.
    pub fn encode(state: &NoteState, ms: f64) -> Self {
        let mut values = vec![0.0; EMBEDDING_WIDTH];
        if let Some(slot) = state.top().and_then(pitch_slot) {
            values[slot] = 1.0;
        }
        values[PITCH_WIDTH] = ms;
        Embedding { values }
    }

    /// A silent full-width embedding
    pub fn silence(ms: f64) -> Self {
        Embedding::encode(&NoteState::new(), ms)
    }

    /// A full-width embedding sounding `note`
    pub fn note(note: u8, ms: f64) -> Self {
        let mut state = NoteState::new();
        state.press(note);
        Embedding::encode(&state, ms)
    }

    /// Wrap a raw vector produced elsewhere (e.g. by a model)
    ///
    /// The vector must be `PITCH_WIDTH` long (pitch only) or
    /// `EMBEDDING_WIDTH` long (pitch + duration). A duration slot must hold a
    /// finite, non-negative number of milliseconds.
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        match values.len() {
            PITCH_WIDTH => {}
            EMBEDDING_WIDTH => {
                let ms = values[PITCH_WIDTH];
                if !ms.is_finite() || ms < 0.0 {
                    return Err(CodecError::invalid_duration(ms));
                }
            }
            len => return Err(CodecError::invalid_length(len)),
        }
        Ok(Embedding { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    pub fn pitch_slots(&self) -> &[f64] {
        &self.values[..PITCH_WIDTH]
    }

    /// Duration slot, if this embedding has one
    pub fn duration_ms(&self) -> Option<f64> {
        self.values.get(PITCH_WIDTH).copied()
    }

    /// Indices of all non-zero pitch slots
    pub fn active_slots(&self) -> Vec<usize> {
        self.pitch_slots()
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// The encoded note, failing if more than one pitch slot is set
    pub fn top_note(&self) -> Result<Option<u8>> {
        let active = self.active_slots();
        match active.as_slice() {
            [] => Ok(None),
            [slot] => Ok(Some(MIN_NOTE + *slot as u8)),
            _ => Err(CodecError::multiple_pitches(active)),
        }
    }
}

impl TryFrom<Vec<f64>> for Embedding {
    type Error = CodecError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Embedding::from_values(values)
    }
}

impl From<Embedding> for Vec<f64> {
    fn from(embedding: Embedding) -> Self {
        embedding.values
    }
}

/// Pitch slot of an encodable note
pub fn pitch_slot(note: u8) -> Option<usize> {
    if (MIN_NOTE..MAX_NOTE).contains(&note) {
        Some((note - MIN_NOTE) as usize)
    } else {
        None
    }
}
