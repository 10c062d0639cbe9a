//! Inverse pass: embeddings to note events
//!
//! Each sounding embedding becomes a NoteOn/NoteOff pair. Silent embeddings
//! emit nothing; their ticks are carried forward onto the next NoteOn, or onto
//! the closing EndOfTrack when the sequence ends in silence. Tempo is fixed
//! for the whole sequence.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::embedding::Embedding;
use crate::event::{Track, TimedEvent};
use crate::timing::{ms_to_ticks, tempo_to_bytes};
use crate::{CodecError, Result};

/// Velocity given to every decoded note
pub const DEFAULT_VELOCITY: u8 = 100;

/// Parameters of the generated track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Microseconds per quarter note
    pub tempo: u32,
    /// Ticks per quarter note
    pub resolution: u16,
    pub velocity: u8,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            tempo: 1_000_000,
            resolution: 960,
            velocity: DEFAULT_VELOCITY,
        }
    }
}

impl DecodeOptions {
    pub fn new(tempo: u32, resolution: u16, velocity: u8) -> Self {
        DecodeOptions {
            tempo,
            resolution,
            velocity,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.resolution == 0 {
            return Err(CodecError::InvalidResolution);
        }
        if self.tempo == 0 {
            return Err(CodecError::InvalidTempo(self.tempo));
        }
        tempo_to_bytes(self.tempo)?;
        Ok(())
    }

    /// Ticks covered by one embedding
    fn slot_ticks(&self, embedding: &Embedding) -> Result<u32> {
        match embedding.duration_ms() {
            Some(ms) => ms_to_ticks(ms, self.tempo, self.resolution),
            None => Ok(u32::from(self.resolution / 2)),
        }
    }
}

/// Decode embeddings into NoteOn/NoteOff pairs closed by an EndOfTrack
///
/// Fails with [`CodecError::InvalidEmbedding`] if any embedding has more than
/// one pitch slot set; nothing is returned in that case.
///
/// # Examples
/// ```
/// use melody_core::{decode, DecodeOptions, Embedding, TimedEvent};
///
/// let options = DecodeOptions::new(500_000, 480, 100);
/// let events = decode(&[Embedding::silence(200.0), Embedding::note(60, 500.0)], &options).unwrap();
/// assert_eq!(events, vec![
///     TimedEvent::note_on(192, 60, 100),
///     TimedEvent::note_off(480, 60, 100),
///     TimedEvent::end_of_track(0),
/// ]);
/// ```
pub fn decode(embeddings: &[Embedding], options: &DecodeOptions) -> Result<Track> {
    options.validate()?;

    let mut events = Vec::with_capacity(embeddings.len() * 2 + 1);
    let mut carry: u32 = 0;

    for embedding in embeddings {
        let ticks = options.slot_ticks(embedding)?;
        match embedding.top_note()? {
            Some(note) => {
                events.push(TimedEvent::note_on(carry, note, options.velocity));
                events.push(TimedEvent::note_off(ticks, note, options.velocity));
                carry = 0;
            }
            None => carry = carry.saturating_add(ticks),
        }
    }
    events.push(TimedEvent::end_of_track(carry));

    debug!(
        "decoded {} embeddings into {} events",
        embeddings.len(),
        events.len()
    );
    Ok(events)
}

/// [`decode`] preceded by the SetTempo event a MIDI writer needs
pub fn decode_track(embeddings: &[Embedding], options: &DecodeOptions) -> Result<Track> {
    let events = decode(embeddings, options)?;
    let mut track = Vec::with_capacity(events.len() + 1);
    track.push(TimedEvent::set_tempo(0, options.tempo)?);
    track.extend(events);
    Ok(track)
}
