use serde::{Deserialize, Serialize};

use crate::timing::{tempo_from_bytes, tempo_to_bytes};
use crate::Result;

/// The kinds of track event the codec distinguishes
///
/// Readers tag every event when parsing; anything the codec has no use for
/// becomes [`EventKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8, velocity: u8 },
    /// Raw big-endian microseconds per quarter note
    SetTempo { bytes: [u8; 3] },
    TimeSignature { numerator: u8 },
    EndOfTrack,
    Other,
}

impl EventKind {
    /// SetTempo event carrying `tempo` microseconds per beat
    pub fn set_tempo(tempo: u32) -> Result<Self> {
        Ok(EventKind::SetTempo {
            bytes: tempo_to_bytes(tempo)?,
        })
    }

    /// Tempo value of a SetTempo event
    pub fn tempo(&self) -> Option<u32> {
        match self {
            EventKind::SetTempo { bytes } => Some(tempo_from_bytes(*bytes)),
            _ => None,
        }
    }
}

/// An event with the number of ticks elapsed since the previous event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimedEvent {
    pub delta: u32,
    pub kind: EventKind,
}

impl TimedEvent {
    pub fn new(delta: u32, kind: EventKind) -> Self {
        TimedEvent { delta, kind }
    }

    pub fn note_on(delta: u32, note: u8, velocity: u8) -> Self {
        TimedEvent::new(delta, EventKind::NoteOn { note, velocity })
    }

    pub fn note_off(delta: u32, note: u8, velocity: u8) -> Self {
        TimedEvent::new(delta, EventKind::NoteOff { note, velocity })
    }

    pub fn set_tempo(delta: u32, tempo: u32) -> Result<Self> {
        Ok(TimedEvent::new(delta, EventKind::set_tempo(tempo)?))
    }

    pub fn time_signature(delta: u32, numerator: u8) -> Self {
        TimedEvent::new(delta, EventKind::TimeSignature { numerator })
    }

    pub fn end_of_track(delta: u32) -> Self {
        TimedEvent::new(delta, EventKind::EndOfTrack)
    }
}

pub type Track = Vec<TimedEvent>;

/// Everything the codec needs from a parsed MIDI file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MidiSource {
    /// Ticks per quarter note
    pub resolution: u16,
    pub tracks: Vec<Track>,
}

impl MidiSource {
    pub fn new(resolution: u16, tracks: Vec<Track>) -> Self {
        MidiSource { resolution, tracks }
    }

    /// A source holding exactly one track
    pub fn single(resolution: u16, track: Track) -> Self {
        MidiSource {
            resolution,
            tracks: vec![track],
        }
    }

    pub fn is_single_track(&self) -> bool {
        self.tracks.len() == 1
    }
}
