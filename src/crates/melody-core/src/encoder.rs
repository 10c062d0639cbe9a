//! Forward pass: track events to embeddings
//!
//! The scan keeps a running note set and tempo in a [`ScanState`] owned by the
//! call. Every note or tempo event that advances time emits one embedding
//! describing the moment that just ended, before the event itself is applied.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::embedding::{Embedding, NoteState};
use crate::event::{EventKind, MidiSource, TimedEvent};
use crate::timing::{tempo_from_bytes, ticks_to_ms, DEFAULT_TEMPO};
use crate::{CodecError, Result};

/// Why a scan stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStop {
    /// Every event was consumed
    Exhausted,
    /// An EndOfTrack event was reached
    EndOfTrack,
    /// A time signature other than 2 or 4 beats per bar was reached
    UnsupportedMeter { numerator: u8 },
}

/// Result of encoding one track
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub embeddings: Vec<Embedding>,
    pub stop: ScanStop,
    /// Absolute tick position where the scan stopped
    pub ticks: u64,
}

/// Mutable state threaded through one scan
#[derive(Debug, Clone)]
pub struct ScanState {
    pub notes: NoteState,
    /// Microseconds per quarter note
    pub tempo: u32,
    pub ticks: u64,
    ppqn: u16,
}

impl ScanState {
    pub fn new(ppqn: u16) -> Result<Self> {
        if ppqn == 0 {
            return Err(CodecError::InvalidResolution);
        }
        Ok(ScanState {
            notes: NoteState::new(),
            tempo: DEFAULT_TEMPO,
            ticks: 0,
            ppqn,
        })
    }

    /// Embedding for the moment ending `delta` ticks from now, at the
    /// current tempo
    fn emit(&self, delta: u32) -> Result<Embedding> {
        let ms = ticks_to_ms(delta, self.tempo, self.ppqn)?;
        Ok(Embedding::encode(&self.notes, ms))
    }

    /// Apply one event, pushing any emitted embedding onto `out`
    ///
    /// Returns `Some` when the scan must stop at this event.
    pub fn step(&mut self, event: &TimedEvent, out: &mut Vec<Embedding>) -> Result<Option<ScanStop>> {
        let delta = event.delta;
        self.ticks += delta as u64;

        match event.kind {
            EventKind::NoteOn { note, .. } => {
                if delta > 0 {
                    out.push(self.emit(delta)?);
                }
                self.notes.press(note);
            }
            EventKind::NoteOff { note, .. } => {
                if delta > 0 {
                    out.push(self.emit(delta)?);
                }
                if !self.notes.release(note) {
                    trace!("note off for {} which was not sounding", note);
                }
            }
            EventKind::SetTempo { bytes } => {
                if delta > 0 {
                    out.push(self.emit(delta)?);
                }
                self.tempo = tempo_from_bytes(bytes);
                trace!("tempo {} at tick {}", self.tempo, self.ticks);
            }
            EventKind::TimeSignature { numerator } => {
                if !matches!(numerator, 2 | 4) {
                    return Ok(Some(ScanStop::UnsupportedMeter { numerator }));
                }
            }
            EventKind::EndOfTrack => return Ok(Some(ScanStop::EndOfTrack)),
            EventKind::Other => {}
        }

        Ok(None)
    }
}

/// Encode the sole track of `source`
///
/// Fails with [`CodecError::UnsupportedFormat`] unless the source holds
/// exactly one track; nothing is scanned in that case.
pub fn encode_source(source: &MidiSource) -> Result<Encoded> {
    match source.tracks.as_slice() {
        [track] => encode_track(track, source.resolution),
        tracks => Err(CodecError::UnsupportedFormat {
            tracks: tracks.len(),
        }),
    }
}

/// Encode a single track at `ppqn` ticks per quarter note
pub fn encode_track(track: &[TimedEvent], ppqn: u16) -> Result<Encoded> {
    let mut state = ScanState::new(ppqn)?;
    let mut embeddings = Vec::new();
    let mut stop = ScanStop::Exhausted;

    for event in track {
        if let Some(reason) = state.step(event, &mut embeddings)? {
            stop = reason;
            break;
        }
    }

    if let ScanStop::UnsupportedMeter { numerator } = stop {
        warn!(
            "stopped at tick {} on unsupported time signature {}/x",
            state.ticks, numerator
        );
    }
    debug!(
        "encoded {} events into {} embeddings ({:?})",
        track.len(),
        embeddings.len(),
        stop
    );

    Ok(Encoded {
        embeddings,
        stop,
        ticks: state.ticks,
    })
}

/// Embeddings of the sole track of `source`
pub fn encode(source: &MidiSource) -> Result<Vec<Embedding>> {
    Ok(encode_source(source)?.embeddings)
}
