//! Monophonic MIDI event stream to embedding codec
//!
//! This crate converts the events of a single MIDI track into a sequence of
//! fixed-width embeddings suitable for model training, and converts embedding
//! sequences back into a playable track.
//!
//! # Examples
//!
//! ```
//! use melody_core::{decode, encode, DecodeOptions, MidiSource, TimedEvent};
//!
//! let track = vec![
//!     TimedEvent::note_on(0, 60, 90),
//!     TimedEvent::note_off(480, 60, 0),
//!     TimedEvent::end_of_track(0),
//! ];
//! let embeddings = encode(&MidiSource::single(480, track)).unwrap();
//! assert_eq!(embeddings.len(), 1);
//! assert_eq!(embeddings[0].duration_ms(), Some(500.0));
//!
//! let events = decode(&embeddings, &DecodeOptions::new(500_000, 480, 100)).unwrap();
//! assert_eq!(events[1], TimedEvent::note_off(480, 60, 100));
//! ```
//!
//! # Main Components
//!
//! - **timing**: tick/millisecond conversion
//! - **encoder**: tempo and note-state tracking over a track
//! - **embedding**: the embedding vector and the sounding-note set
//! - **decoder**: embeddings back to NoteOn/NoteOff events

pub mod decoder;
pub mod embedding;
pub mod encoder;
pub mod error;
pub mod event;
pub mod timing;

pub use decoder::{decode, decode_track, DecodeOptions, DEFAULT_VELOCITY};
pub use embedding::{pitch_slot, Embedding, NoteState, EMBEDDING_WIDTH, MAX_NOTE, MIN_NOTE, PITCH_WIDTH};
pub use encoder::{encode, encode_source, encode_track, Encoded, ScanState, ScanStop};
pub use error::{CodecError, EmbeddingFault, Result};
pub use event::{EventKind, MidiSource, TimedEvent, Track};
pub use timing::DEFAULT_TEMPO;

#[cfg(test)]
mod tests {
    use super::*;

    fn notes_of(track: &[TimedEvent]) -> Vec<(u32, EventKind)> {
        track
            .iter()
            .filter(|e| matches!(e.kind, EventKind::NoteOn { .. } | EventKind::NoteOff { .. }))
            .map(|e| (e.delta, e.kind))
            .collect()
    }

    #[test]
    fn test_two_note_roundtrip() {
        let original = vec![
            TimedEvent::note_on(0, 57, 100),
            TimedEvent::note_off(480, 57, 100),
            TimedEvent::note_on(0, 69, 100),
            TimedEvent::note_off(480, 69, 100),
            TimedEvent::end_of_track(0),
        ];
        let embeddings = encode(&MidiSource::single(480, original.clone())).unwrap();
        assert_eq!(embeddings.iter().map(|e| e.duration_ms()).collect::<Vec<_>>(), vec![Some(500.0); 2]);

        let decoded = decode(&embeddings, &DecodeOptions::new(DEFAULT_TEMPO, 480, 100)).unwrap();
        let expected = notes_of(&original);
        let actual = notes_of(&decoded);
        assert_eq!(actual.len(), expected.len());
        for ((d_exp, k_exp), (d_act, k_act)) in expected.iter().zip(actual.iter()) {
            assert_eq!(k_exp, k_act);
            assert!(d_exp.abs_diff(*d_act) <= 1);
        }
    }

    #[test]
    fn test_roundtrip_keeps_rests() {
        let original = vec![
            TimedEvent::note_on(960, 60, 100),
            TimedEvent::note_off(240, 60, 100),
            TimedEvent::note_on(120, 62, 100),
            TimedEvent::note_off(240, 62, 100),
        ];
        let embeddings = encode(&MidiSource::single(480, original.clone())).unwrap();
        let decoded = decode(&embeddings, &DecodeOptions::new(DEFAULT_TEMPO, 480, 100)).unwrap();
        assert_eq!(notes_of(&decoded), notes_of(&original));
    }
}
