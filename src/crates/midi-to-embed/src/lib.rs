//! MIDI to embedding converter library
//!
//! This library reads Standard MIDI Files into the event model of
//! `melody-core`, writes decoded tracks back out as single-track MIDI files,
//! and stores embedding sequences as JSON.

pub mod document;
pub mod files;
pub mod logging;
pub mod midi;
pub mod note;

// Re-export main types for convenience
pub use document::{CorpusDocument, EmbeddingDocument};
pub use files::{find_files, multi_track_files};
pub use midi::{save_track, write_track, MidiData};

use std::path::PathBuf;

use melody_core::CodecError;

/// Errors from reading, writing or converting MIDI and embedding files
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse MIDI data: {0}")]
    Parse(#[from] midly::Error),

    #[error("Unsupported timing: SMPTE timecode at {fps} fps has no ticks per quarter note")]
    TimecodeTiming { fps: u8 },

    #[error("Value out of MIDI range: {what} = {value}")]
    OutOfRange { what: &'static str, value: u32 },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_passes_through() {
        let err: Error = CodecError::UnsupportedFormat { tracks: 2 }.into();
        assert!(matches!(err, Error::Codec(CodecError::UnsupportedFormat { tracks: 2 })));
        assert_eq!(err.to_string(), "Unsupported format: expected exactly one track, found 2");
    }
}
