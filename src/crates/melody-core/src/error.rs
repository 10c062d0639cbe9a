use std::fmt;

pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors raised by the codec.
///
/// Every variant is detected before any output is produced for the
/// offending call. Scan termination on an unsupported meter or an
/// end-of-track marker is normal control flow and is reported through
/// [`crate::ScanStop`] instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("Invalid resolution: ticks per quarter note must be positive")]
    InvalidResolution,

    #[error("Invalid tempo: {0} microseconds per beat")]
    InvalidTempo(u32),

    #[error("Unsupported format: expected exactly one track, found {tracks}")]
    UnsupportedFormat { tracks: usize },

    #[error("Invalid embedding: {0}")]
    InvalidEmbedding(EmbeddingFault),
}

/// Why an embedding was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingFault {
    /// Vector length is neither the pitch-only nor the pitch+duration width.
    Length(usize),
    /// More than one pitch slot is non-zero.
    MultiplePitches(Vec<usize>),
    /// Duration slot is negative, NaN or infinite.
    Duration(f64),
}

impl fmt::Display for EmbeddingFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingFault::Length(len) => write!(
                f,
                "length {} (expected {} or {})",
                len,
                crate::PITCH_WIDTH,
                crate::EMBEDDING_WIDTH
            ),
            EmbeddingFault::MultiplePitches(indices) => {
                write!(f, "{} pitch slots set at {:?}", indices.len(), indices)
            }
            EmbeddingFault::Duration(ms) => write!(f, "duration {} ms", ms),
        }
    }
}

impl CodecError {
    pub fn invalid_length(len: usize) -> Self {
        CodecError::InvalidEmbedding(EmbeddingFault::Length(len))
    }

    pub fn multiple_pitches(indices: Vec<usize>) -> Self {
        CodecError::InvalidEmbedding(EmbeddingFault::MultiplePitches(indices))
    }

    pub fn invalid_duration(ms: f64) -> Self {
        CodecError::InvalidEmbedding(EmbeddingFault::Duration(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CodecError::UnsupportedFormat { tracks: 3 }.to_string(),
            "Unsupported format: expected exactly one track, found 3"
        );
        assert_eq!(
            CodecError::invalid_length(12).to_string(),
            "Invalid embedding: length 12 (expected 87 or 88)"
        );
        assert_eq!(
            CodecError::multiple_pitches(vec![2, 40]).to_string(),
            "Invalid embedding: 2 pitch slots set at [2, 40]"
        );
    }
}
