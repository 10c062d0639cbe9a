// Corpus-level tooling for the melody embedding codec
// Re-exports the codec and file crates so tools only need this library

pub mod corpus;

pub use corpus::Corpus;
pub use melody_core as codec;
pub use midi_to_embed as midi;
