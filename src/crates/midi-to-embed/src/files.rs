use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::midi::MidiData;
use crate::Result;

/// Whether `path` has a `.mid` or `.midi` extension (any case)
pub fn is_midi_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("mid") || ext.eq_ignore_ascii_case("midi"))
        .unwrap_or(false)
}

/// Recursively find all MIDI files under `dir`, sorted by path
pub fn find_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file() && is_midi_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Files among `files` that do not hold exactly one track, with their track count
///
/// Files that fail to parse are logged and left out.
pub fn multi_track_files(files: &[PathBuf]) -> Vec<(PathBuf, usize)> {
    let mut found = Vec::new();

    for path in files {
        match MidiData::from_file(path) {
            Ok(midi) if midi.track_count() != 1 => found.push((path.clone(), midi.track_count())),
            Ok(_) => {}
            Err(e) => warn!("{}", e),
        }
    }

    found
}
