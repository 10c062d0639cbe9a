// Corpus iteration over a directory of MIDI files
// Files are discovered once, optionally shuffled, and converted lazily one at a time

use anyhow::Result;
use log::{debug, warn};
use melody_core::{CodecError, Embedding, Track};
use midi_to_embed::{find_files, multi_track_files, CorpusDocument, EmbeddingDocument, MidiData};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::{Path, PathBuf};

/// The MIDI files found under a directory
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl Corpus {
    /// Discover every MIDI file under `dir`
    pub fn open(dir: &Path) -> Result<Self> {
        let files = find_files(dir)?;
        if files.is_empty() {
            anyhow::bail!("Invalid path to MIDI corpus: no MIDI files under {}", dir.display());
        }
        debug!("found {} MIDI files under {}", files.len(), dir.display());

        Ok(Corpus {
            root: dir.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Randomise the order files are visited in
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.files.shuffle(rng);
    }

    /// Embeddings of each file, in corpus order
    pub fn embeddings(&self) -> impl Iterator<Item = (&Path, midi_to_embed::Result<Vec<Embedding>>)> + '_ {
        self.files.iter().map(|path| {
            let result = MidiData::from_file(path)
                .and_then(|midi| midi.encode())
                .map(|encoded| encoded.embeddings);
            (path.as_path(), result)
        })
    }

    /// Resolution and raw events of the first track of each file
    pub fn events(&self) -> impl Iterator<Item = (&Path, midi_to_embed::Result<(u16, Track)>)> + '_ {
        self.files.iter().map(|path| {
            let result = MidiData::from_file(path).and_then(|midi| {
                midi.first_track()
                    .map(|(resolution, track)| (resolution, track.clone()))
                    .ok_or_else(|| CodecError::UnsupportedFormat { tracks: 0 }.into())
            });
            (path.as_path(), result)
        })
    }

    /// Files that are not single-track, with their track counts
    pub fn multi_track_files(&self) -> Vec<(PathBuf, usize)> {
        multi_track_files(&self.files)
    }

    /// Encode every file, skipping (and logging) those that fail
    pub fn encode_all(&self) -> CorpusDocument {
        let mut document = CorpusDocument::default();

        for path in &self.files {
            let midi = match MidiData::from_file(path) {
                Ok(midi) => midi,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            match midi.encode() {
                Ok(encoded) => document.files.push(
                    EmbeddingDocument::new(encoded.embeddings)
                        .with_source(path.display().to_string(), midi.resolution()),
                ),
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use melody_core::TimedEvent;
    use midi_to_embed::write_track;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;

    fn corpus_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("melody-embed-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("sub")).unwrap();

        let song = vec![
            TimedEvent::note_on(0, 60, 100),
            TimedEvent::note_off(480, 60, 0),
            TimedEvent::end_of_track(0),
        ];
        fs::write(dir.join("one.mid"), write_track(&song, 480).unwrap()).unwrap();
        fs::write(dir.join("sub/two.mid"), write_track(&song, 960).unwrap()).unwrap();
        fs::write(dir.join("sub/broken.mid"), b"MThd").unwrap();
        dir
    }

    #[test]
    fn test_open_empty_dir_fails() {
        let dir = std::env::temp_dir().join(format!("melody-embed-empty-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        assert!(Corpus::open(&dir).is_err());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_encode_all_skips_broken() {
        let dir = corpus_dir("encode");
        let corpus = Corpus::open(&dir).unwrap();
        assert_eq!(corpus.len(), 3);

        let document = corpus.encode_all();
        assert_eq!(document.files.len(), 2);
        assert_eq!(document.embedding_count(), 2);
        assert!(corpus.multi_track_files().is_empty());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_iterators() {
        let dir = corpus_dir("iter");
        let corpus = Corpus::open(&dir).unwrap();

        let embeddings: Vec<_> = corpus.embeddings().collect();
        assert_eq!(embeddings.iter().filter(|(_, r)| r.is_ok()).count(), 2);

        let resolutions: Vec<u16> = corpus
            .events()
            .filter_map(|(_, r)| r.ok())
            .map(|(resolution, _)| resolution)
            .collect();
        assert_eq!(resolutions.len(), 2);
        assert!(resolutions.contains(&480) && resolutions.contains(&960));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_shuffle_keeps_files() {
        let dir = corpus_dir("shuffle");
        let mut corpus = Corpus::open(&dir).unwrap();
        let mut before = corpus.files().to_vec();
        corpus.shuffle(&mut StdRng::seed_from_u64(7));
        let mut after = corpus.files().to_vec();
        before.sort();
        after.sort();
        assert_eq!(before, after);

        fs::remove_dir_all(&dir).unwrap();
    }
}
