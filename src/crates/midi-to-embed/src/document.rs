//! JSON storage for embedding sequences
//!
//! A document records where the embeddings came from alongside the vectors:
//!
//! ```json
//! { "source": "song.mid", "resolution": 480, "embeddings": [[0.0, ..., 500.0]] }
//! ```
//!
//! Loading also accepts a bare array of vectors, which is what a model
//! usually produces.

use melody_core::Embedding;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Ticks per quarter note of the source file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<u16>,
    pub embeddings: Vec<Embedding>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentOrBare {
    Document(EmbeddingDocument),
    Bare(Vec<Embedding>),
}

impl EmbeddingDocument {
    pub fn new(embeddings: Vec<Embedding>) -> Self {
        EmbeddingDocument {
            source: None,
            resolution: None,
            embeddings,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>, resolution: u16) -> Self {
        self.source = Some(source.into());
        self.resolution = Some(resolution);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: DocumentOrBare = serde_json::from_str(json)?;
        Ok(match parsed {
            DocumentOrBare::Document(document) => document,
            DocumentOrBare::Bare(embeddings) => EmbeddingDocument::new(embeddings),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, format!("{}\n", self.to_json()?)).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Embeddings for every file of a corpus
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusDocument {
    pub files: Vec<EmbeddingDocument>,
}

impl CorpusDocument {
    pub fn embedding_count(&self) -> usize {
        self.files.iter().map(|f| f.embeddings.len()).sum()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use melody_core::EMBEDDING_WIDTH;

    #[test]
    fn test_document_json() {
        let document = EmbeddingDocument::new(vec![Embedding::note(60, 500.0)]).with_source("a.mid", 480);
        let json = document.to_json().unwrap();
        assert!(json.contains("\"source\": \"a.mid\""));
        assert_eq!(EmbeddingDocument::from_json(&json).unwrap(), document);
    }

    #[test]
    fn test_bare_array() {
        let mut values = vec![0.0; EMBEDDING_WIDTH];
        values[39] = 1.0;
        values[EMBEDDING_WIDTH - 1] = 125.0;
        let json = serde_json::to_string(&vec![values]).unwrap();

        let document = EmbeddingDocument::from_json(&json).unwrap();
        assert_eq!(document.source, None);
        assert_eq!(document.embeddings, vec![Embedding::note(60, 125.0)]);
    }

    #[test]
    fn test_wrong_width_rejected() {
        assert!(matches!(
            EmbeddingDocument::from_json("[[1.0, 0.0, 3.0]]"),
            Err(Error::Json(_))
        ));
        assert!(EmbeddingDocument::from_json(r#"{"embeddings": [[1.0]]}"#).is_err());
    }

    #[test]
    fn test_corpus_count() {
        let corpus = CorpusDocument {
            files: vec![
                EmbeddingDocument::new(vec![Embedding::silence(1.0); 3]),
                EmbeddingDocument::new(vec![Embedding::silence(1.0); 2]),
            ],
        };
        assert_eq!(corpus.embedding_count(), 5);
    }
}
