//! Records produced by an embedding run.

use serde::{Deserialize, Serialize};

/// One stored embedding, as written by the JSONL sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedFile {
    /// Stable identifier of the source file (its download URL).
    pub id: String,
    pub namespace: String,
    pub dimension: usize,
    pub embedding: Vec<f32>,
}

/// A file that was left out of the run under the skip policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub id: String,
    pub reason: String,
}

/// Summary of one embedding run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmbedReport {
    /// Entries in the input listing.
    pub listed: usize,
    /// Embeddings handed to the sink.
    pub embedded: usize,
    pub skipped: Vec<SkippedFile>,
    /// Vector size observed in this run (`None` when nothing was embedded).
    pub dimension: Option<usize>,
}

impl EmbedReport {
    pub fn new(listed: usize) -> Self {
        Self {
            listed,
            ..Self::default()
        }
    }

    /// True when every listed file was embedded.
    pub fn is_complete(&self) -> bool {
        self.embedded == self.listed
    }
}
