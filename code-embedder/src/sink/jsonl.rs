//! JSON Lines sink: one [`EmbeddedFile`] object per line.
//!
//! Rows are written to a hidden sibling temp file and renamed over the
//! target on flush, so an aborted run never leaves a partial output behind.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::embed::EmbedFuture;
use crate::errors::EmbedError;
use crate::record::EmbeddedFile;
use crate::sink::EmbeddingSink;

pub struct JsonlSink {
    path: PathBuf,
    tmp: PathBuf,
    state: Mutex<Option<Writer>>,
}

struct Writer {
    out: BufWriter<File>,
    rows: usize,
}

impl JsonlSink {
    /// Opens a sink that will produce `path` once flushed.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, EmbedError> {
        let path = path.as_ref().to_path_buf();
        let name = path.file_name().ok_or_else(|| {
            EmbedError::Config(format!("output path '{}' has no file name", path.display()))
        })?;
        let mut tmp_name = OsString::from(".");
        tmp_name.push(name);
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);

        debug!("Opening JSONL sink {}", tmp.display());
        let out = BufWriter::new(File::create(&tmp)?);

        Ok(Self {
            path,
            tmp,
            state: Mutex::new(Some(Writer { out, rows: 0 })),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_row(&self, id: &str, embedding: &[f32], namespace: &str) -> Result<(), EmbedError> {
        let row = EmbeddedFile {
            id: id.to_string(),
            namespace: namespace.to_string(),
            dimension: embedding.len(),
            embedding: embedding.to_vec(),
        };
        let line = serde_json::to_string(&row)?;

        let mut guard = self
            .state
            .lock()
            .map_err(|_| EmbedError::Sink("jsonl sink lock poisoned".into()))?;
        let w = guard
            .as_mut()
            .ok_or_else(|| EmbedError::Sink("jsonl sink already flushed".into()))?;
        w.out.write_all(line.as_bytes())?;
        w.out.write_all(b"\n")?;
        w.rows += 1;
        Ok(())
    }

    fn finish(&self) -> Result<(), EmbedError> {
        let taken = self
            .state
            .lock()
            .map_err(|_| EmbedError::Sink("jsonl sink lock poisoned".into()))?
            .take();
        let Some(mut w) = taken else {
            return Ok(());
        };

        w.out.flush()?;
        w.out.get_ref().sync_all()?;
        fs::rename(&self.tmp, &self.path)?;

        info!(path = %self.path.display(), rows = w.rows, "embeddings written");
        Ok(())
    }
}

impl EmbeddingSink for JsonlSink {
    fn store<'a>(
        &'a self,
        id: &'a str,
        embedding: &'a [f32],
        namespace: &'a str,
    ) -> EmbedFuture<'a, ()> {
        Box::pin(std::future::ready(self.write_row(id, embedding, namespace)))
    }

    fn flush(&self) -> EmbedFuture<'_, ()> {
        Box::pin(std::future::ready(self.finish()))
    }
}

impl Drop for JsonlSink {
    fn drop(&mut self) {
        // Never flushed: discard the partial temp file.
        if matches!(self.state.get_mut(), Ok(Some(_))) {
            let _ = fs::remove_file(&self.tmp);
        }
    }
}
