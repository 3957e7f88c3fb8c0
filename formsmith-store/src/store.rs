//! FormStore — file-backed persistence for saved forms.
//!
//! All saved forms live in a single `saved_forms.json` array under the store
//! root, read in full on every operation and rewritten atomically. The file
//! is the source of truth; the store holds no in-memory copy.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use ulid::Ulid;

use crate::error::Result;
use crate::types::{FormRecord, FormSummary};

const SAVED_FORMS_FILE: &str = "saved_forms.json";

/// Handle on a saved-forms directory.
pub struct FormStore {
    path: PathBuf,
}

impl FormStore {
    /// Open a store rooted at `root`, creating the directory if missing.
    /// The saved-forms file itself is created lazily on first save.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        let path = root.join(SAVED_FORMS_FILE);
        debug!(path = %path.display(), "form store opened");
        Ok(FormStore { path })
    }

    /// Load every saved form, in save order. A missing file is an empty
    /// store, not an error.
    pub async fn load_all(&self) -> Result<Vec<FormRecord>> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the entire store contents.
    pub async fn save_all(&self, records: &[FormRecord]) -> Result<()> {
        let json = serde_json::to_vec_pretty(records)?;
        atomic_write(&self.path, &json).await?;
        debug!(records = records.len(), "saved forms written");
        Ok(())
    }

    /// Append one record and return its index.
    pub async fn append(&self, record: FormRecord) -> Result<usize> {
        let mut records = self.load_all().await?;
        records.push(record);
        self.save_all(&records).await?;
        Ok(records.len() - 1)
    }

    /// Load the record at `index`, or `None` past the end.
    pub async fn load_at(&self, index: usize) -> Result<Option<FormRecord>> {
        let mut records = self.load_all().await?;
        if index < records.len() {
            Ok(Some(records.swap_remove(index)))
        } else {
            Ok(None)
        }
    }

    /// Remove the record at `index`, returning it, or `None` past the end.
    pub async fn remove_at(&self, index: usize) -> Result<Option<FormRecord>> {
        let mut records = self.load_all().await?;
        if index >= records.len() {
            return Ok(None);
        }
        let removed = records.remove(index);
        self.save_all(&records).await?;
        Ok(Some(removed))
    }

    /// Listing rows for every saved form, in save order.
    pub async fn summaries(&self) -> Result<Vec<FormSummary>> {
        let records = self.load_all().await?;
        Ok(records.iter().map(FormSummary::from).collect())
    }
}

/// Write to a temp file then rename for atomic persistence.
async fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent dir"))?;
    let tmp = dir.join(format!(".tmp_{}", Ulid::new()));
    fs::write(&tmp, data).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
