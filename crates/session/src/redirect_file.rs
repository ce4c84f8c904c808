//! File-backed redirect memory
//!
//! Persists the pre-login location as a small JSON document
//! (`{"redirectUrl": "/path"}`) so a later process can send the user back
//! after they log in again. Writes use atomic temp-file + rename, and a tokio
//! Mutex serializes concurrent writers within the process.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::navigator::RedirectMemory;

#[derive(Debug, Serialize, Deserialize)]
struct RedirectRecord {
    #[serde(rename = "redirectUrl")]
    redirect_url: String,
}

/// Redirect memory stored in a JSON file.
pub struct FileRedirectMemory {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileRedirectMemory {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored location, if any.
    ///
    /// A missing file means nothing was stored and yields `Ok(None)`.
    pub async fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::Io(format!("reading redirect file: {e}")))?;
        let record: RedirectRecord = serde_json::from_str(&contents)
            .map_err(|e| Error::Parse(format!("parsing redirect file: {e}")))?;
        Ok(Some(record.redirect_url))
    }

    async fn write(&self, redirect_url: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let record = RedirectRecord {
            redirect_url: redirect_url.to_string(),
        };
        write_atomic(&self.path, &record).await
    }
}

impl RedirectMemory for FileRedirectMemory {
    fn store<'a>(&'a self, path: &'a str) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(self.write(path))
    }
}

/// Write the record to a temp file in the same directory, then rename it over
/// the target.
async fn write_atomic(path: &Path, record: &RedirectRecord) -> Result<()> {
    let json = serde_json::to_string(record)
        .map_err(|e| Error::Parse(format!("serializing redirect record: {e}")))?;

    let tmp_path = temp_path(path)?;

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp redirect file: {e}")))?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp redirect file: {e}")))?;

    debug!(path = %path.display(), "persisted redirect target");
    Ok(())
}

/// Sibling temp path, unique per target file and process.
fn temp_path(path: &Path) -> Result<PathBuf> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("redirect path has no parent directory".into()))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Io("redirect path has no file name".into()))?;
    Ok(dir.join(format!(
        ".{}.tmp.{}",
        file_name.to_string_lossy(),
        std::process::id()
    )))
}
