//! Flat on-disk file store
//!
//! The upload directory is a key-value store: key = filename, value =
//! file bytes. Uploads are written to a staging directory first and renamed
//! into place only once complete, so a failed upload never touches the
//! stored file. There is no locking; concurrent writers to the same key race
//! and the last completed rename wins.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::filename;
use crate::errors::Error;
use crate::logger;

/// Staging directory inside the root. Reserved: never a valid key.
const STAGING_DIR: &str = ".incoming";

/// Per-process sequence for staging file names
static STAGE_SEQ: AtomicU64 = AtomicU64::new(0);

/// File loaded from the store
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub content: Vec<u8>,
    pub modified: Option<SystemTime>,
}

/// Handle to the upload directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open the store rooted at `root`, creating the directory if needed.
    /// Staging leftovers from an interrupted run are removed.
    pub async fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;

        let staging = root.join(STAGING_DIR);
        match fs::remove_dir_all(&staging).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        fs::create_dir_all(&staging).await?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a storage key to its path inside the root
    pub fn path_for(&self, name: &str) -> Result<PathBuf, Error> {
        let name = filename::validate(name)?;
        if name == STAGING_DIR {
            return Err(Error::InvalidFilename {
                name: name.to_string(),
            });
        }
        Ok(self.root.join(name))
    }

    /// Start an upload for `name`. Nothing is visible under `name` until
    /// [`StagedUpload::commit`] succeeds.
    pub async fn stage(&self, name: &str) -> Result<StagedUpload, Error> {
        let target = self.path_for(name)?;
        let seq = STAGE_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = self
            .root
            .join(STAGING_DIR)
            .join(format!("{}-{seq}.part", std::process::id()));
        let file = fs::File::create(&path).await?;

        Ok(StagedUpload {
            file,
            path,
            target,
            written: 0,
        })
    }

    /// Write `content` under `name`, replacing any previous content
    #[cfg(test)]
    pub async fn write(&self, name: &str, content: &[u8]) -> Result<(), Error> {
        let path = self.path_for(name)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Names of the regular files directly under the root, in directory order
    pub async fn list(&self) -> Result<Vec<String>, Error> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            // file_type() does not follow symlinks
            if !entry.file_type().await?.is_file() {
                continue;
            }
            // Non UTF-8 names cannot be requested over HTTP anyway
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }

        Ok(names)
    }

    /// Load the whole file stored under `name`
    pub async fn read(&self, name: &str) -> Result<StoredFile, Error> {
        // Invalid keys can never have been stored
        let path = self.path_for(name).map_err(|_| Error::FileNotFound)?;

        let metadata = match fs::metadata(&path).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Err(Error::FileNotFound),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Error::FileNotFound),
            Err(e) => return Err(e.into()),
        };

        let content = match fs::read(&path).await {
            Ok(c) => c,
            // Removed between the existence check and the read
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Error::FileNotFound),
            Err(e) => return Err(e.into()),
        };

        Ok(StoredFile {
            name: name.to_string(),
            content,
            modified: metadata.modified().ok(),
        })
    }
}

/// An upload being written to the staging directory
#[derive(Debug)]
pub struct StagedUpload {
    file: fs::File,
    path: PathBuf,
    target: PathBuf,
    written: u64,
}

impl StagedUpload {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), Error> {
        self.file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Bytes written so far
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Flush and move the staged file over the target, returning its size
    pub async fn commit(mut self) -> Result<u64, Error> {
        if let Err(e) = self.file.flush().await {
            self.discard().await;
            return Err(e.into());
        }
        let Self {
            file,
            path,
            target,
            written,
        } = self;
        drop(file);

        if let Err(e) = fs::rename(&path, &target).await {
            remove_staged(&path).await;
            return Err(e.into());
        }
        Ok(written)
    }

    /// Drop the staged file, leaving any stored file untouched
    pub async fn discard(self) {
        let Self { file, path, .. } = self;
        drop(file);
        remove_staged(&path).await;
    }
}

async fn remove_staged(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        logger::log_warning(&format!(
            "Failed to remove staged upload {}: {e}",
            path.display()
        ));
    }
}
