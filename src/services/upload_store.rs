use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

/// Record of an input file that has been committed to its upload slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredInput {
    pub user: String,
    pub path: PathBuf,
    pub size: u64,
    pub sha256: String,
}

/// Per-user upload slots on the local filesystem:
/// `<root>/<user>/<file_name>`, one live file per user.
#[derive(Debug, Clone)]
pub struct LocalUploadStore {
    root: PathBuf,
    file_name: String,
}

impl LocalUploadStore {
    pub fn new(root: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            file_name: file_name.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn user_dir(&self, user: &str) -> PathBuf {
        self.root.join(user)
    }

    pub fn input_path(&self, user: &str) -> PathBuf {
        self.user_dir(user).join(&self.file_name)
    }

    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create upload root {}", self.root.display()))
    }

    /// True when a file can actually be created in the upload root. The
    /// probe file is removed again when it goes out of scope.
    pub async fn is_writable(&self) -> bool {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(".probe-")
                .tempfile_in(&root)
                .is_ok()
        })
        .await
        .unwrap_or(false)
    }

    /// Opens a temporary file next to the user's upload slot. Nothing becomes
    /// visible at the slot path until [`StagedInput::commit`]; dropping the
    /// staged input removes the temporary file.
    pub async fn stage_input(&self, user: &str) -> Result<StagedInput> {
        let dir = self.user_dir(user);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create user folder {}", dir.display()))?;

        let temp = tempfile::Builder::new()
            .prefix(".input-")
            .suffix(".part")
            .tempfile_in(&dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        let file = tokio::fs::File::from_std(
            temp.reopen()
                .context("Failed to reopen staged upload for writing")?,
        );

        Ok(StagedInput {
            temp,
            file,
            hasher: Sha256::new(),
            size: 0,
            user: user.to_string(),
            target: dir.join(&self.file_name),
        })
    }

    /// Writes a complete buffer into the user's slot.
    pub async fn save_input(&self, user: &str, data: &[u8]) -> Result<StoredInput> {
        let mut staged = self.stage_input(user).await?;
        staged.write_chunk(data).await?;
        staged.commit().await
    }
}

/// An upload being written to a temporary file in the destination folder.
pub struct StagedInput {
    temp: NamedTempFile,
    file: tokio::fs::File,
    hasher: Sha256,
    size: u64,
    user: String,
    target: PathBuf,
}

impl StagedInput {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.hasher.update(chunk);
        self.file
            .write_all(chunk)
            .await
            .context("Failed to write upload chunk")?;
        self.size += chunk.len() as u64;
        Ok(())
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Flushes the staged bytes to disk and renames them over the slot path.
    /// The rename is atomic within one filesystem, so readers observe either
    /// the previous file or this one in full.
    pub async fn commit(self) -> Result<StoredInput> {
        let StagedInput {
            temp,
            mut file,
            hasher,
            size,
            user,
            target,
        } = self;

        file.flush().await.context("Failed to flush staged upload")?;
        file.sync_all()
            .await
            .context("Failed to sync staged upload")?;
        drop(file);

        let dest = target.clone();
        tokio::task::spawn_blocking(move || temp.persist(&dest).map(|_| ()).map_err(|e| e.error))
            .await
            .context("Upload commit task failed")?
            .with_context(|| format!("Failed to move upload into {}", target.display()))?;

        Ok(StoredInput {
            user,
            path: target,
            size,
            sha256: hex::encode(hasher.finalize()),
        })
    }
}
