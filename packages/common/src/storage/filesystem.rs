use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, BufReader};

use super::error::StorageError;
use super::traits::{AssetDir, AssetStore, BoxReader};
use crate::asset_path::{escapes_root, normalize};

/// Filesystem-backed public asset tree.
///
/// Files live at `{public_root}/{canonical path}`, so the directory can be
/// served as-is by a static file server.
pub struct FilesystemAssetStore {
    public_root: PathBuf,
    max_size: u64,
}

impl FilesystemAssetStore {
    /// Create a new store, creating the upload directories if needed.
    pub async fn new(public_root: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        for dir in AssetDir::ALL {
            fs::create_dir_all(public_root.join(dir.relative())).await?;
        }
        fs::create_dir_all(public_root.join(".tmp")).await?;
        Ok(Self {
            public_root,
            max_size,
        })
    }

    /// Resolve a canonical path to its location on disk.
    fn disk_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let canonical =
            normalize(path).ok_or_else(|| StorageError::InvalidPath(path.to_string()))?;
        if escapes_root(&canonical) {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.public_root.join(canonical.trim_start_matches('/')))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.public_root
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl AssetStore for FilesystemAssetStore {
    async fn put_stream(
        &self,
        dir: AssetDir,
        file_name: &str,
        mut reader: BoxReader,
    ) -> Result<String, StorageError> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.starts_with('.') {
            return Err(StorageError::InvalidPath(file_name.to_string()));
        }
        if !is_image_name(file_name) {
            return Err(StorageError::UnsupportedType(file_name.to_string()));
        }

        let temp_path = self.temp_path();
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer
        let mut temp_file = fs::File::create(&temp_path).await?;

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }

            total_bytes += n as u64;
            if total_bytes > self.max_size {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(StorageError::SizeLimitExceeded {
                    actual: total_bytes,
                    limit: self.max_size,
                });
            }

            tokio::io::AsyncWriteExt::write_all(&mut temp_file, &buf[..n]).await?;
        }

        tokio::io::AsyncWriteExt::flush(&mut temp_file).await?;
        drop(temp_file);

        let relative = format!("{}/{}", dir.relative(), file_name);
        let target = self.public_root.join(&relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        normalize(&relative).ok_or(StorageError::InvalidPath(relative))
    }

    async fn get_stream(&self, path: &str) -> Result<BoxReader, StorageError> {
        let disk_path = self.disk_path(path)?;
        match fs::File::open(&disk_path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let disk_path = self.disk_path(path)?;
        Ok(fs::try_exists(&disk_path).await?)
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        let disk_path = self.disk_path(path)?;
        match fs::remove_file(&disk_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];

fn is_image_name(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}
