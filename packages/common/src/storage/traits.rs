use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Directory of the public asset tree an upload is filed under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetDir {
    Models,
    Colors,
    Specs,
    About,
}

impl AssetDir {
    /// Pick the directory for a multipart field name.
    pub fn for_field(field_name: &str) -> Self {
        if field_name.contains("exterior") || field_name.contains("interior") {
            Self::Colors
        } else if field_name.contains("specPhoto") {
            Self::Specs
        } else if field_name.contains("aboutPhoto") {
            Self::About
        } else {
            Self::Models
        }
    }

    /// Path of the directory relative to the public root.
    pub fn relative(&self) -> &'static str {
        match self {
            Self::Models => "uploads/models",
            Self::Colors => "uploads/colors",
            Self::Specs => "uploads/specs",
            Self::About => "uploads/about",
        }
    }

    pub const ALL: &'static [AssetDir] = &[Self::Models, Self::Colors, Self::Specs, Self::About];
}

/// Storage for files served from the public asset tree.
///
/// Every path accepted or returned by this trait is a canonical web path as
/// produced by [`crate::asset_path::normalize`].
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store data from an async reader under `dir/file_name` and return its canonical path.
    async fn put_stream(
        &self,
        dir: AssetDir,
        file_name: &str,
        reader: BoxReader,
    ) -> Result<String, StorageError>;

    /// Retrieve an asset as a streaming async reader.
    async fn get_stream(&self, path: &str) -> Result<BoxReader, StorageError>;

    /// Check whether an asset exists.
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Delete an asset.
    ///
    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn delete(&self, path: &str) -> Result<bool, StorageError>;
}
