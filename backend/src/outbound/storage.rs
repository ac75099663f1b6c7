//! Filesystem-backed upload storage.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::{StoredUpload, UploadStore};

/// Stores uploads on the local filesystem, served under a public path.
///
/// File names are generated (UUID + validated extension), never taken from
/// the client, so a crafted original name cannot escape the upload
/// directory.
#[derive(Clone)]
pub struct DiskUploadStore {
    root: PathBuf,
    public_base: String,
}

impl DiskUploadStore {
    /// Create a store writing into `root` and serving under `public_base`
    /// (e.g. `/uploads`).
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }

    /// Ensure the upload directory exists.
    pub async fn prepare(&self) -> Result<(), Error> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|err| Error::internal(format!("creating upload directory failed: {err}")))
    }

    /// Directory uploads are written into.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

#[async_trait]
impl UploadStore for DiskUploadStore {
    async fn save(&self, extension: &str, bytes: Vec<u8>) -> Result<StoredUpload, Error> {
        let filename = format!("{}.{extension}", Uuid::new_v4());
        let path = self.root.join(&filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|err| Error::internal(format!("storing upload failed: {err}")))?;
        tracing::debug!(file = %path.display(), "upload stored");
        Ok(StoredUpload {
            url: format!("{}/{filename}", self.public_base),
            filename,
        })
    }
}
