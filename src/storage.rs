use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

/// Backing store for uploaded image files. The live implementation writes to
/// local disk; tests swap in an in-memory fake.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persist `body` and return the path clients use to reference the file.
    async fn save(&self, body: Bytes, content_type: &str) -> anyhow::Result<String>;
    async fn delete(&self, path: &str) -> anyhow::Result<()>;
    async fn exists(&self, path: &str) -> bool;
}

/// Disk-backed store rooted at the configured upload directory. Images land
/// under `<root>/images/<uuid>.<ext>`.
pub struct LocalFiles {
    root: PathBuf,
}

impl LocalFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }
}

#[async_trait]
impl FileStore for LocalFiles {
    async fn save(&self, body: Bytes, content_type: &str) -> anyhow::Result<String> {
        let dir = self.images_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create upload dir {}", dir.display()))?;

        let ext = ext_from_mime(content_type).unwrap_or("bin");
        let path = dir.join(format!("{}.{}", Uuid::new_v4(), ext));
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write upload {}", path.display()))?;

        Ok(path.to_string_lossy().into_owned())
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        tokio::fs::remove_file(Path::new(path))
            .await
            .with_context(|| format!("remove file {}", path))?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        tokio::fs::try_exists(Path::new(path)).await.unwrap_or(false)
    }
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}
