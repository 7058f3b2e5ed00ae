use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::{CollaboratorError, FileStorage};

/// Stores uploads as flat files under one directory.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

fn clean_extension(extension: &str) -> String {
    let ext: String = extension
        .trim_start_matches('.')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(8)
        .collect::<String>()
        .to_ascii_lowercase();
    if ext.is_empty() {
        "bin".to_string()
    } else {
        ext
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save(&self, bytes: &[u8], extension: &str) -> Result<String, CollaboratorError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CollaboratorError::Storage(e.to_string()))?;
        let path = self
            .root
            .join(format!("{}.{}", Uuid::new_v4().simple(), clean_extension(extension)));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| CollaboratorError::Storage(e.to_string()))?;
        debug!(path = %path.display(), size = bytes.len(), "image_stored");
        Ok(path.to_string_lossy().into_owned())
    }

    async fn delete(&self, path: &str) -> Result<(), CollaboratorError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CollaboratorError::Storage(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn save_then_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().join("uploads"));

        let path = storage.save(b"jpeg-bytes", ".JPG").await.unwrap();
        assert!(path.ends_with(".jpg"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"jpeg-bytes");

        storage.delete(&path).await.unwrap();
        assert!(!std::path::Path::new(&path).exists());
        storage.delete(&path).await.unwrap();
    }

    #[test]
    fn extension_is_sanitized() {
        assert_eq!(clean_extension("../../etc"), "etc");
        assert_eq!(clean_extension(""), "bin");
        assert_eq!(clean_extension("png"), "png");
    }
}
