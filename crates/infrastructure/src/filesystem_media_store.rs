//! Blob storage for evidence photos and data files on the local filesystem.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use fieldtrack_application::MediaStore;
use fieldtrack_core::{AppError, AppResult};
use uuid::Uuid;

const MAX_FILENAME_LENGTH: usize = 80;

/// Stores blobs as files below a media root directory.
///
/// Keys have the shape `{namespace}/{uuid}-{filename}` and are always
/// relative to the root.
#[derive(Debug, Clone)]
pub struct FilesystemMediaStore {
    root: PathBuf,
}

impl FilesystemMediaStore {
    /// Creates a store rooted at `root`. The directory is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_plain {
            return Err(AppError::Validation(format!("invalid media key '{key}'")));
        }

        Ok(self.root.join(relative))
    }
}

fn sanitize(segment: &str, fallback: &str) -> String {
    let cleaned = segment
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() || matches!(character, '.' | '-' | '_') {
                character
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_LENGTH)
        .collect::<String>();
    let cleaned = cleaned.trim_matches('.');

    if cleaned.is_empty() {
        fallback.to_owned()
    } else {
        cleaned.to_owned()
    }
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn put(&self, namespace: &str, filename: &str, bytes: Vec<u8>) -> AppResult<String> {
        let key = format!(
            "{}/{}-{}",
            sanitize(namespace, "media"),
            Uuid::new_v4(),
            sanitize(filename, "upload")
        );
        let path = self.resolve(&key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                AppError::Internal(format!(
                    "failed to create media directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }
        tokio::fs::write(&path, bytes).await.map_err(|error| {
            AppError::Internal(format!("failed to write media '{key}': {error}"))
        })?;

        Ok(key)
    }

    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        let path = self.resolve(key)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(AppError::Internal(format!(
                "failed to read media '{key}': {error}"
            ))),
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(AppError::Internal(format!(
                "failed to delete media '{key}': {error}"
            ))),
        }
    }
}
