use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::BlobStore;
use crate::error::StoreError;

/// Directory-backed blob store.
///
/// Blobs are written to `root/<key>`. Locators point at
/// `public_base_url/<key>` when a base URL is configured (for a directory
/// served over HTTP), otherwise at the file itself.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: Option<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a path under the root, refusing anything that
    /// would escape it
    fn blob_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_plain {
            return Err(StoreError::InvalidKey(key.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

impl BlobStore for LocalBlobStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.blob_path(key)?;

        // Ensure the key's directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;

        debug!("Stored blob {} ({} bytes)", key, bytes.len());
        Ok(())
    }

    fn resolve_locator(&self, key: &str) -> Result<String, StoreError> {
        let path = self.blob_path(key)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(key.to_string()));
        }

        let locator = match &self.public_base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => format!("file://{}", fs::canonicalize(&path)?.display()),
        };
        Ok(locator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_creates_nested_key() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path(), None);

        store.put("images/abc.png", b"png-bytes").unwrap();

        let written = fs::read(dir.path().join("images").join("abc.png")).unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[test]
    fn test_put_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path(), None);

        store.put("a.jpg", b"one").unwrap();
        store.put("a.jpg", b"two").unwrap();

        assert_eq!(fs::read(dir.path().join("a.jpg")).unwrap(), b"two");
    }

    #[test]
    fn test_locator_with_base_url() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path(), Some("https://cdn.example.org/".into()));

        store.put("images/abc.png", b"x").unwrap();

        assert_eq!(
            store.resolve_locator("images/abc.png").unwrap(),
            "https://cdn.example.org/images/abc.png"
        );
    }

    #[test]
    fn test_file_locator() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path(), None);

        store.put("images/abc.png", b"x").unwrap();
        let locator = store.resolve_locator("images/abc.png").unwrap();

        assert!(locator.starts_with("file://"));
        assert!(locator.ends_with("abc.png"));
    }

    #[test]
    fn test_locator_for_missing_blob() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path(), None);

        assert!(matches!(
            store.resolve_locator("images/missing.png"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_rejects_escaping_keys() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path().join("blobs"), None);

        for key in ["../outside.png", "images/../../x", "/etc/passwd", "", "./a.png"] {
            assert!(
                matches!(store.put(key, b"x"), Err(StoreError::InvalidKey(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }
}
