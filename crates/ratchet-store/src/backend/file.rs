use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::Backend;
use crate::error::{BackendError, BackendResult};

/// Suffix of in-flight writes. Entries with this suffix are never listed.
const TMP_SUFFIX: &str = ".tmp";

/// Longest file name written as the plain hex of a key.
const MAX_HEX_NAME_LEN: usize = 200;

/// Prefix of file names derived from a key digest. Not valid hex, so it can
/// never collide with a plain hex name.
const DIGEST_PREFIX: &str = "k-";

/// Persistent backend storing one file per key inside a directory.
///
/// File names are the lowercase hex encoding of the UTF-8 key, so keys may
/// contain any character (including `/` and `@`). A write lands in a
/// temporary sibling first and is renamed into place, so readers never see
/// a half-written value.
///
/// Keys whose hex form is longer than 200 chars are stored under
/// `k-<blake3 of the key>` instead, with the hex key on the first line of the
/// file and the value after it. Key length is therefore not bounded by the
/// filesystem's name limit.
///
/// # Example
///
/// ```rust,ignore
/// use ratchet_store::backend::FileBackend;
///
/// let backend = FileBackend::open("./data/store")?;
/// backend.set_item("session@alice.1", "{}".to_owned()).await?;
/// ```
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
    lock: RwLock<()>,
}

impl FileBackend {
    /// Open a backend rooted at `path`.
    ///
    /// Creates the directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Io`] if the directory cannot be created.
    pub fn open(path: impl AsRef<Path>) -> BackendResult<Self> {
        let dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        debug!(path = %dir.display(), "opened file backend");
        Ok(Self {
            dir,
            lock: RwLock::new(()),
        })
    }

    /// The directory holding the entries.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn is_hashed(key: &str) -> bool {
        key.len().saturating_mul(2) > MAX_HEX_NAME_LEN
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        if Self::is_hashed(key) {
            let digest = blake3::hash(key.as_bytes()).to_hex();
            self.dir.join(format!("{DIGEST_PREFIX}{digest}"))
        } else {
            self.dir.join(hex::encode(key))
        }
    }

    fn key_from_hex(hex_key: &str) -> Option<String> {
        let bytes = hex::decode(hex_key).ok()?;
        String::from_utf8(bytes).ok()
    }

    /// Split a hashed entry into its key and value.
    fn split_hashed(contents: &str) -> Option<(String, &str)> {
        let (header, value) = contents.split_once('\n')?;
        Some((Self::key_from_hex(header)?, value))
    }

    async fn list_keys(&self) -> BackendResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if name.ends_with(TMP_SUFFIX) {
                continue;
            }
            if name.starts_with(DIGEST_PREFIX) {
                let contents = tokio::fs::read_to_string(entry.path()).await?;
                match Self::split_hashed(&contents) {
                    Some((key, _)) => keys.push(key),
                    None => warn!(file = %name, "skipping hashed entry without a key header"),
                }
            } else if let Some(key) = Self::key_from_hex(&name) {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    async fn remove_entry(&self, key: &str) -> BackendResult<bool> {
        match tokio::fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Backend for FileBackend {
    async fn get_item(&self, key: &str) -> BackendResult<Option<String>> {
        let _guard = self.lock.read().await;
        let bytes = match tokio::fs::read(self.entry_path(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let text = String::from_utf8(bytes).map_err(|_| BackendError::InvalidUtf8 {
            key: key.to_owned(),
        })?;
        if !Self::is_hashed(key) {
            return Ok(Some(text));
        }
        match Self::split_hashed(&text) {
            Some((stored, value)) if stored == key => Ok(Some(value.to_owned())),
            _ => Err(BackendError::Corrupt {
                key: key.to_owned(),
            }),
        }
    }

    async fn set_item(&self, key: &str, value: String) -> BackendResult<()> {
        let _guard = self.lock.write().await;
        let path = self.entry_path(key);
        let mut tmp = path.clone().into_os_string();
        tmp.push(TMP_SUFFIX);
        let contents = if Self::is_hashed(key) {
            format!("{}\n{value}", hex::encode(key))
        } else {
            value
        };
        tokio::fs::write(&tmp, contents.as_bytes()).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> BackendResult<bool> {
        let _guard = self.lock.write().await;
        self.remove_entry(key).await
    }

    async fn clear(&self) -> BackendResult<u64> {
        let _guard = self.lock.write().await;
        let mut count: u64 = 0;
        for key in self.list_keys().await? {
            if self.remove_entry(&key).await? {
                count = count.saturating_add(1);
            }
        }
        Ok(count)
    }

    async fn keys(&self) -> BackendResult<Vec<String>> {
        let _guard = self.lock.read().await;
        self.list_keys().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_backend() -> (FileBackend, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path().join("store")).unwrap();
        (backend, dir)
    }

    #[tokio::test]
    async fn test_file_get_set() {
        let (backend, _dir) = make_backend();
        backend
            .set_item("identityKey@u1", "{}".into())
            .await
            .unwrap();
        assert_eq!(
            backend.get_item("identityKey@u1").await.unwrap(),
            Some("{}".into())
        );
    }

    #[tokio::test]
    async fn test_file_get_missing() {
        let (backend, _dir) = make_backend();
        assert!(backend.get_item("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_keys_survive_reopen() {
        let (backend, dir) = make_backend();
        backend.set_item("session@a/b", "1".into()).await.unwrap();
        backend.set_item("session@c", "2".into()).await.unwrap();
        drop(backend);

        let reopened = FileBackend::open(dir.path().join("store")).unwrap();
        let mut keys = reopened.keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["session@a/b", "session@c"]);
        assert_eq!(
            reopened.get_item("session@a/b").await.unwrap(),
            Some("1".into())
        );
    }

    #[tokio::test]
    async fn test_file_preserves_latin1_text() {
        let (backend, _dir) = make_backend();
        let value = "\u{0}\u{ff}\u{10}".to_owned();
        backend.set_item("k", value.clone()).await.unwrap();
        assert_eq!(backend.get_item("k").await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn test_file_ignores_foreign_files() {
        let (backend, _dir) = make_backend();
        std::fs::write(backend.path().join("README"), "not an entry").unwrap();
        std::fs::write(backend.path().join("6b.tmp"), "partial").unwrap();
        backend.set_item("k", "v".into()).await.unwrap();
        assert_eq!(backend.keys().await.unwrap(), vec!["k"]);
    }

    #[tokio::test]
    async fn test_file_long_keys_use_hashed_names() {
        let (backend, dir) = make_backend();
        let key = format!("conversation@{}", "a".repeat(240));
        backend.set_item(&key, "{\"id\":1}".into()).await.unwrap();
        backend.set_item("k", "short".into()).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(backend.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert!(names.iter().all(|n| n.len() <= MAX_HEX_NAME_LEN));
        assert!(names.iter().any(|n| n.starts_with(DIGEST_PREFIX)));

        drop(backend);
        let reopened = FileBackend::open(dir.path().join("store")).unwrap();
        let mut keys = reopened.keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec![key.clone(), "k".to_owned()]);
        assert_eq!(
            reopened.get_item(&key).await.unwrap(),
            Some("{\"id\":1}".into())
        );

        assert!(reopened.remove_item(&key).await.unwrap());
        assert!(reopened.get_item(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_long_key_value_may_contain_newlines() {
        let (backend, _dir) = make_backend();
        let key = format!("session@{}\n{}", "x".repeat(150), "y".repeat(60));
        let value = "line one\nline two".to_owned();
        backend.set_item(&key, value.clone()).await.unwrap();
        assert_eq!(backend.get_item(&key).await.unwrap(), Some(value));
        assert_eq!(backend.keys().await.unwrap(), vec![key]);
    }

    #[tokio::test]
    async fn test_file_hashed_entry_without_header_is_corrupt() {
        let (backend, _dir) = make_backend();
        let key = "z".repeat(200);
        std::fs::write(backend.entry_path(&key), "no header").unwrap();
        assert!(matches!(
            backend.get_item(&key).await,
            Err(BackendError::Corrupt { .. })
        ));
        assert!(backend.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_remove_and_clear() {
        let (backend, _dir) = make_backend();
        backend.set_item("a", "1".into()).await.unwrap();
        backend.set_item("b", "2".into()).await.unwrap();
        assert!(backend.remove_item("a").await.unwrap());
        assert!(!backend.remove_item("a").await.unwrap());
        assert_eq!(backend.clear().await.unwrap(), 1);
        assert!(backend.keys().await.unwrap().is_empty());
    }
}
