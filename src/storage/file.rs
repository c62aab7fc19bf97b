//! File-backed storage backend

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::warn;

use crate::storage::{Storage, StoreError};

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling file which is then renamed over the target, so a
/// reader never observes a partially written value.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();

        fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    /// The storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');

        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, value)?;

        if let Err(error) = fs::rename(&tmp, &path) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!(path = %tmp.display(), error = %cleanup, "failed to remove temporary file");
            }

            return Err(error.into());
        }

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)?) {
            Err(error) if error.kind() != ErrorKind::NotFound => Err(error.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn values_survive_reopening() -> TestResult {
        let dir = tempfile::tempdir()?;

        let mut storage = FileStorage::open(dir.path())?;
        storage.set("shop_wishlist", r#"["P001"]"#)?;

        let reopened = FileStorage::open(dir.path())?;

        assert_eq!(
            reopened.get("shop_wishlist")?.as_deref(),
            Some(r#"["P001"]"#)
        );
        assert!(dir.path().join("shop_wishlist.json").exists());
        assert!(!dir.path().join("shop_wishlist.json.tmp").exists());

        Ok(())
    }

    #[test]
    fn missing_key_reads_as_none() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = FileStorage::open(dir.path())?;

        assert_eq!(storage.get("shop_cart")?, None);

        Ok(())
    }

    #[test]
    fn remove_is_idempotent() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut storage = FileStorage::open(dir.path())?;

        storage.set("shop_cart", "[]")?;
        storage.remove("shop_cart")?;
        storage.remove("shop_cart")?;

        assert_eq!(storage.get("shop_cart")?, None);

        Ok(())
    }

    #[test]
    fn failed_rename_removes_temporary_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut storage = FileStorage::open(dir.path())?;

        fs::create_dir_all(dir.path().join("shop_cart.json").join("occupied"))?;

        assert!(matches!(
            storage.set("shop_cart", "[]"),
            Err(StoreError::Io(_))
        ));
        assert!(!dir.path().join("shop_cart.json.tmp").exists());

        Ok(())
    }

    #[test]
    fn path_like_keys_are_rejected() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut storage = FileStorage::open(dir.path())?;

        assert!(matches!(
            storage.set("../escape", "[]"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(storage.get(""), Err(StoreError::InvalidKey(_))));

        Ok(())
    }
}
