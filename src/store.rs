//! File-backed [`KeyValueStore`]: one file per key inside a directory.
//!
//! Gives the CLI the same persisted layout the browser keeps in local
//! storage, so a design can be inspected, edited, and exported offline.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use canvas::persist::{KeyValueStore, StoreError};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

fn backend_error(path: &Path, err: &std::io::Error) -> StoreError {
    StoreError::Backend(format!("{}: {err}", path.display()))
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(backend_error(&path, &err)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|err| backend_error(&self.dir, &err))?;
        let path = self.path(key);
        fs::write(&path, value).map_err(|err| backend_error(&path, &err))?;
        debug!(path = %path.display(), bytes = value.len(), "store file written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
