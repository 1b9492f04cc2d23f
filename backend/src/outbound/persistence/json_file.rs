//! Atomic JSON document files inside the data directory.
//!
//! Writes go to a hidden temporary file in the same directory which is then
//! renamed over the target, so readers never observe a partial document.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// I/O failure on a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {message}")]
pub struct JsonFileError {
    pub path: Utf8PathBuf,
    pub message: String,
}

impl JsonFileError {
    fn new(path: impl Into<Utf8PathBuf>, error: impl ToString) -> Self {
        Self {
            path: path.into(),
            message: error.to_string(),
        }
    }
}

/// One JSON document file under a capability-scoped directory.
#[derive(Debug, Clone)]
pub struct JsonFile {
    dir: Arc<Dir>,
    dir_path: Utf8PathBuf,
    file_name: String,
}

impl JsonFile {
    /// Open `file_name` inside `data_dir`, creating the directory if needed.
    pub fn open(data_dir: &Utf8Path, file_name: &str) -> Result<Self, JsonFileError> {
        Dir::create_ambient_dir_all(data_dir, ambient_authority())
            .map_err(|err| JsonFileError::new(data_dir, err))?;
        let dir = Dir::open_ambient_dir(data_dir, ambient_authority())
            .map_err(|err| JsonFileError::new(data_dir, err))?;
        Ok(Self {
            dir: Arc::new(dir),
            dir_path: data_dir.to_path_buf(),
            file_name: file_name.to_owned(),
        })
    }

    /// Full path, for diagnostics.
    pub fn path(&self) -> Utf8PathBuf {
        self.dir_path.join(&self.file_name)
    }

    /// Read the document, or `None` when it does not exist yet.
    pub fn read(&self) -> Result<Option<String>, JsonFileError> {
        match self.dir.read_to_string(&self.file_name) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(JsonFileError::new(self.path(), err)),
        }
    }

    /// Replace the document on a blocking worker thread.
    pub async fn write(&self, contents: String) -> Result<(), JsonFileError> {
        let file = self.clone();
        tokio::task::spawn_blocking(move || file.write_blocking(&contents))
            .await
            .map_err(|err| JsonFileError::new(self.path(), err))?
    }

    /// Replace the document atomically.
    pub fn write_blocking(&self, contents: &str) -> Result<(), JsonFileError> {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_name = format!(".{}.tmp.{}.{}", self.file_name, std::process::id(), counter);

        self.write_temp(&tmp_name, contents)?;
        if let Err(err) = self.dir.rename(&tmp_name, &self.dir, &self.file_name) {
            if self.dir.remove_file(&tmp_name).is_err() {
                // Ignore cleanup failures.
            }
            return Err(JsonFileError::new(self.path(), err));
        }
        if self.dir.open(".").and_then(|dir| dir.sync_all()).is_err() {
            // Directory sync is best effort.
        }
        Ok(())
    }

    fn write_temp(&self, tmp_name: &str, contents: &str) -> Result<(), JsonFileError> {
        let tmp_path = self.dir_path.join(tmp_name);
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        let mut file = self
            .dir
            .open_with(tmp_name, &options)
            .map_err(|err| JsonFileError::new(&tmp_path, err))?;

        let written = file.write_all(contents.as_bytes()).and_then(|()| file.sync_all());
        if let Err(err) = written {
            drop(file);
            if self.dir.remove_file(tmp_name).is_err() {
                // Ignore cleanup failures.
            }
            return Err(JsonFileError::new(&tmp_path, err));
        }
        Ok(())
    }
}
