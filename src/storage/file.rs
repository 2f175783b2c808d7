//! File-backed key-value store
//!
//! Each key is a file `{dir}/{key}.json` holding the raw value. Writes go to
//! a temp file that is renamed into place, and every access holds a lock on
//! `{dir}/{key}.lock` (shared for reads, exclusive for writes) so concurrent
//! `shop` invocations never see a half-written list.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::kv::{check_key, KeyValueStore, KvError};

/// Store that keeps one file per key in a directory
#[derive(Debug, Clone)]
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    /// Creates a store rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory holding the value files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file that holds `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.lock", key))
    }

    fn open_lock(&self, key: &str) -> Result<File, KvError> {
        let path = self.lock_path(key);
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| KvError::Io { path, source })
    }

    fn ensure_dir(&self) -> Result<(), KvError> {
        fs::create_dir_all(&self.dir).map_err(|source| KvError::Io {
            path: self.dir.clone(),
            source,
        })
    }
}

impl KeyValueStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        check_key(key)?;
        let path = self.path_for(key);

        if !path.exists() {
            return Ok(None);
        }

        let lock = self.open_lock(key)?;
        lock.lock_shared().map_err(|source| KvError::Io {
            path: self.lock_path(key),
            source,
        })?;

        let mut content = String::new();
        let read = File::open(&path).and_then(|mut file| file.read_to_string(&mut content));

        // Lock is released when `lock` is dropped
        match read {
            Ok(_) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(KvError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        check_key(key)?;
        self.ensure_dir()?;

        let lock = self.open_lock(key)?;
        lock.lock_exclusive().map_err(|source| KvError::Io {
            path: self.lock_path(key),
            source,
        })?;

        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|source| KvError::Io {
                    path: temp_path.clone(),
                    source,
                })?;

            let mut writer = BufWriter::new(&file);
            writer
                .write_all(value.as_bytes())
                .and_then(|_| writer.flush())
                .and_then(|_| file.sync_all())
                .map_err(|source| KvError::Io {
                    path: temp_path.clone(),
                    source,
                })?;
        }

        // Atomic rename
        fs::rename(&temp_path, &path).map_err(|source| KvError::Io { path, source })
    }
}
