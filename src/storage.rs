use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use log::{info, warn};

use crate::error::StorageError;

/// Somewhere to put the finished file.
pub trait Storage: Send {
    /// Write `bytes` under `name`, replacing any previous content. Returns
    /// the number of bytes written.
    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<usize, StorageError>;
}

/// Files in a directory on the host filesystem.
pub struct DirStorage {
    base_path: PathBuf,
}

impl DirStorage {
    /// Use `base_path`, creating it when it does not exist yet.
    pub fn mount(base_path: impl Into<PathBuf>) -> Result<DirStorage, StorageError> {
        let base_path = base_path.into();
        if !base_path.is_dir() {
            warn!("{} missing, creating it", base_path.display());
            fs::create_dir_all(&base_path).map_err(|source| StorageError::Mount {
                path: base_path.clone(),
                source,
            })?;
        }
        let storage = DirStorage { base_path };
        match storage.used() {
            Ok(used) => info!(
                "storage {}: {} bytes used",
                storage.base_path.display(),
                used
            ),
            Err(e) => warn!("failed to get storage usage: {e}"),
        }
        Ok(storage)
    }

    /// Total size of the regular files directly under the base path.
    pub fn used(&self) -> std::io::Result<u64> {
        let mut total = 0;
        for entry in fs::read_dir(&self.base_path)? {
            let meta = entry?.metadata()?;
            if meta.is_file() {
                total += meta.len();
            }
        }
        Ok(total)
    }
}

impl Storage for DirStorage {
    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<usize, StorageError> {
        let path = self.base_path.join(name);
        let mut file = File::create(&path).map_err(|source| StorageError::Open {
            path: path.clone(),
            source,
        })?;
        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|source| StorageError::Write { path, source })?;
        Ok(bytes.len())
    }
}
