//! Byte sources and sinks that replay files are loaded from and saved to.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::{Decoded, EventLog, ReplayResult};

pub trait ByteStore {
    fn load(&self, path: &Path) -> ReplayResult<Vec<u8>>;
    fn save(&mut self, path: &Path, bytes: &[u8]) -> ReplayResult<()>;
}

/// Files on disk, resolved relative to `root`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn cwd() -> Self {
        Self::new(PathBuf::from("."))
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl ByteStore for FileStore {
    fn load(&self, path: &Path) -> ReplayResult<Vec<u8>> {
        Ok(std::fs::read(self.resolve(path))?)
    }

    fn save(&mut self, path: &Path, bytes: &[u8]) -> ReplayResult<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(full, bytes)?;
        Ok(())
    }
}

/// In-memory store, mostly for tests and tooling that never touches disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }
}

impl ByteStore for MemoryStore {
    fn load(&self, path: &Path) -> ReplayResult<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such entry {}", path.display()),
            )
            .into()
        })
    }

    fn save(&mut self, path: &Path, bytes: &[u8]) -> ReplayResult<()> {
        self.files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

impl EventLog {
    /// Reads and decodes `path`. A read failure yields an empty default log
    /// together with the I/O error.
    pub fn load<S: ByteStore + ?Sized>(store: &S, path: &Path) -> Decoded {
        match store.load(path) {
            Ok(bytes) => Self::decode(&bytes),
            Err(err) => {
                tracing::warn!("failed to read replay {}: {err}", path.display());
                Decoded {
                    log: EventLog::default(),
                    error: Some(err),
                }
            }
        }
    }

    /// Encodes and writes the log. Nothing is written if encoding fails.
    pub fn save<S: ByteStore + ?Sized>(&self, store: &mut S, path: &Path) -> ReplayResult<()> {
        let bytes = self.encode()?;
        store.save(path, &bytes)
    }
}
