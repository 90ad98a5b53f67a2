//! In-memory container store using `DashMap`.
//!
//! Data is lost on process restart. Useful for tests and for pipelines that
//! hand tracks from one phase to the next without touching disk.

use super::{ContainerIo, TrackContainer};
use crate::{Error, Result};
use dashmap::DashMap;
use std::path::{Path, PathBuf};

/// In-memory container store keyed by path.
///
/// # Example
///
/// ```rust
/// use eddy_mht::container::{ContainerIo, MemoryContainer, TrackContainer};
/// use std::path::Path;
///
/// # fn main() -> eddy_mht::Result<()> {
/// let io = MemoryContainer::new();
/// let path = Path::new("run-42");
/// io.write(path, &TrackContainer::new(Vec::new(), 0, 3, 1, 150.0))?;
/// assert!(io.contains(path));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryContainer {
    store: DashMap<PathBuf, TrackContainer>,
}

impl MemoryContainer {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Whether a container is stored at `path`.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.store.contains_key(path)
    }

    /// Remove and return the container at `path`.
    pub fn remove(&self, path: &Path) -> Option<TrackContainer> {
        self.store.remove(path).map(|(_, container)| container)
    }
}

impl ContainerIo for MemoryContainer {
    fn read(&self, path: &Path) -> Result<TrackContainer> {
        let container = self
            .store
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                Error::StorageError(format!("No container stored at {}", path.display()))
            })?;
        container.validate()?;
        Ok(container)
    }

    fn write(&self, path: &Path, container: &TrackContainer) -> Result<()> {
        self.store.insert(path.to_path_buf(), container.clone());
        Ok(())
    }
}
