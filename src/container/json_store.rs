//! JSON backend
//!
//! Non-finite values have no JSON representation; a container holding NaN or
//! infinity is written but fails to read back.

use super::{
    ContainerIo, TrackContainer, END_DEPTH_KEY, GATE_DIST_KEY, PRUNE_DEPTH_KEY, START_DATE_KEY,
    TRACKS_KEY,
};
use crate::{Error, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Container stored as one JSON document.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonContainer {
    pretty: bool,
}

impl JsonContainer {
    /// Create the backend writing compact JSON.
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: false }
    }

    /// Write indented JSON.
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl ContainerIo for JsonContainer {
    fn write(&self, path: &Path, container: &TrackContainer) -> Result<()> {
        let file = File::create(path)
            .map_err(|e| Error::StorageError(format!("Failed to create JSON file: {e}")))?;
        let mut writer = BufWriter::new(file);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, container)?;
        } else {
            serde_json::to_writer(&mut writer, container)?;
        }
        writer.flush()?;

        debug!(path = %path.display(), tracks = container.tracks.len(), "wrote json container");
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<TrackContainer> {
        let file = File::open(path)
            .map_err(|e| Error::StorageError(format!("Failed to open JSON file: {e}")))?;
        let document: Value = serde_json::from_reader(BufReader::new(file))?;

        let object = document
            .as_object()
            .ok_or_else(|| Error::MalformedContainer("top level is not an object".to_string()))?;
        for key in [TRACKS_KEY, START_DATE_KEY, END_DEPTH_KEY, PRUNE_DEPTH_KEY, GATE_DIST_KEY] {
            if !object.contains_key(key) {
                return Err(Error::MissingArray(key.to_string()));
            }
        }

        let container: TrackContainer = serde_json::from_value(document)?;
        container.validate()?;

        debug!(path = %path.display(), tracks = container.tracks.len(), "read json container");
        Ok(container)
    }
}
