//! Parquet backend
//!
//! One Arrow row per stored detection row:
//!
//! ```text
//! track: UInt64 | position: UInt64 | row: List<Float64>
//! ```
//!
//! Header scalars travel in the Arrow schema metadata as decimal strings.
//! Rust prints `f64` with the shortest representation that parses back to
//! the same bits, so the gating distance survives unchanged.

use super::{
    ContainerIo, TrackContainer, END_DEPTH_KEY, GATE_DIST_KEY, PRUNE_DEPTH_KEY, START_DATE_KEY,
};
use crate::encoding::TrackMatrix;
use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, Float64Array, ListArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Float64Type, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

const TRACK_COLUMN: &str = "track";
const POSITION_COLUMN: &str = "position";
const ROW_COLUMN: &str = "row";

/// Container stored as a single Parquet file.
///
/// Matrices without rows have no representation and are dropped on write.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParquetContainer;

impl ParquetContainer {
    /// Create the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn schema(container: &TrackContainer) -> Schema {
        let metadata: HashMap<String, String> = [
            (START_DATE_KEY, container.start_date.to_string()),
            (END_DEPTH_KEY, container.end_depth.to_string()),
            (PRUNE_DEPTH_KEY, container.prune_depth.to_string()),
            (GATE_DIST_KEY, container.gate_dist.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Schema::new(vec![
            Field::new(TRACK_COLUMN, DataType::UInt64, false),
            Field::new(POSITION_COLUMN, DataType::UInt64, false),
            Field::new(
                ROW_COLUMN,
                DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
                false,
            ),
        ])
        .with_metadata(metadata)
    }

    fn to_batch(container: &TrackContainer) -> Result<RecordBatch> {
        let mut track_ids = Vec::new();
        let mut positions = Vec::new();
        let mut rows: Vec<Option<Vec<Option<f64>>>> = Vec::new();

        let stored = container.tracks.iter().filter(|m| !m.is_empty());
        for (track, matrix) in (0_u64..).zip(stored) {
            for (position, row) in (0_u64..).zip(matrix.iter_rows()) {
                track_ids.push(track);
                positions.push(position);
                rows.push(Some(row.iter().copied().map(Some).collect()));
            }
        }

        let columns: Vec<ArrayRef> = vec![
            Arc::new(UInt64Array::from(track_ids)),
            Arc::new(UInt64Array::from(positions)),
            Arc::new(ListArray::from_iter_primitive::<Float64Type, _, _>(rows)),
        ];
        Ok(RecordBatch::try_new(Arc::new(Self::schema(container)), columns)?)
    }
}

impl ContainerIo for ParquetContainer {
    fn write(&self, path: &Path, container: &TrackContainer) -> Result<()> {
        let dropped = container.tracks.iter().filter(|m| m.is_empty()).count();
        if dropped > 0 {
            warn!(path = %path.display(), dropped, "dropping tracks without rows");
        }

        let batch = Self::to_batch(container)?;
        let file = File::create(path).map_err(|e| {
            Error::StorageError(format!("Failed to create Parquet file: {e}"))
        })?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
        writer.write(&batch)?;
        writer.close()?;

        debug!(path = %path.display(), rows = batch.num_rows(), "wrote parquet container");
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<TrackContainer> {
        let file = File::open(path).map_err(|e| {
            Error::StorageError(format!("Failed to open Parquet file: {e}"))
        })?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| {
            Error::StorageError(format!("Failed to parse Parquet file: {e}"))
        })?;
        let metadata = builder.schema().metadata().clone();
        let reader = builder.build().map_err(|e| {
            Error::StorageError(format!("Failed to create Parquet reader: {e}"))
        })?;

        let mut grouped: BTreeMap<u64, Vec<Vec<f64>>> = BTreeMap::new();
        for batch in reader {
            let batch = batch.map_err(|e| {
                Error::StorageError(format!("Failed to read record batch: {e}"))
            })?;
            collect_rows(&batch, &mut grouped)?;
        }

        let tracks = grouped
            .into_values()
            .enumerate()
            .map(|(index, rows)| {
                TrackMatrix::from_rows(rows).map_err(|e| match e {
                    Error::WidthMismatch {
                        expected, found, ..
                    } => Error::WidthMismatch {
                        track: index,
                        expected,
                        found,
                    },
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let container = TrackContainer {
            tracks,
            start_date: scalar(&metadata, START_DATE_KEY)?,
            end_depth: scalar(&metadata, END_DEPTH_KEY)?,
            prune_depth: scalar(&metadata, PRUNE_DEPTH_KEY)?,
            gate_dist: scalar(&metadata, GATE_DIST_KEY)?,
        };
        container.validate()?;

        debug!(path = %path.display(), tracks = container.tracks.len(), "read parquet container");
        Ok(container)
    }
}

/// Append the rows of `batch` to their tracks; positions must arrive in order.
fn collect_rows(batch: &RecordBatch, grouped: &mut BTreeMap<u64, Vec<Vec<f64>>>) -> Result<()> {
    let track_ids = typed_column::<UInt64Array>(batch, TRACK_COLUMN)?;
    let positions = typed_column::<UInt64Array>(batch, POSITION_COLUMN)?;
    let rows = typed_column::<ListArray>(batch, ROW_COLUMN)?;

    for i in 0..batch.num_rows() {
        if track_ids.is_null(i) || positions.is_null(i) || rows.is_null(i) {
            return Err(Error::MalformedContainer(format!("null cell in stored row {i}")));
        }
        let track = track_ids.value(i);
        let position = positions.value(i);

        let values = rows.value(i);
        let values = values
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| Error::Other("Failed to downcast to Float64Array".to_string()))?;
        if values.null_count() > 0 {
            return Err(Error::MalformedContainer(format!(
                "null value in track {track} position {position}"
            )));
        }

        let entry = grouped.entry(track).or_default();
        if u64::try_from(entry.len()).ok() != Some(position) {
            return Err(Error::MalformedContainer(format!(
                "track {track} position {position} out of order"
            )));
        }
        entry.push(values.values().to_vec());
    }
    Ok(())
}

fn typed_column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .ok_or_else(|| Error::MissingArray(name.to_string()))?
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::MalformedContainer(format!("column {name} has unexpected type")))
}

fn scalar<T: FromStr>(metadata: &HashMap<String, String>, key: &str) -> Result<T> {
    let raw = metadata
        .get(key)
        .ok_or_else(|| Error::MissingArray(key.to_string()))?;
    raw.parse()
        .map_err(|_| Error::MalformedContainer(format!("invalid {key} value: {raw}")))
}
