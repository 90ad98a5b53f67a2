//! Fixed-width row encoding of detections
//!
//! Every exported detection becomes one `f64` row:
//!
//! ```text
//! | lat | lon | t | score | area | amp | missing | thresh | speed | px0 | px1 | .. | -1 | -1 |
//! |<------------------- FIXED_FIELDS = 9 ------------------------>|<-- pixel indices -->|
//! ```
//!
//! The pixel tail is right-padded with [`PADDING_SENTINEL`] up to the width of
//! the whole batch, `FIXED_FIELDS + max pixel count`. Pixel indices are
//! non-negative, so the sentinel never collides with a real value.

use crate::detection::Detection;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Number of fixed leading columns in every row.
pub const FIXED_FIELDS: usize = 9;

/// Value filling unused pixel slots.
pub const PADDING_SENTINEL: f64 = -1.0;

/// Largest integer an `f64` holds exactly (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Fixed columns of an encoded row, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Latitude in degrees
    Lat,
    /// Longitude in degrees
    Lon,
    /// Absolute time-step index, `base_depth + 1 + position`
    TimeIndex,
    /// Cumulative score
    Score,
    /// Surface area
    SurfaceArea,
    /// Amplitude
    Amplitude,
    /// Imputed flag as 0/1
    Missing,
    /// Detection threshold
    ThreshFound,
    /// Mean geostrophic speed
    MeanGeoSpeed,
}

impl Field {
    /// Column index of the field.
    #[must_use]
    pub const fn column(self) -> usize {
        self as usize
    }
}

/// Width of a batch whose longest pixel list has `max_pixels` entries.
#[must_use]
pub const fn row_width(max_pixels: usize) -> usize {
    FIXED_FIELDS + max_pixels
}

/// Encode one detection into a row of exactly `width` columns.
///
/// # Panics
///
/// Panics if `width` cannot hold the fixed fields plus the detection's pixels;
/// batch widths come from [`row_width`] over the same detections.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn encode_row(
    detection: &Detection,
    time_index: i64,
    score: f64,
    missing: bool,
    width: usize,
) -> Vec<f64> {
    assert!(
        width >= row_width(detection.pixel_count()),
        "row width {width} too small for {} pixels",
        detection.pixel_count()
    );

    let mut row = Vec::with_capacity(width);
    row.extend_from_slice(&[
        detection.lat(),
        detection.lon(),
        time_index as f64,
        score,
        detection.surface_area(),
        detection.amplitude(),
        if missing { 1.0 } else { 0.0 },
        detection.thresh_found(),
        detection.mean_geo_speed(),
    ]);
    row.extend(detection.pixel_indices().iter().map(|&px| px as f64));
    row.resize(width, PADDING_SENTINEL);
    row
}

/// Decode the pixel tail of a row, dropping exactly the trailing sentinel run.
///
/// # Errors
///
/// Returns [`Error::MalformedContainer`] if the row is narrower than
/// [`FIXED_FIELDS`] or a kept value is not a non-negative integer.
pub fn decode_pixels(row: &[f64]) -> Result<Vec<u64>> {
    let tail = row.get(FIXED_FIELDS..).ok_or_else(|| {
        Error::MalformedContainer(format!(
            "row has {} columns, need at least {FIXED_FIELDS}",
            row.len()
        ))
    })?;
    #[allow(clippy::float_cmp)]
    let kept = tail
        .iter()
        .rposition(|&v| v != PADDING_SENTINEL)
        .map_or(0, |last| last + 1);

    tail[..kept]
        .iter()
        .map(|&v| {
            exact_integer(v)
                .filter(|_| v >= 0.0)
                .map(|_| decode_unsigned(v))
                .ok_or_else(|| Error::MalformedContainer(format!("invalid pixel index {v}")))
        })
        .collect()
}

/// Decode the absolute time index stored in a row.
///
/// # Errors
///
/// Returns [`Error::MalformedContainer`] if the row lacks the column or the
/// value is not an integer.
pub fn decode_time_index(row: &[f64]) -> Result<i64> {
    let v = *row.get(Field::TimeIndex.column()).ok_or_else(|| {
        Error::MalformedContainer(format!("row has {} columns, no time index", row.len()))
    })?;
    exact_integer(v)
        .ok_or_else(|| Error::MalformedContainer(format!("invalid time index {v}")))
}

/// Rebuild the detection held in the fixed fields and pixel tail of `row`.
///
/// # Errors
///
/// Propagates [`decode_pixels`] failures.
pub fn decode_detection(row: &[f64]) -> Result<Detection> {
    let pixels = decode_pixels(row)?;
    Ok(Detection::builder(row[Field::Lat.column()], row[Field::Lon.column()])
        .surface_area(row[Field::SurfaceArea.column()])
        .amplitude(row[Field::Amplitude.column()])
        .thresh_found(row[Field::ThreshFound.column()])
        .mean_geo_speed(row[Field::MeanGeoSpeed.column()])
        .pixel_indices(pixels)
        .build())
}

#[allow(clippy::cast_possible_truncation)]
fn exact_integer(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() <= MAX_EXACT_INTEGER).then_some(v as i64)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn decode_unsigned(v: f64) -> u64 {
    v as u64
}

/// Dense row-major `f64` matrix: one exported track, one row per detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl TrackMatrix {
    /// Matrix of the given shape with every cell set to `value`.
    #[must_use]
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Build from equally long rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WidthMismatch`] if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        let count = rows.len();
        for row in rows {
            if row.len() != cols {
                return Err(Error::WidthMismatch {
                    track: 0,
                    expected: cols,
                    found: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            rows: count,
            cols,
            data,
        })
    }

    /// Assemble from row-major cells already encoded at width `cols`.
    pub(crate) fn from_encoded(cols: usize, data: Vec<f64>) -> Self {
        debug_assert!(cols > 0 && data.len() % cols == 0);
        Self {
            rows: data.len() / cols,
            cols,
            data,
        }
    }

    /// Number of rows (timeline positions).
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (fixed fields plus padded pixels).
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Check if the matrix has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows()`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        assert!(i < self.rows, "row {i} out of bounds ({} rows)", self.rows);
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterate rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.rows).map(move |i| self.row(i))
    }

    /// Cell values, row-major.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Whether `data` holds exactly `rows * cols` cells.
    ///
    /// Always true for matrices built through this API; deserialized
    /// matrices must be checked.
    #[must_use]
    pub fn is_shape_consistent(&self) -> bool {
        self.rows
            .checked_mul(self.cols)
            .is_some_and(|cells| cells == self.data.len())
    }
}
