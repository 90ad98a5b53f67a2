//! Detection Record - one eddy measured at one time step

use serde::{Deserialize, Serialize};

/// Immutable snapshot of one tracked eddy at one time step.
///
/// Once built, a detection never changes; tracking metadata (score,
/// confirmation, links) lives on the [`TrackNode`](crate::tree::TrackNode)
/// that wraps it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    lat: f64,
    lon: f64,
    surface_area: f64,
    amplitude: f64,
    thresh_found: f64,
    mean_geo_speed: f64,
    pixel_indices: Vec<u64>,
}

impl Detection {
    /// Create a detection with every attribute given.
    ///
    /// # Arguments
    ///
    /// * `lat`, `lon` - Centroid in degrees
    /// * `surface_area` - Shape metric
    /// * `amplitude` - Amplitude metric
    /// * `thresh_found` - Threshold at which the eddy was detected
    /// * `mean_geo_speed` - Mean propagation speed
    /// * `pixel_indices` - Spatial cells covered by the eddy
    #[must_use]
    pub fn new(
        lat: f64,
        lon: f64,
        surface_area: f64,
        amplitude: f64,
        thresh_found: f64,
        mean_geo_speed: f64,
        pixel_indices: Vec<u64>,
    ) -> Self {
        Self {
            lat,
            lon,
            surface_area,
            amplitude,
            thresh_found,
            mean_geo_speed,
            pixel_indices,
        }
    }

    /// Create a builder starting from a centroid; other metrics default to zero.
    #[must_use]
    pub fn builder(lat: f64, lon: f64) -> DetectionBuilder {
        DetectionBuilder::new(lat, lon)
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lon(&self) -> f64 {
        self.lon
    }

    /// Surface area of the eddy.
    #[must_use]
    pub const fn surface_area(&self) -> f64 {
        self.surface_area
    }

    /// Amplitude of the eddy.
    #[must_use]
    pub const fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Threshold at which the eddy was found.
    #[must_use]
    pub const fn thresh_found(&self) -> f64 {
        self.thresh_found
    }

    /// Mean geostrophic speed.
    #[must_use]
    pub const fn mean_geo_speed(&self) -> f64 {
        self.mean_geo_speed
    }

    /// Spatial cell identifiers, in detection order.
    #[must_use]
    pub fn pixel_indices(&self) -> &[u64] {
        &self.pixel_indices
    }

    /// Number of spatial cells.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.pixel_indices.len()
    }
}

/// Builder for `Detection`.
#[derive(Debug)]
pub struct DetectionBuilder {
    lat: f64,
    lon: f64,
    surface_area: f64,
    amplitude: f64,
    thresh_found: f64,
    mean_geo_speed: f64,
    pixel_indices: Vec<u64>,
}

impl DetectionBuilder {
    /// Create a new builder with the required centroid.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            surface_area: 0.0,
            amplitude: 0.0,
            thresh_found: 0.0,
            mean_geo_speed: 0.0,
            pixel_indices: Vec::new(),
        }
    }

    /// Set the surface area.
    #[must_use]
    pub const fn surface_area(mut self, surface_area: f64) -> Self {
        self.surface_area = surface_area;
        self
    }

    /// Set the amplitude.
    #[must_use]
    pub const fn amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Set the detection threshold.
    #[must_use]
    pub const fn thresh_found(mut self, thresh_found: f64) -> Self {
        self.thresh_found = thresh_found;
        self
    }

    /// Set the mean geostrophic speed.
    #[must_use]
    pub const fn mean_geo_speed(mut self, mean_geo_speed: f64) -> Self {
        self.mean_geo_speed = mean_geo_speed;
        self
    }

    /// Set the covered cells.
    #[must_use]
    pub fn pixel_indices(mut self, pixel_indices: impl Into<Vec<u64>>) -> Self {
        self.pixel_indices = pixel_indices.into();
        self
    }

    /// Build the `Detection`.
    #[must_use]
    pub fn build(self) -> Detection {
        Detection {
            lat: self.lat,
            lon: self.lon,
            surface_area: self.surface_area,
            amplitude: self.amplitude,
            thresh_found: self.thresh_found,
            mean_geo_speed: self.mean_geo_speed,
            pixel_indices: self.pixel_indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_builder_defaults() {
        let detection = Detection::builder(-30.5, 120.25).build();
        assert!((detection.lat() + 30.5).abs() < f64::EPSILON);
        assert!((detection.lon() - 120.25).abs() < f64::EPSILON);
        assert!(detection.amplitude().abs() < f64::EPSILON);
        assert_eq!(detection.pixel_count(), 0);
    }

    #[test]
    fn test_detection_builder_all_fields() {
        let detection = Detection::builder(1.0, 2.0)
            .surface_area(3.0)
            .amplitude(4.0)
            .thresh_found(5.0)
            .mean_geo_speed(6.0)
            .pixel_indices(vec![9, 8, 7])
            .build();

        let expected = Detection::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, vec![9, 8, 7]);
        assert_eq!(detection, expected);
        assert_eq!(detection.pixel_indices(), &[9, 8, 7]);
    }
}
