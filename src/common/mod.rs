pub mod error;
pub mod math;
pub mod spectrum;

pub use error::{ExportError, Result};
pub use spectrum::SpectralDistribution;

/// Canonical wavelength grid every exported spectrum is resampled onto.
pub const MITSUBA_SHAPE: SpectralShape = SpectralShape {
    start: 360.0,
    end: 830.0,
    interval: 5.0,
};

/// Evenly spaced wavelength grid in nanometers, both ends inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpectralShape {
    start: f64,
    end: f64,
    interval: f64,
}

impl SpectralShape {
    pub fn new(start: f64, end: f64, interval: f64) -> Result<Self> {
        if !(start.is_finite() && end.is_finite() && interval.is_finite()) {
            return Err(ExportError::InvalidShape(format!(
                "({}, {}, {}) is not finite",
                start, end, interval
            )));
        }
        if interval <= 0.0 {
            return Err(ExportError::InvalidShape(format!(
                "interval {} must be positive",
                interval
            )));
        }
        if end < start {
            return Err(ExportError::InvalidShape(format!(
                "end {} lies before start {}",
                end, start
            )));
        }

        Ok(SpectralShape {
            start,
            end,
            interval,
        })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Number of grid points. A validated shape always holds at least one.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        ((self.end - self.start) / self.interval).round() as usize + 1
    }

    /// Grid wavelengths, computed as `start + i * interval` so no rounding error
    /// accumulates along the range.
    pub fn range(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| self.start + i as f64 * self.interval)
            .collect()
    }
}

impl Default for SpectralShape {
    fn default() -> Self {
        MITSUBA_SHAPE
    }
}
