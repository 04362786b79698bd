use super::{
    error::{ExportError, Result},
    math::{find_interval, lerp},
    SpectralShape,
};
use std::ops::{Div, DivAssign, Mul, MulAssign};

/// Named spectral distribution sampled at strictly increasing wavelengths.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectralDistribution {
    name: String,
    wavelengths: Vec<f64>,
    values: Vec<f64>,
}

impl SpectralDistribution {
    pub fn new(name: impl Into<String>, wavelengths: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        let invalid = |reason: String| ExportError::InvalidSpectrum {
            name: name.clone(),
            reason,
        };

        if wavelengths.is_empty() {
            return Err(invalid(String::from("no samples")));
        }
        if wavelengths.len() != values.len() {
            return Err(invalid(format!(
                "{} wavelengths but {} values",
                wavelengths.len(),
                values.len()
            )));
        }
        if let Some(bad) = wavelengths
            .iter()
            .chain(values.iter())
            .find(|v| !v.is_finite())
        {
            return Err(invalid(format!("non finite sample {}", bad)));
        }
        if let Some(pair) = wavelengths.windows(2).find(|pair| pair[1] <= pair[0]) {
            return Err(invalid(format!(
                "wavelengths not strictly increasing at {} -> {}",
                pair[0], pair[1]
            )));
        }

        Ok(SpectralDistribution {
            name,
            wavelengths,
            values,
        })
    }

    pub fn from_pairs(name: impl Into<String>, pairs: &[(f64, f64)]) -> Result<Self> {
        let (wavelengths, values): (Vec<f64>, Vec<f64>) = pairs.iter().cloned().unzip();
        Self::new(name, wavelengths, values)
    }

    /// Samples `f` over every wavelength of `shape`.
    pub fn from_shape<F: Fn(f64) -> f64>(
        name: impl Into<String>,
        shape: &SpectralShape,
        f: F,
    ) -> Result<Self> {
        let wavelengths = shape.range();
        let values = wavelengths.iter().map(|&lambda| f(lambda)).collect();
        Self::new(name, wavelengths, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.wavelengths
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
    }

    /// Linearly interpolated value at `lambda`; outside the sampled support the
    /// nearest boundary value is held.
    pub fn value_at(&self, lambda: f64) -> f64 {
        let last = self.wavelengths.len() - 1;
        if lambda <= self.wavelengths[0] {
            return self.values[0];
        }
        if lambda >= self.wavelengths[last] {
            return self.values[last];
        }

        let i = find_interval(self.wavelengths.len(), |i| self.wavelengths[i] <= lambda);
        let (x0, x1) = (self.wavelengths[i], self.wavelengths[i + 1]);
        lerp((lambda - x0) / (x1 - x0), self.values[i], self.values[i + 1])
    }

    /// Resamples onto exactly the grid of `shape`.
    pub fn align(&self, shape: &SpectralShape) -> Self {
        let wavelengths = shape.range();
        let values = wavelengths
            .iter()
            .map(|&lambda| self.value_at(lambda))
            .collect();

        SpectralDistribution {
            name: self.name.clone(),
            wavelengths,
            values,
        }
    }

    pub fn is_uniform(&self) -> bool {
        match self.wavelengths.as_slice() {
            [first, second, ..] => {
                let interval = second - first;
                self.wavelengths
                    .windows(2)
                    .all(|pair| pair[1] - pair[0] == interval)
            }
            _ => true,
        }
    }

    pub fn max_value(&self) -> f64 {
        self.values.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
    }
}

impl MulAssign<f64> for SpectralDistribution {
    fn mul_assign(&mut self, rhs: f64) {
        self.values.iter_mut().for_each(|v| *v *= rhs);
    }
}

impl Mul<f64> for SpectralDistribution {
    type Output = Self;

    fn mul(mut self, rhs: f64) -> Self::Output {
        self *= rhs;
        self
    }
}

impl Mul<f64> for &SpectralDistribution {
    type Output = SpectralDistribution;

    fn mul(self, rhs: f64) -> Self::Output {
        self.clone() * rhs
    }
}

impl DivAssign<f64> for SpectralDistribution {
    fn div_assign(&mut self, rhs: f64) {
        self.values.iter_mut().for_each(|v| *v /= rhs);
    }
}

impl Div<f64> for SpectralDistribution {
    type Output = Self;

    fn div(mut self, rhs: f64) -> Self::Output {
        self /= rhs;
        self
    }
}

impl Div<f64> for &SpectralDistribution {
    type Output = SpectralDistribution;

    fn div(self, rhs: f64) -> Self::Output {
        self.clone() / rhs
    }
}
