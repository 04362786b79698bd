pub mod cie;

use crate::common::{
    math::trapz, ExportError, Result, SpectralDistribution, SpectralShape, MITSUBA_SHAPE,
};
use cie::{K_M, PHOTOPIC_V};

/// Photometric integrator.
pub trait Photometer {
    fn luminous_flux(&self, sd: &SpectralDistribution) -> f64;
}

/// Luminous flux under the CIE 1924 photopic observer.
#[derive(Clone, Copy, Debug, Default)]
pub struct PhotopicPhotometer;

impl Photometer for PhotopicPhotometer {
    fn luminous_flux(&self, sd: &SpectralDistribution) -> f64 {
        let sd = sd.align(&MITSUBA_SHAPE);
        let weighted: Vec<f64> = sd
            .values()
            .iter()
            .zip(PHOTOPIC_V.iter())
            .map(|(s, v)| s * v)
            .collect();

        K_M * trapz(sd.wavelengths(), &weighted)
    }
}

/// Synthesizes single peak emission spectra.
pub trait SpectralGenerator {
    fn single_peak(&self, center: f64, fwhm: f64) -> Result<SpectralDistribution>;
}

/// Ohno (2005) single LED model sampled on a fixed shape.
#[derive(Clone, Copy, Debug)]
pub struct OhnoLed {
    shape: SpectralShape,
}

impl OhnoLed {
    pub fn new(shape: SpectralShape) -> Self {
        OhnoLed { shape }
    }

    pub fn shape(&self) -> &SpectralShape {
        &self.shape
    }
}

impl Default for OhnoLed {
    fn default() -> Self {
        Self::new(MITSUBA_SHAPE)
    }
}

impl SpectralGenerator for OhnoLed {
    fn single_peak(&self, center: f64, fwhm: f64) -> Result<SpectralDistribution> {
        let name = format!("{}nm - {} FWHM LED - Ohno (2005)", center, fwhm);
        if !(fwhm > 0.0 && fwhm.is_finite() && center.is_finite()) {
            return Err(ExportError::InvalidSpectrum {
                name,
                reason: format!("cannot synthesize a peak of width {}", fwhm),
            });
        }

        SpectralDistribution::from_shape(name, &self.shape, |lambda| {
            let g = (-((lambda - center) / fwhm).powi(2)).exp();
            (g + 2.0 * g.powi(5)) / 3.0
        })
    }
}

/// Flat equal-energy reference illuminant.
pub fn illuminant_e(shape: &SpectralShape) -> Result<SpectralDistribution> {
    SpectralDistribution::from_shape("E", shape, |_| 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::math::integrate;

    #[test]
    fn test_illuminant_e_integral() {
        let e = illuminant_e(&MITSUBA_SHAPE).unwrap();
        assert_eq!(e.len(), 95);
        approx::assert_relative_eq!(integrate(&e), 470.0);
    }

    #[test]
    fn test_luminous_flux_of_equal_energy() {
        let e = illuminant_e(&MITSUBA_SHAPE).unwrap();
        let expected = K_M * trapz(&MITSUBA_SHAPE.range(), &PHOTOPIC_V);
        approx::assert_relative_eq!(PhotopicPhotometer.luminous_flux(&e), expected);
        approx::assert_relative_eq!(
            PhotopicPhotometer.luminous_flux(&(e * 2.0)),
            2.0 * expected,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_ohno_led_peaks_at_center() {
        let sd = OhnoLed::default().single_peak(550.0, 20.0).unwrap();
        assert_eq!(sd.name(), "550nm - 20 FWHM LED - Ohno (2005)");
        assert_eq!(sd.len(), 95);
        approx::assert_relative_eq!(sd.value_at(550.0), 1.0);
        approx::assert_relative_eq!(sd.max_value(), 1.0);
        assert!(sd.value_at(400.0) < 1e-12);
    }

    #[test]
    fn test_ohno_led_rejects_degenerate_width() {
        assert!(OhnoLed::default().single_peak(550.0, 0.0).is_err());
        assert!(OhnoLed::default().single_peak(550.0, -5.0).is_err());
    }

    #[test]
    fn test_ohno_led_samples_its_shape() {
        let shape = SpectralShape::new(500.0, 600.0, 10.0).unwrap();
        let generator = OhnoLed::new(shape);
        assert_eq!(generator.shape(), &shape);

        let sd = generator.single_peak(550.0, 20.0).unwrap();
        assert_eq!(sd.len(), 11);
        assert_eq!(sd.wavelengths()[0], 500.0);
        assert_eq!(sd.wavelengths()[10], 600.0);

        // a zero interval never reaches the generator
        assert!(SpectralShape::new(360.0, 830.0, 0.0).is_err());
    }

    #[test]
    fn test_green_led_is_brighter_than_blue() {
        let generator = OhnoLed::default();
        let green = generator.single_peak(555.0, 20.0).unwrap();
        let blue = generator.single_peak(450.0, 20.0).unwrap();
        assert!(PhotopicPhotometer.luminous_flux(&green) > PhotopicPhotometer.luminous_flux(&blue));
    }
}
