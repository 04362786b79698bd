use crate::colorimetry::{illuminant_e, Photometer};
use crate::common::{
    math::{integrate, ScalarMinimizer},
    ExportError, Result, SpectralDistribution, SpectralShape, MITSUBA_SHAPE,
};
use std::ops::RangeInclusive;

/// Relative tolerance on the luminous flux reached by [`normalize_flux`].
pub const FLUX_TOLERANCE: f64 = 1e-6;

/// Geometric family of `K_f` targets, `base * 10^d` for each decade `d`.
#[derive(Clone, Debug, PartialEq)]
pub struct KfFamily {
    base: f64,
    decades: RangeInclusive<i32>,
}

impl KfFamily {
    pub fn new(base: f64, decades: RangeInclusive<i32>) -> Self {
        KfFamily { base, decades }
    }

    /// Family centered on the integral of `reference` over `shape`.
    pub fn from_reference(reference: &SpectralDistribution, shape: &SpectralShape) -> Result<Self> {
        let base = integrate(&reference.align(shape));
        if !(base > 0.0 && base.is_finite()) {
            return Err(ExportError::DegenerateNormalization {
                name: reference.name().to_owned(),
                denominator: base,
            });
        }

        Ok(Self::new(base, -2..=2))
    }

    /// Family derived from illuminant E over [`MITSUBA_SHAPE`].
    pub fn mitsuba() -> Result<Self> {
        Self::from_reference(&illuminant_e(&MITSUBA_SHAPE)?, &MITSUBA_SHAPE)
    }

    /// Single `K_f = 1` member: no energy normalization at all.
    pub fn identity() -> Self {
        Self::new(1.0, 0..=0)
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.base * factor, self.decades.clone())
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    pub fn values(&self) -> Vec<f64> {
        self.decades
            .clone()
            .map(|decade| {
                if decade < 0 {
                    self.base / 10f64.powi(-decade)
                } else {
                    self.base * 10f64.powi(decade)
                }
            })
            .collect()
    }
}

/// Rescales `sd` so its integral over `shape` equals `k_f`.
///
/// `k_f == 1` is the identity: the integral is not computed and `K_n = 1`.
pub fn normalize_energy(
    sd: &SpectralDistribution,
    k_f: f64,
    shape: &SpectralShape,
) -> Result<SpectralDistribution> {
    if k_f == 1.0 {
        return Ok(sd.clone());
    }

    let k_n = integrate(&sd.align(shape));
    if !(k_n > 0.0 && k_n.is_finite()) {
        return Err(ExportError::DegenerateNormalization {
            name: sd.name().to_owned(),
            denominator: k_n,
        });
    }

    Ok(sd / k_n * k_f)
}

/// Finds the scale `s` such that `luminous_flux(s * sd)` reaches `target`.
pub fn normalize_flux(
    sd: &SpectralDistribution,
    target: f64,
    photometer: &dyn Photometer,
    minimizer: &dyn ScalarMinimizer,
) -> Result<SpectralDistribution> {
    if !(target > 0.0 && target.is_finite()) {
        return Err(ExportError::DegenerateNormalization {
            name: sd.name().to_owned(),
            denominator: target,
        });
    }
    let flux = photometer.luminous_flux(sd);
    if !(flux > 0.0 && flux.is_finite()) {
        return Err(ExportError::DegenerateNormalization {
            name: sd.name().to_owned(),
            denominator: flux,
        });
    }

    let objective = |s: f64| (photometer.luminous_flux(&(sd * s)) / target - 1.0).abs();
    let minimum = minimizer.minimize(&objective, 1.0);

    let scaled = sd * minimum.x;
    let reached = photometer.luminous_flux(&scaled);
    if !minimum.converged || !approx::relative_eq!(reached, target, max_relative = FLUX_TOLERANCE)
    {
        return Err(ExportError::MinimizerNotConverged {
            name: sd.name().to_owned(),
            residual: (reached / target - 1.0).abs(),
            iterations: minimum.iterations,
        });
    }

    Ok(scaled)
}

/// Policy applied to one spectrum before it is handed to the scene builder.
///
/// Flux matched emitters skip the energy integral (`K_n = 1`) and only get
/// the `K_f` factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Normalization {
    /// Exported as measured, `K_f` is ignored.
    Passthrough,
    /// Energy normalized to `K_f`.
    Energy,
    /// Matched to a luminous flux, then scaled by `K_f` with `K_n = 1`.
    Flux { target: f64 },
}

pub struct Normalizer<'a> {
    shape: SpectralShape,
    photometer: &'a dyn Photometer,
    minimizer: &'a dyn ScalarMinimizer,
}

impl<'a> Normalizer<'a> {
    pub fn new(
        shape: SpectralShape,
        photometer: &'a dyn Photometer,
        minimizer: &'a dyn ScalarMinimizer,
    ) -> Self {
        Normalizer {
            shape,
            photometer,
            minimizer,
        }
    }

    pub fn normalize(
        &self,
        sd: &SpectralDistribution,
        normalization: Normalization,
        k_f: f64,
    ) -> Result<SpectralDistribution> {
        match normalization {
            Normalization::Passthrough => Ok(sd.clone()),
            Normalization::Energy => normalize_energy(sd, k_f, &self.shape),
            Normalization::Flux { target } => {
                let matched = normalize_flux(sd, target, self.photometer, self.minimizer)?;
                Ok(matched * k_f)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorimetry::{OhnoLed, PhotopicPhotometer, SpectralGenerator};
    use crate::common::math::{Minimum, NelderMead};
    use std::cell::Cell;

    /// Solves the linear flux problem in closed form without iterating.
    struct ExactScale {
        scale: f64,
        calls: Cell<usize>,
    }

    impl ScalarMinimizer for ExactScale {
        fn minimize(&self, objective: &dyn Fn(f64) -> f64, seed: f64) -> Minimum {
            assert_eq!(seed, 1.0);
            self.calls.set(self.calls.get() + 1);
            Minimum {
                x: self.scale,
                fx: objective(self.scale),
                iterations: 1,
                converged: true,
            }
        }
    }

    fn measured() -> SpectralDistribution {
        SpectralDistribution::from_pairs(
            "measured",
            &[(380.0, 10.0), (450.0, 60.0), (550.0, 120.0), (700.0, 40.0), (780.0, 5.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_kf_family_from_illuminant_e() {
        let family = KfFamily::mitsuba().unwrap();
        approx::assert_relative_eq!(family.base(), 470.0);

        let values = family.values();
        assert_eq!(values.len(), 5);
        approx::assert_relative_eq!(values[0], 4.7);
        approx::assert_relative_eq!(values[1], 47.0);
        approx::assert_relative_eq!(values[2], 470.0);
        approx::assert_relative_eq!(values[3], 4700.0);
        approx::assert_relative_eq!(values[4], 47000.0);

        let scaled = family.scaled(1.0 / 20.0);
        approx::assert_relative_eq!(scaled.base(), 23.5);
        assert_eq!(KfFamily::identity().values(), vec![1.0]);
    }

    #[test]
    fn test_energy_normalization_reaches_kf() {
        let sd = measured();
        for k_f in KfFamily::mitsuba().unwrap().values() {
            let normalized = normalize_energy(&sd, k_f, &MITSUBA_SHAPE).unwrap();
            approx::assert_relative_eq!(
                integrate(&normalized.align(&MITSUBA_SHAPE)),
                k_f,
                max_relative = 1e-6
            );
            assert_eq!(normalized.wavelengths(), sd.wavelengths());
        }
    }

    #[test]
    fn test_energy_normalization_identity() {
        let sd = measured();
        assert_eq!(normalize_energy(&sd, 1.0, &MITSUBA_SHAPE).unwrap(), sd);

        // the identity branch never integrates, so a zero spectrum passes through
        let black = SpectralDistribution::from_pairs("black", &[(400.0, 0.0), (700.0, 0.0)]).unwrap();
        assert_eq!(normalize_energy(&black, 1.0, &MITSUBA_SHAPE).unwrap(), black);
    }

    #[test]
    fn test_energy_normalization_guards_zero_integral() {
        let black = SpectralDistribution::from_pairs("black", &[(400.0, 0.0), (700.0, 0.0)]).unwrap();
        match normalize_energy(&black, 470.0, &MITSUBA_SHAPE) {
            Err(ExportError::DegenerateNormalization { name, denominator }) => {
                assert_eq!(name, "black");
                assert_eq!(denominator, 0.0);
            }
            other => panic!("expected a degenerate normalization, got {:?}", other),
        }
    }

    #[test]
    fn test_energy_normalization_guards_negative_integral() {
        let inverted =
            SpectralDistribution::from_pairs("inverted", &[(400.0, -0.5), (700.0, -0.25)]).unwrap();
        match normalize_energy(&inverted, 470.0, &MITSUBA_SHAPE) {
            Err(ExportError::DegenerateNormalization { name, denominator }) => {
                assert_eq!(name, "inverted");
                assert!(denominator < 0.0);
            }
            other => panic!("expected a degenerate normalization, got {:?}", other),
        }
    }

    #[test]
    fn test_flux_normalization_with_nelder_mead() {
        let generator = OhnoLed::default();
        let reference = generator.single_peak(555.0, 20.0).unwrap();
        let target = PhotopicPhotometer.luminous_flux(&reference);

        for center in &[450.0, 532.0, 630.0] {
            let sd = generator.single_peak(*center, 20.0).unwrap();
            let normalized =
                normalize_flux(&sd, target, &PhotopicPhotometer, &NelderMead::default()).unwrap();
            approx::assert_relative_eq!(
                PhotopicPhotometer.luminous_flux(&normalized),
                target,
                max_relative = FLUX_TOLERANCE
            );
        }
    }

    #[test]
    fn test_flux_normalization_with_mock_minimizer() {
        let sd = measured();
        let flux = PhotopicPhotometer.luminous_flux(&sd);
        let minimizer = ExactScale {
            scale: 3.0,
            calls: Cell::new(0),
        };

        let normalized = normalize_flux(&sd, 3.0 * flux, &PhotopicPhotometer, &minimizer).unwrap();
        assert_eq!(minimizer.calls.get(), 1);
        assert_eq!(normalized, &sd * 3.0);
    }

    #[test]
    fn test_flux_normalization_reports_unconverged_scale() {
        let sd = measured();
        let flux = PhotopicPhotometer.luminous_flux(&sd);
        let minimizer = ExactScale {
            scale: 2.0,
            calls: Cell::new(0),
        };

        match normalize_flux(&sd, 3.0 * flux, &PhotopicPhotometer, &minimizer) {
            Err(ExportError::MinimizerNotConverged { residual, .. }) => {
                approx::assert_relative_eq!(residual, 1.0 / 3.0, max_relative = 1e-9);
            }
            other => panic!("expected a convergence failure, got {:?}", other),
        }

        let exhausted = NelderMead {
            max_iterations: 2,
            ..Default::default()
        };
        assert!(matches!(
            normalize_flux(&sd, 1000.0 * flux, &PhotopicPhotometer, &exhausted),
            Err(ExportError::MinimizerNotConverged { .. })
        ));
    }

    #[test]
    fn test_flux_normalization_guards_degenerate_inputs() {
        let sd = measured();
        let minimizer = NelderMead::default();
        assert!(normalize_flux(&sd, 0.0, &PhotopicPhotometer, &minimizer).is_err());

        let black = SpectralDistribution::from_pairs("black", &[(400.0, 0.0), (700.0, 0.0)]).unwrap();
        assert!(matches!(
            normalize_flux(&black, 100.0, &PhotopicPhotometer, &minimizer),
            Err(ExportError::DegenerateNormalization { .. })
        ));
    }

    #[test]
    fn test_normalizer_branches() {
        let sd = measured();
        let minimizer = ExactScale {
            scale: 2.0,
            calls: Cell::new(0),
        };
        let normalizer = Normalizer::new(MITSUBA_SHAPE, &PhotopicPhotometer, &minimizer);

        let passthrough = normalizer
            .normalize(&sd, Normalization::Passthrough, 470.0)
            .unwrap();
        assert_eq!(passthrough, sd);

        let energy = normalizer.normalize(&sd, Normalization::Energy, 470.0).unwrap();
        approx::assert_relative_eq!(
            integrate(&energy.align(&MITSUBA_SHAPE)),
            470.0,
            max_relative = 1e-6
        );
        assert_eq!(minimizer.calls.get(), 0);

        // flux matched then scaled by K_f only, the energy integral is bypassed
        let target = 2.0 * PhotopicPhotometer.luminous_flux(&sd);
        let flux = normalizer
            .normalize(&sd, Normalization::Flux { target }, 10.0)
            .unwrap();
        assert_eq!(minimizer.calls.get(), 1);
        assert_eq!(flux, &sd * 2.0 * 10.0);
    }
}
