use super::spectrum::SpectralDistribution;
use itertools::Itertools;

pub fn lerp(t: f64, a: f64, b: f64) -> f64 {
    (1.0 - t) * a + t * b
}

/// Index of the last node satisfying `pred`, clamped to a valid interval start.
pub fn find_interval<T: Fn(usize) -> bool>(size: usize, pred: T) -> usize {
    let mut first = 0;
    let mut len = size;

    while len > 0 {
        let half = len >> 1;
        let middle = first + half;
        if pred(middle) {
            first = middle + 1;
            len -= half + 1;
        } else {
            len = half;
        }
    }

    first.saturating_sub(1).min(size.saturating_sub(2))
}

/// Trapezoidal quadrature of `ys` over the abscissae `xs`.
pub fn trapz(xs: &[f64], ys: &[f64]) -> f64 {
    xs.iter()
        .zip(ys)
        .tuple_windows()
        .map(|((x0, y0), (x1, y1))| (x1 - x0) * (y0 + y1) * 0.5)
        .sum()
}

pub fn integrate(sd: &SpectralDistribution) -> f64 {
    trapz(sd.wavelengths(), sd.values())
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Minimum {
    pub x: f64,
    pub fx: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Derivative free minimisation of a scalar objective starting at `seed`.
pub trait ScalarMinimizer {
    fn minimize(&self, objective: &dyn Fn(f64) -> f64, seed: f64) -> Minimum;
}

/// One dimensional Nelder-Mead simplex search.
#[derive(Clone, Copy, Debug)]
pub struct NelderMead {
    pub max_iterations: usize,
    pub xatol: f64,
    pub fatol: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        NelderMead {
            max_iterations: 1000,
            xatol: 1e-12,
            fatol: 1e-12,
        }
    }
}

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

impl ScalarMinimizer for NelderMead {
    fn minimize(&self, objective: &dyn Fn(f64) -> f64, seed: f64) -> Minimum {
        let step = if seed != 0.0 { 0.05 * seed } else { 0.00025 };
        let mut simplex = [(seed, objective(seed)), (seed + step, objective(seed + step))];

        for iteration in 0..self.max_iterations {
            if simplex[1].1 < simplex[0].1 {
                simplex.swap(0, 1);
            }
            let (best, worst) = (simplex[0], simplex[1]);

            if (worst.0 - best.0).abs() <= self.xatol && (worst.1 - best.1).abs() <= self.fatol {
                return Minimum {
                    x: best.0,
                    fx: best.1,
                    iterations: iteration,
                    converged: true,
                };
            }

            // with a single dimension the centroid of the retained vertices is the best vertex
            let centroid = best.0;
            let xr = centroid + REFLECTION * (centroid - worst.0);
            let fr = objective(xr);

            if fr < best.1 {
                let xe = centroid + EXPANSION * (xr - centroid);
                let fe = objective(xe);
                simplex[1] = if fe < fr { (xe, fe) } else { (xr, fr) };
                continue;
            }

            if fr < worst.1 {
                let xc = centroid + CONTRACTION * (xr - centroid);
                let fc = objective(xc);
                if fc <= fr {
                    simplex[1] = (xc, fc);
                    continue;
                }
            } else {
                let xcc = centroid + CONTRACTION * (worst.0 - centroid);
                let fcc = objective(xcc);
                if fcc < worst.1 {
                    simplex[1] = (xcc, fcc);
                    continue;
                }
            }

            let xs = best.0 + SHRINK * (worst.0 - best.0);
            simplex[1] = (xs, objective(xs));
        }

        if simplex[1].1 < simplex[0].1 {
            simplex.swap(0, 1);
        }

        Minimum {
            x: simplex[0].0,
            fx: simplex[0].1,
            iterations: self.max_iterations,
            converged: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trapz() {
        assert_eq!(trapz(&[], &[]), 0.0);
        assert_eq!(trapz(&[400.0], &[3.0]), 0.0);
        assert_eq!(trapz(&[0.0, 1.0, 3.0], &[1.0, 1.0, 1.0]), 3.0);
        approx::assert_relative_eq!(trapz(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0]), 2.0);
    }

    #[test]
    fn test_find_interval() {
        let nodes = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(find_interval(nodes.len(), |i| nodes[i] <= 0.5), 0);
        assert_eq!(find_interval(nodes.len(), |i| nodes[i] <= 2.0), 2);
        assert_eq!(find_interval(nodes.len(), |i| nodes[i] <= 3.0), 2);
        assert_eq!(find_interval(nodes.len(), |i| nodes[i] <= -1.0), 0);
    }

    #[test]
    fn test_nelder_mead_quadratic() {
        let minimum = NelderMead::default().minimize(&|x| (x - 3.0) * (x - 3.0), 1.0);
        assert!(minimum.converged);
        approx::assert_relative_eq!(minimum.x, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_nelder_mead_absolute_residual() {
        // same shape as the luminous flux objective: |a * s - 1|
        let minimum = NelderMead::default().minimize(&|s| (0.04 * s - 1.0).abs(), 1.0);
        assert!(minimum.converged);
        approx::assert_relative_eq!(minimum.x, 25.0, max_relative = 1e-8);
    }

    #[test]
    fn test_nelder_mead_reports_exhaustion() {
        let minimizer = NelderMead {
            max_iterations: 3,
            ..Default::default()
        };
        let minimum = minimizer.minimize(&|x| (x - 1000.0).abs(), 1.0);
        assert!(!minimum.converged);
        assert_eq!(minimum.iterations, 3);
    }
}
