//! Polishing root estimates on the searched function itself.

use num::{complex::Complex64, Zero};

use crate::{function::ComplexFunction, util::complex::c_is_finite};

/// Relative step size below which an iteration counts as converged, even if
/// the requested tolerance is out of reach.
const STAGNATION: f64 = 1E-8;

/// Outcome of [`muller`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Refinement {
    /// A root of the deflated function.
    Found(Complex64),

    /// The iteration could not produce a root: it stalled on a flat region,
    /// overflowed or ran out of iterations.
    Exhausted,
}

/// Muller's method on `f(z) / Π (z - r)` for every `r` in `deflate`, so that
/// roots that were already accepted are not found again.
///
/// Starts from `z0` (the best estimate), `z1` and their midpoint. Converges
/// when a step is no longer than `tolerance` (or a few ulps of the iterate),
/// or when the iteration stalls just above round-off.
///
/// ```
/// use contour_roots::{complex, muller, Refinement};
/// use num::complex::Complex64;
///
/// let f = |z: Complex64| z * z + 1.0;
/// let Refinement::Found(z) = muller(&f, complex!(0.1, 0.9), complex!(0.2, 0.9), 1E-15, &[], 50) else {
///     panic!("should converge");
/// };
/// assert!((z - complex!(0.0, 1.0)).norm() < 1E-14);
///
/// // the only other root is -i
/// let Refinement::Found(z) = muller(&f, complex!(0.1, 0.9), complex!(0.2, 0.9), 1E-15, &[z], 50) else {
///     panic!("should converge");
/// };
/// assert!((z - complex!(0.0, -1.0)).norm() < 1E-14);
/// ```
pub fn muller<F: ComplexFunction + ?Sized>(
    f: &F,
    z0: Complex64,
    z1: Complex64,
    tolerance: f64,
    deflate: &[Complex64],
    max_iter: usize,
) -> Refinement {
    let g = |z: Complex64| {
        deflate
            .iter()
            .fold(f.eval(z), |acc, r| acc / (z - r))
    };

    let mut x0 = z1;
    let mut x1 = (z0 + z1) * 0.5;
    let mut x2 = z0;
    let mut f0 = g(x0);
    let mut f1 = g(x1);
    let mut f2 = g(x2);
    let mut last_step = f64::INFINITY;

    for i in 0..max_iter {
        if !(c_is_finite(f0) && c_is_finite(f1) && c_is_finite(f2)) {
            log::trace!("muller: non-finite value at iteration {i}");
            return Refinement::Exhausted;
        }
        if f2.is_zero() {
            return Refinement::Found(x2);
        }

        let h1 = x1 - x0;
        let h2 = x2 - x1;
        let d1 = (f1 - f0) / h1;
        let d2 = (f2 - f1) / h2;
        let a = (d2 - d1) / (h2 + h1);
        let b = a * h2 + d2;
        let disc = (b * b - a * f2 * 4.0).sqrt();
        let den = if (b + disc).norm() >= (b - disc).norm() {
            b + disc
        } else {
            b - disc
        };
        if den.is_zero() || !c_is_finite(den) {
            if last_step <= STAGNATION * x2.norm().max(1.0) {
                // the samples are equal up to round-off around a multiple root
                return Refinement::Found(x2);
            }
            log::trace!("muller: flat parabola at iteration {i}");
            return Refinement::Exhausted;
        }

        let dx = f2 * -2.0 / den;
        let x3 = x2 + dx;
        if !c_is_finite(x3) {
            return Refinement::Exhausted;
        }
        log::trace!("muller: {{iteration: {i}, x: {x3}, step: {:e}}}", dx.norm());

        let step = dx.norm();
        let scale = x3.norm().max(1.0);
        if step <= tolerance.max(4.0 * f64::EPSILON * x3.norm()) {
            return Refinement::Found(x3);
        }
        if step <= STAGNATION * scale && step >= last_step {
            // round-off floor of f, steps stopped shrinking
            return Refinement::Found(x3);
        }
        last_step = step;

        (x0, x1, x2) = (x1, x2, x3);
        (f0, f1) = (f1, f2);
        f2 = g(x2);
    }

    if last_step <= STAGNATION * x2.norm().max(1.0) {
        return Refinement::Found(x2);
    }
    Refinement::Exhausted
}

#[cfg(test)]
mod test {
    use num::complex::Complex64;

    use super::{muller, Refinement};
    use crate::{Counted, Poly};

    #[test]
    fn linear() {
        let f = |z: Complex64| z - complex!(0.25, -0.5);
        let Refinement::Found(z) = muller(&f, complex!(1.0), complex!(1.1), 1E-15, &[], 50) else {
            panic!("no root");
        };
        assert!((z - complex!(0.25, -0.5)).norm() < 1E-15, "{z}");
    }

    #[test]
    fn complex_root_from_real_start() {
        let f = |z: Complex64| z * z + 4.0;
        let Refinement::Found(z) = muller(&f, complex!(0.5), complex!(0.6), 1E-15, &[], 50) else {
            panic!("no root");
        };
        assert!((z.norm() - 2.0).abs() < 1E-14 && z.re.abs() < 1E-14, "{z}");
    }

    #[test]
    fn sine() {
        let f = |z: Complex64| z.sin();
        let Refinement::Found(z) = muller(&f, complex!(3.0, 0.1), complex!(3.02, 0.1), 1E-15, &[], 50) else {
            panic!("no root");
        };
        assert!((z - complex!(std::f64::consts::PI)).norm() < 1E-14, "{z}");
    }

    #[test]
    fn deflation_skips_known_roots() {
        let f = |z: Complex64| (z - 1.0) * (z - 2.0);
        let Refinement::Found(z) = muller(&f, complex!(1.1), complex!(1.2), 1E-15, &[complex!(1.0)], 50) else {
            panic!("no root");
        };
        assert!((z - complex!(2.0)).norm() < 1E-12, "{z}");
    }

    #[test]
    fn double_root() {
        let a = complex!(0.3, 0.2);
        let f = Poly::from_roots(&[a, a]);
        let z0 = a + complex!(6E-9, 8E-9);
        let z1 = z0 + complex!(2.8E-3, 2.8E-3);
        let Refinement::Found(r1) = muller(&f, z0, z1, 1E-15, &[], 50) else {
            panic!("no first root");
        };
        assert!((r1 - a).norm() < 1E-7, "{r1}");

        let z0 = a - complex!(6E-9, 8E-9);
        let z1 = z0 + complex!(2.8E-3, 2.8E-3);
        let Refinement::Found(r2) = muller(&f, z0, z1, 1E-15, &[r1], 50) else {
            panic!("no second root");
        };
        assert!((r2 - a).norm() < 1E-7, "{r2}");
    }

    #[test]
    fn constant_is_exhausted() {
        let f = Counted::new(|_: Complex64| complex!(1.0));
        assert_eq!(
            muller(&f, complex!(0.0), complex!(0.1), 1E-15, &[], 50),
            Refinement::Exhausted
        );
        assert!(f.evaluations() <= 3);
    }

    #[test]
    fn everything_deflated_is_exhausted() {
        let f = |z: Complex64| z - 1.0;
        assert_eq!(
            muller(&f, complex!(1.1), complex!(1.2), 1E-15, &[complex!(1.0)], 50),
            Refinement::Exhausted
        );
    }
}
