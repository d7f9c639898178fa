//! Testing utilities, do not depend on any of these in production!

use fastrand::Rng;
use itertools::Itertools;
use num::complex::Complex64;

use crate::Poly;

/// Replace non-finite and subnormal values, so generated test cases are
/// always well defined.
fn f64_make_safe(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    if x.is_infinite() {
        return x.signum() * f64::MAX;
    }
    if x.is_subnormal() {
        return 0.0;
    }
    x
}

struct RandStreamF64 {
    state: Rng,
}

impl RandStreamF64 {
    fn new(seed: u64) -> Self {
        Self {
            state: Rng::with_seed(seed),
        }
    }
}

impl Iterator for RandStreamF64 {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        Some(f64_make_safe(self.state.f64()))
    }
}

/// Real values in `[min, max)`, as complex numbers.
pub struct RandStreamR64 {
    real_stream: RandStreamF64,
    min: f64,
    max: f64,
}

impl RandStreamR64 {
    #[must_use]
    pub fn new(seed: u64, min: f64, max: f64) -> Self {
        assert!(min <= max, "minimum should be smaller or equal to maximum");
        Self {
            real_stream: RandStreamF64::new(seed),
            min,
            max,
        }
    }
}

impl Iterator for RandStreamR64 {
    type Item = Complex64;

    fn next(&mut self) -> Option<Self::Item> {
        let re = (self.real_stream.next()?).mul_add(self.max - self.min, self.min);
        Some(Complex64::new(f64_make_safe(re), 0.0))
    }
}

/// Complex values, uniform in a rectangle.
pub struct RandStreamC64Cartesian {
    real_stream: RandStreamF64,
    min_re: f64,
    max_re: f64,
    min_im: f64,
    max_im: f64,
}

impl RandStreamC64Cartesian {
    #[must_use]
    pub fn new(seed: u64, min_re: f64, max_re: f64, min_im: f64, max_im: f64) -> Self {
        assert!(
            min_re <= max_re && min_im <= max_im,
            "minimum should be smaller or equal to maximum"
        );
        Self {
            real_stream: RandStreamF64::new(seed),
            min_re,
            max_re,
            min_im,
            max_im,
        }
    }
}

impl Iterator for RandStreamC64Cartesian {
    type Item = Complex64;

    fn next(&mut self) -> Option<Self::Item> {
        let re = (self.real_stream.next()?).mul_add(self.max_re - self.min_re, self.min_re);
        let im = (self.real_stream.next()?).mul_add(self.max_im - self.min_im, self.min_im);
        Some(Complex64::new(f64_make_safe(re), f64_make_safe(im)))
    }
}

/// Complex values, uniform in radius and angle. Angles are given in turns,
/// in the range `[0, 1]`.
pub struct RandStreamC64Polar {
    real_stream: RandStreamF64,
    min_radius: f64,
    max_radius: f64,
    min_angle: f64,
    max_angle: f64,
}

impl RandStreamC64Polar {
    #[must_use]
    pub fn new(
        seed: u64,
        min_radius: f64,
        max_radius: f64,
        min_angle: f64,
        max_angle: f64,
    ) -> Self {
        assert!(
            0.0 <= min_angle && max_angle <= 1.0,
            "angles should be specified in the range [0,1]"
        );
        assert!(
            min_angle <= max_angle,
            "min_angle should be smaller or equal to max_angle"
        );
        assert!(0.0 <= min_radius, "radius should be non-negative");
        assert!(
            min_radius <= max_radius,
            "min_radius should be smaller or equal to max_radius"
        );
        Self {
            real_stream: RandStreamF64::new(seed),
            min_radius,
            max_radius,
            min_angle,
            max_angle,
        }
    }
}

impl Iterator for RandStreamC64Polar {
    type Item = Complex64;

    fn next(&mut self) -> Option<Self::Item> {
        let r =
            (self.real_stream.next()?).mul_add(self.max_radius - self.min_radius, self.min_radius);
        let a = (self.real_stream.next()?).mul_add(self.max_angle - self.min_angle, self.min_angle);
        debug_assert!(r >= 0.0);
        let c = Complex64::from_polar(r, a * std::f64::consts::TAU);
        Some(Complex64::new(f64_make_safe(c.re), f64_make_safe(c.im)))
    }
}

/// Pairs every value of the upstream iterator with its conjugate.
pub struct RandStreamConjugate64<I: Iterator<Item = Complex64>> {
    upstream: I,
}

impl<I: Iterator<Item = Complex64>> RandStreamConjugate64<I> {
    pub const fn new(upstream: I) -> Self {
        Self { upstream }
    }
}

impl<I: Iterator<Item = Complex64>> Iterator for RandStreamConjugate64<I> {
    type Item = (Complex64, Complex64);

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.upstream.next()?;
        Some((c, c.conj()))
    }
}

fn scaled(poly: &Poly, factor: Complex64) -> Poly {
    Poly::new(&poly.as_slice().iter().map(|c| c * factor).collect_vec())
}

/// Generate one test case where the roots are known and can be compared
pub fn test_case_roots(
    roots_stream: impl Iterator<Item = Complex64>,
    mut scale_stream: impl Iterator<Item = Complex64>,
    degree: usize,
) -> (Poly, Vec<Complex64>) {
    let roots = roots_stream.take(degree).collect_vec();
    let poly = scaled(
        &Poly::from_roots(&roots),
        scale_stream.next().expect("rng stream should be infinite"),
    );
    (poly, roots)
}

/// Generate one test case where the roots are known and can be compared, this
/// makes conjugate roots.
pub fn test_case_conj_roots(
    roots_stream: impl Iterator<Item = Complex64>,
    mut scale_stream: impl Iterator<Item = Complex64>,
    degree: usize,
) -> (Poly, Vec<Complex64>) {
    let roots = RandStreamConjugate64::new(roots_stream)
        .take((degree + 1) / 2)
        .flat_map(|(r1, r2)| [r1, r2])
        .collect_vec();
    let poly = scaled(
        &Poly::from_roots(&roots),
        scale_stream.next().expect("rng stream should be infinite"),
    );
    (poly, roots)
}

/// Check that all roots have been found
#[must_use]
pub fn check_roots(roots1: Vec<Complex64>, mut roots2: Vec<Complex64>, tol: f64) -> bool {
    if roots1.len() != roots2.len() {
        return false;
    }

    for r1 in roots1 {
        let mut best_idx = 0;
        let mut best_d = f64::MAX;
        for (i, r2) in roots2.iter().enumerate() {
            let d = (r1 - r2).norm();
            if d < best_d {
                best_idx = i;
                best_d = d;
            }
        }
        if best_d > tol {
            return false;
        }
        roots2.remove(best_idx);
    }
    true
}
