use fastrand::Rng;
use itertools::Itertools;
use num::{complex::Complex64, Zero};

use crate::{util::casting::usize_to_f64, Poly};

/// Initial guesses spread around an annulus that contains all roots.
///
/// The radius is interpolated between [`lower_bound`] and [`upper_bound`]
/// by `bias`, then every guess is perturbed radially and angularly by up to
/// `perturbation` (a fraction in `[0, 1]`). The angular step leaves a gap, so
/// guesses are never rotationally symmetric; some methods get stuck otherwise.
///
/// Deterministic for a given `seed`.
pub fn initial_guesses_annulus(
    poly: &Poly,
    seed: u64,
    bias: f64,
    perturbation: f64,
    out: &mut Vec<Complex64>,
    num: usize,
) {
    let n_asym = if num % 2 == 0 { num + 1 } else { num + 2 };
    let mut rng = Rng::with_seed(seed);
    let angle_increment = std::f64::consts::TAU / usize_to_f64(n_asym);
    let low = lower_bound(poly);
    let high = upper_bound(poly);
    let span = high - low;
    let radius = high * bias + low * (1.0 - bias);
    let mut angle_accumulator = 0.0;
    for _ in 0..num {
        let angle = angle_accumulator
            + rng
                .f64()
                .mul_add(angle_increment, -(angle_increment / 2.0))
                * perturbation;
        let radius =
            radius * (1.0 - perturbation) + rng.f64().mul_add(span, low) * perturbation;
        out.push(Complex64::from_polar(radius, angle));
        angle_accumulator += angle_increment;
    }
}

/// The radius of a disk containing all the roots.
///
/// Cauchy's bound `1 + max |a_i / a_n|`.
#[must_use]
pub fn upper_bound(poly: &Poly) -> f64 {
    debug_assert!(
        poly.degree_raw() >= 1,
        "there are no bounds for a polynomial with no roots"
    );

    let lead = poly.last();
    let max_term = poly.0[..poly.degree_raw()]
        .iter()
        .map(|c| (c / lead).norm())
        .fold(0.0, f64::max);
    1.0 + max_term
}

/// The radius of a disk containing none of the roots.
///
/// Zero if the polynomial has a root at zero.
#[must_use]
pub fn lower_bound(poly: &Poly) -> f64 {
    if poly.0[0].is_zero() {
        return 0.0;
    }
    let reversed = Poly::new(&poly.0.iter().copied().rev().collect_vec());
    upper_bound(&reversed).recip()
}

#[cfg(test)]
mod test {
    use super::{initial_guesses_annulus, lower_bound, upper_bound};
    use crate::Poly;

    #[test]
    fn bounds_enclose_roots() {
        let roots = [complex!(0.5), complex!(-2.0, 1.0), complex!(0.0, -3.0)];
        let p = Poly::from_roots(&roots);
        let low = lower_bound(&p);
        let high = upper_bound(&p);
        for z in roots {
            assert!(low <= z.norm() && z.norm() <= high, "{low} {z} {high}");
        }
    }

    #[test]
    fn zero_root_lower_bound() {
        assert_eq!(lower_bound(&poly![0.0, 1.0, 1.0]), 0.0);
    }

    #[test]
    fn guesses_are_deterministic_and_distinct() {
        let p = poly![1.0, 2.0, 3.0, 4.0, 5.0];
        let mut a = vec![];
        let mut b = vec![];
        initial_guesses_annulus(&p, 1, 0.5, 0.5, &mut a, 4);
        initial_guesses_annulus(&p, 1, 0.5, 0.5, &mut b, 4);
        assert_eq!(a, b);
        for i in 0..a.len() {
            for j in (i + 1)..a.len() {
                assert!((a[i] - a[j]).norm() > 0.0);
            }
        }
    }
}
