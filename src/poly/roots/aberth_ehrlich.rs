use num::{complex::Complex64, One, Zero};

use crate::{
    error::{Error, Result},
    util::{self, complex::c_is_finite},
    Poly,
};

/// Find all roots using Aberth Ehrlich method.
///
/// Stops when every correction satisfies `|delta|^2 <= epsilon`.
///
/// # Caveats
/// This method performs poorly around zero roots, so you should remove them
/// first (zero roots are trivial to factor out).
///
/// # Errors
/// - `NoConverge`: `max_iter` was reached, or an iterate stopped being finite.
///   The last finite guesses are returned with the error.
///
/// # Panics
/// If the provided guesses are not unique, i.e. if two or more are the same.
///
/// If the number of provided guesses is wrong, there must be exactly one guess
/// per root, i.e. as many guesses as the degree of the polynomial.
pub fn aberth_ehrlich(
    poly: &Poly,
    epsilon: Option<f64>,
    max_iter: Option<usize>,
    initial_guesses: &[Complex64],
) -> Result<Vec<Complex64>> {
    debug_assert!(poly.is_normalized());

    let n = poly.degree_raw();
    assert_eq!(initial_guesses.len(), n, "need exactly one guess per root");
    for i in 0..n {
        for j in (i + 1)..n {
            assert!(
                (initial_guesses[i] - initial_guesses[j]).norm_sqr() > 0.0,
                "initial guesses must be distinct"
            );
        }
    }

    let epsilon = epsilon.unwrap_or(f64::EPSILON * f64::EPSILON);

    if n == 0 {
        return Ok(vec![]);
    }

    let mut poly = poly.clone();
    poly.make_monic();
    debug_assert!(poly.is_monic());
    let p_diff = poly.diff();

    let mut points = initial_guesses.to_vec();
    let mut alphas_buff = vec![Complex64::zero(); n];
    let mut betas_buff = vec![Complex64::zero(); n];

    for i in util::iterator::saturating_counter() {
        if max_iter.is_some_and(|max| i > max) {
            return Err(Error::NoConverge(points));
        }

        alphas(&poly, &p_diff, &points, &mut alphas_buff);
        betas(&points, &mut betas_buff);

        // alphas become deltas in-place
        for (a, b) in alphas_buff.iter_mut().zip(betas_buff.iter()) {
            *a /= Complex64::one() - *a * b;
        }
        let deltas_buff = &alphas_buff;

        if !deltas_buff.iter().copied().all(c_is_finite) {
            log::trace!("aberth-ehrlich diverged at iteration {i}");
            return Err(Error::NoConverge(points));
        }

        for (y, d) in points.iter_mut().zip(deltas_buff.iter()) {
            *y -= d;
        }

        log::trace!("{points:?}");

        // stopping criteria
        if deltas_buff.iter().all(|d| d.norm_sqr() <= epsilon) {
            return Ok(points);
        }
    }
    unreachable!();
}

/// Alpha coefficients of the Aberth-Ehrlich method, the Newton corrections
/// `p(x) / p'(x)`
///
/// Needs `points.len() == out.len()`.
fn alphas(poly: &Poly, p_diff: &Poly, points: &[Complex64], out: &mut [Complex64]) {
    debug_assert_eq!(points.len(), out.len());

    for (y, x) in out.iter_mut().zip(points) {
        let mut d = p_diff.eval(*x);
        if d.is_zero() {
            // stationary point, nudge instead of dividing by zero
            d = Complex64::new(f64::EPSILON, 0.0);
        }
        *y = poly.eval(*x) / d;
    }
}

/// Beta coefficients of the Aberth-Ehrlich method
///
/// Needs `points.len() == out.len()`.
fn betas(points: &[Complex64], out: &mut [Complex64]) {
    debug_assert_eq!(points.len(), out.len());

    let n = points.len();
    out.fill(Complex64::zero());
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            out[i] += Complex64::one() / (points[i] - points[j]);
        }
    }
}

#[cfg(test)]
mod test {
    use super::aberth_ehrlich;
    use crate::{
        poly::roots::initial_guesses_annulus, util::__testing::check_roots, Error, Poly,
    };

    fn guesses(p: &Poly) -> Vec<num::complex::Complex64> {
        let mut out = vec![];
        initial_guesses_annulus(p, 1, 0.5, 0.5, &mut out, p.degree_raw());
        out
    }

    #[test]
    fn degree_3() {
        let roots_expected = vec![complex!(1.0), complex!(2.0), complex!(3.0)];
        let p = Poly::from_roots(&roots_expected);
        let roots = aberth_ehrlich(&p, Some(1E-24), Some(100), &guesses(&p)).unwrap();
        assert!(check_roots(roots, roots_expected, 1E-10));
    }

    #[test]
    fn degree_3_complex() {
        let roots_expected = vec![complex!(1.0), complex!(0.0, 1.0), complex!(0.0, -1.0)];
        let p = Poly::from_roots(&roots_expected);
        let roots = aberth_ehrlich(&p, Some(1E-24), Some(100), &guesses(&p)).unwrap();
        assert!(check_roots(roots, roots_expected, 1E-10));
    }

    #[test]
    fn degree_5_multiplicity_3() {
        let roots_expected = vec![
            complex!(1.0),
            complex!(2.0),
            complex!(2.0),
            complex!(2.0),
            complex!(3.0),
        ];
        let p = Poly::from_roots(&roots_expected);
        // multiple roots only converge linearly, accept whatever is there
        let roots = match aberth_ehrlich(&p, Some(1E-16), Some(200), &guesses(&p)) {
            Ok(roots) | Err(Error::NoConverge(roots)) => roots,
            Err(e) => panic!("{e}"),
        };
        assert!(
            check_roots(roots.clone(), roots_expected, 1E-3),
            "{roots:?}"
        );
    }

    #[test]
    fn max_iter_returns_best_guesses() {
        let p = Poly::from_roots(&[complex!(1.0), complex!(2.0), complex!(3.0)]);
        match aberth_ehrlich(&p, Some(0.0), Some(1), &guesses(&p)) {
            Err(Error::NoConverge(best)) => assert_eq!(best.len(), 3),
            other => panic!("{other:?}"),
        }
    }
}
