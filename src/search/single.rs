use std::f64::consts::TAU;

use num::complex::Complex64;

use crate::{
    error::{Error, Result},
    function::ComplexFunction,
    refine::{muller, Refinement},
    util::{
        complex::c_is_finite,
        linalg::{solve_rank_deficient, SquareMatrix},
    },
    Contour, Poly,
};

/// Normalized moments below this are treated as "no roots inside".
const ZERO_MOMENTS: f64 = 1E-10;

/// Pivots of the Hankel matrix smaller than this (relative to its largest
/// entry) do not count towards its rank.
const RANK_TOLERANCE: f64 = 1E-9;

/// Estimates further than this many diagonals from the center are dropped.
const FAR_AWAY: f64 = 1000.0;

/// Second Muller starting point, as a fraction of the diagonal.
const PERTURBATION: f64 = 1E-3;

const REFINE_TOLERANCE: f64 = 1E-15;
const REFINE_MAX_ITER: usize = 50;

const POLY_EPSILON: f64 = 1E-24;
const POLY_MAX_ITER: usize = 100;

/// Roots of the function inside `contour`, from one set of its moments.
///
/// The moments (as returned by [`Contour::boundary_moments`]) determine a
/// monic polynomial in the contour-local coordinate whose roots estimate the
/// zeros of the function. Each estimate is polished with [`muller`] on the
/// function itself, deflated by the roots accepted before it. Only roots
/// inside the contour are returned. The first estimate that cannot be
/// refined ends the search.
///
/// # Errors
#[doc = crate::util::doc_macros::errors_other!()]
pub fn roots_in_contour<F: ComplexFunction + ?Sized>(
    contour: &Contour<'_, F>,
    moments: &[Complex64],
) -> Result<Vec<Complex64>> {
    let normalized: Vec<Complex64> = moments
        .iter()
        .map(|m| m / Complex64::new(0.0, TAU))
        .collect();
    if normalized.iter().all(|m| m.norm() < ZERO_MOMENTS) {
        return Ok(vec![]);
    }

    let estimates = estimates(contour, &normalized)?;
    log::trace!("{} estimates in {contour:?}", estimates.len());

    let center = contour.center();
    let diagonal = contour.diagonal();
    let eval = |z: Complex64| contour.eval(z);
    let mut roots: Vec<Complex64> = vec![];
    for z0 in estimates {
        if (z0 - center).norm() > FAR_AWAY * diagonal {
            continue;
        }
        let z1 = z0 + Complex64::new(1.0, 1.0) * (PERTURBATION * diagonal);
        match muller(&eval, z0, z1, REFINE_TOLERANCE, &roots, REFINE_MAX_ITER) {
            Refinement::Found(z) if contour.contains(z) => roots.push(z),
            Refinement::Found(z) => log::trace!("refined {z0} to {z}, outside"),
            Refinement::Exhausted => break,
        }
    }
    Ok(roots)
}

/// Coarse root estimates in global coordinates, estimates inside the contour
/// first.
fn estimates<F: ComplexFunction + ?Sized>(
    contour: &Contour<'_, F>,
    moments: &[Complex64],
) -> Result<Vec<Complex64>> {
    // the closing moment is missing from odd-length input
    let m = |k: usize| moments.get(k).copied().unwrap_or_default();
    let n = (moments.len() + 1) / 2;

    let hankel = SquareMatrix::from_fn(n, |i, j| m(i + j));
    let rhs: Vec<Complex64> = (0..n).map(|i| -m(n + i)).collect();
    let (_, rank) = solve_rank_deficient(&hankel, &rhs, RANK_TOLERANCE)?;
    if rank == 0 {
        return Ok(vec![]);
    }

    // The leading block of the size of the rank is regular, and its
    // polynomial has no spurious roots.
    let hankel = SquareMatrix::from_fn(rank, |i, j| m(i + j));
    let rhs: Vec<Complex64> = (0..rank).map(|i| -m(rank + i)).collect();
    let (mut coeffs, _) = solve_rank_deficient(&hankel, &rhs, RANK_TOLERANCE)?;
    coeffs.push(Complex64::new(1.0, 0.0));

    let local = match Poly::new(&coeffs).roots(POLY_EPSILON, POLY_MAX_ITER) {
        Ok(roots) | Err(Error::NoConverge(roots)) => roots,
        Err(e) => return Err(e),
    };

    let center = contour.center();
    let radius = contour.diagonal() * 0.5;
    let (mut inside, outside): (Vec<_>, Vec<_>) = local
        .into_iter()
        .map(|w| center + w * radius)
        .filter(|z| c_is_finite(*z))
        .partition(|z| contour.contains(*z));
    inside.extend(outside);
    Ok(inside)
}

#[cfg(test)]
mod test {
    use num::complex::Complex64;

    use super::roots_in_contour;
    use crate::{util::__testing::check_roots, Contour, Counted, Error, Poly, SearchConfig};

    #[test]
    fn two_roots() {
        let f = |z: Complex64| z * z + 1.0;
        let contour =
            Contour::new(&f, complex!(-2.0, -2.0), complex!(2.0, 2.0), 4, &SearchConfig::default()).unwrap();
        let roots = roots_in_contour(&contour, contour.boundary_moments()).unwrap();
        assert!(check_roots(
            roots,
            vec![complex!(0.0, 1.0), complex!(0.0, -1.0)],
            1E-12
        ));
    }

    #[test]
    fn roots_outside_are_ignored() {
        let expected = vec![complex!(0.5, 0.5), complex!(-0.5, 0.25)];
        let mut all = expected.clone();
        all.push(complex!(3.0, 3.0));
        let f = Poly::from_roots(&all);
        let contour =
            Contour::new(&f, complex!(-1.0, -1.0), complex!(1.0, 1.0), 5, &SearchConfig::default()).unwrap();
        let roots = roots_in_contour(&contour, contour.boundary_moments()).unwrap();
        assert!(check_roots(roots, expected, 1E-12));
    }

    #[test]
    fn no_moments_no_roots() {
        let f = Counted::new(|z: Complex64| z.exp());
        let contour =
            Contour::new(&f, complex!(-1.0, -1.0), complex!(1.0, 1.0), 3, &SearchConfig::default()).unwrap();
        let moments = contour.boundary_moments().to_vec();
        let evaluations = f.evaluations();
        assert!(roots_in_contour(&contour, &moments).unwrap().is_empty());
        assert_eq!(f.evaluations(), evaluations);
        assert!(roots_in_contour(&contour, &[complex!(1E-12); 6]).unwrap().is_empty());
    }

    #[test]
    fn non_finite_moments_are_an_error() {
        let f = |z: Complex64| z;
        let contour =
            Contour::new(&f, complex!(-1.0, -1.0), complex!(1.0, 1.0), 1, &SearchConfig::default()).unwrap();
        let res = roots_in_contour(&contour, &[complex!(f64::NAN), complex!(1.0)]);
        assert!(matches!(res, Err(Error::Other(_))));
    }
}
