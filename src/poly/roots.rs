use num::{complex::Complex64, Zero};

use crate::{error::Result, util::complex::c_is_finite, Poly};

mod aberth_ehrlich;
pub use aberth_ehrlich::aberth_ehrlich;
mod initial_guess;
pub use initial_guess::initial_guesses_annulus;

/// Seed for the perturbation of initial guesses. Fixed, so that root finding
/// is deterministic.
const GUESS_SEED: u64 = 1;

impl Poly {
    /// A convenient way of finding all roots, with a pre-configured root finder.
    /// Works well for the low degree polynomials reconstructed from contour
    /// moments.
    ///
    /// Zero roots are factored out first, degrees one and two are solved in
    /// closed form, everything else goes through [`aberth_ehrlich`].
    ///
    /// ```
    /// use contour_roots::{complex, poly};
    ///
    /// let roots = poly![6.0, -5.0, 1.0].roots(1E-24, 100).unwrap();
    /// assert!(roots.iter().any(|z| (z - complex!(2.0)).norm() < 1E-12));
    /// assert!(roots.iter().any(|z| (z - complex!(3.0)).norm() < 1E-12));
    /// ```
    ///
    /// # Errors
    /// - `NoConverge`: Aberth-Ehrlich did not settle within `max_iter`
    ///   iterations. The best guesses are returned with the error.
    pub fn roots(&self, epsilon: f64, max_iter: usize) -> Result<Vec<Complex64>> {
        debug_assert!(self.is_normalized());

        let mut this = self.clone();

        let mut roots: Vec<Complex64> = this.zero_roots(epsilon);

        match this.degree_raw() {
            0 => return Ok(roots),
            1 => {
                roots.extend(this.linear_roots());
                return Ok(roots);
            }
            2 => {
                roots.extend(this.quadratic_roots());
                return Ok(roots);
            }
            _ => {}
        }

        this.make_monic();

        let mut guesses = vec![];
        initial_guesses_annulus(&this, GUESS_SEED, 0.5, 0.5, &mut guesses, this.degree_raw());

        let found = aberth_ehrlich(&this, Some(epsilon), Some(max_iter), &guesses);
        match found {
            Ok(found) => {
                roots.extend(found);
                Ok(roots)
            }
            Err(crate::Error::NoConverge(best)) => {
                roots.extend(best);
                Err(crate::Error::NoConverge(roots))
            }
            Err(e) => Err(e),
        }
    }
}

// private
impl Poly {
    fn zero_roots(&mut self, epsilon: f64) -> Vec<Complex64> {
        debug_assert!(self.is_normalized());

        let mut roots = vec![];
        for _ in 0..self.degree_raw() {
            if self.eval(Complex64::zero()).norm_sqr() <= epsilon {
                roots.push(Complex64::zero());
                // deflating zero roots can be accomplished simply by shifting
                *self = self.shift_down(1);
            } else {
                break;
            }
        }

        roots
    }

    fn linear_roots(&self) -> Vec<Complex64> {
        debug_assert_eq!(self.degree_raw(), 1);

        let a = self.0[1];
        let b = self.0[0];
        vec![-b / a]
    }

    /// Quadratic formula, picking the sign that avoids cancellation
    fn quadratic_roots(&self) -> Vec<Complex64> {
        debug_assert_eq!(self.degree_raw(), 2);

        let a = self.0[2];
        let b = self.0[1];
        let c = self.0[0];

        let disc = (b * b - a * c * 4.0).sqrt();
        let q = if (b.conj() * disc).re >= 0.0 {
            (b + disc) * -0.5
        } else {
            (b - disc) * -0.5
        };
        if q.is_zero() {
            // b == 0 and c == 0 was taken care of by zero_roots, so this is
            // only reachable when epsilon is negative
            return vec![Complex64::zero(), Complex64::zero()];
        }
        let x1 = q / a;
        let x2 = c / q;
        vec![x1, x2].into_iter().filter(|z| c_is_finite(*z)).collect()
    }
}

#[cfg(test)]
mod test {
    use crate::{util::__testing::check_roots, Poly};

    #[test]
    fn degree_0() {
        let roots = poly![3.0].roots(1E-24, 100).unwrap();
        assert!(roots.is_empty());
    }

    #[test]
    fn degree_1() {
        let roots = poly![-2.0, 4.0].roots(1E-24, 100).unwrap();
        assert!(check_roots(roots, vec![complex!(0.5)], 1E-14));
    }

    #[test]
    fn degree_2_complex() {
        let roots = poly![1.0, 0.0, 1.0].roots(1E-24, 100).unwrap();
        assert!(check_roots(
            roots,
            vec![complex!(0.0, 1.0), complex!(0.0, -1.0)],
            1E-14
        ));
    }

    #[test]
    fn zero_roots_are_factored_out() {
        let expected = vec![complex!(0.0), complex!(0.0), complex!(1.0), complex!(2.0)];
        let roots = Poly::from_roots(&expected).roots(1E-24, 100).unwrap();
        assert!(check_roots(roots, expected, 1E-12));
    }

    #[test]
    fn degree_5() {
        let expected = vec![
            complex!(1.0),
            complex!(-1.0, 0.5),
            complex!(0.0, -1.0),
            complex!(0.3, 0.3),
            complex!(2.0, -2.0),
        ];
        let roots = Poly::from_roots(&expected).roots(1E-24, 100).unwrap();
        assert!(check_roots(roots, expected, 1E-10));
    }

    #[test]
    fn degree_10_on_a_circle() {
        // w^10 = 0.5^10, the shape of polynomials rebuilt from rank one moments
        let mut coeffs = vec![complex!(0.0); 11];
        coeffs[0] = complex!(-(0.5f64.powi(10)));
        coeffs[10] = complex!(1.0);
        let roots = Poly::new(&coeffs).roots(1E-24, 100).unwrap();
        assert_eq!(roots.len(), 10);
        for z in roots {
            assert!((z.norm() - 0.5).abs() < 1E-10, "{z}");
        }
    }
}
