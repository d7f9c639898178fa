use std::{fmt::Display, ops::Mul};

use itertools::Itertools;
use num::{complex::Complex64, One, Zero};

use crate::{
    function::ComplexFunction,
    util::{
        casting::{usize_to_f64, usize_to_i32},
        complex::{complex_fmt, complex_sort_mut},
    },
};

pub mod roots;

/// A polynomial with complex coefficients, stored in ascending order of degree
/// (`self.0[i]` is the coefficient of `x^i`).
///
/// This is the polynomial reconstructed from contour moments, but it is also
/// handy as a search target, as it implements [`ComplexFunction`].
#[derive(Clone, Debug, PartialEq)]
pub struct Poly(pub(crate) Vec<Complex64>);

impl Poly {
    #[must_use]
    pub fn new(coeffs: &[Complex64]) -> Self {
        Self(coeffs.to_owned()).normalize()
    }

    #[must_use]
    pub fn from_real_slice(coeffs: &[f64]) -> Self {
        Self::new(&coeffs.iter().map(|&c| Complex64::new(c, 0.0)).collect_vec())
    }

    /// The zero polynomial
    #[must_use]
    pub fn zero() -> Self {
        Self(vec![Complex64::zero()])
    }

    #[must_use]
    pub fn one() -> Self {
        Self(vec![Complex64::one()])
    }

    /// Monic polynomial from its complex roots.
    ///
    /// # Examples
    /// ```
    /// use contour_roots::{complex, poly, Poly};
    ///
    /// let p = Poly::from_roots(&[complex!(-1.0), complex!(0.0), complex!(1.0)]);
    /// assert_eq!(p, poly![0.0, -1.0, 0.0, 1.0]);
    /// ```
    #[must_use]
    pub fn from_roots(roots: &[Complex64]) -> Self {
        if roots.is_empty() {
            return Self::one();
        }

        let mut roots = roots.to_owned();
        complex_sort_mut(roots.as_mut_slice());

        roots
            .into_iter()
            .map(|e| Self::new(&[-e, Complex64::one()]))
            .fold(Self::one(), |acc, x| acc * x)
            .normalize()
    }

    /// The degree of a polynomial (the maximum exponent)
    ///
    /// Note that this will return `-1` for zero polynomials.
    #[must_use]
    pub fn degree(&self) -> i32 {
        debug_assert!(self.is_normalized());
        if self.is_zero() {
            return -1;
        }
        usize_to_i32(self.degree_raw())
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        debug_assert!(self.is_normalized());
        self.0.len() == 1 && self.0[0].is_zero()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Complex64] {
        &self.0
    }

    /// Evaluate the polynomial at a single value of `x`.
    ///
    /// ```
    /// use contour_roots::{complex, poly};
    ///
    /// let p = poly![1.0, 2.0, 3.0];
    /// assert_eq!(p.eval(complex!(1.0)), complex!(6.0));
    /// ```
    #[must_use]
    pub fn eval(&self, x: Complex64) -> Complex64 {
        // Horner's method
        debug_assert!(self.is_normalized());
        self.0
            .iter()
            .rev()
            .fold(Complex64::zero(), |acc, c| acc * x + c)
    }

    /// Derivative
    #[must_use]
    pub fn diff(&self) -> Self {
        debug_assert!(self.is_normalized());

        // derivative of constant is zero
        if self.degree_raw() == 0 {
            return Self::zero();
        }

        let coeffs = self
            .0
            .iter()
            .enumerate()
            .skip(1) // shift degrees down
            .map(|(n, c)| c * usize_to_f64(n))
            .collect_vec();
        Self(coeffs).normalize()
    }

    /// Leading coefficient
    pub(crate) fn last(&self) -> Complex64 {
        *self.0.last().expect("polynomials always have at least one coefficient")
    }

    pub(crate) fn degree_raw(&self) -> usize {
        self.0.len() - 1
    }

    pub(crate) fn is_normalized(&self) -> bool {
        let n = self.0.len();
        if n == 0 {
            // polynomials must have at least one coefficient
            return false;
        }
        // zero polynomial is the only one allowed a zero leading coefficient
        n == 1 || !self.0[n - 1].is_zero()
    }

    /// Removes zero coefficients of the highest degrees
    pub(crate) fn normalize(mut self) -> Self {
        while self.0.len() > 1 && self.last().is_zero() {
            self.0.pop();
        }
        if self.0.is_empty() {
            self.0.push(Complex64::zero());
        }
        self
    }

    pub(crate) fn is_monic(&self) -> bool {
        self.last().is_one()
    }

    pub(crate) fn make_monic(&mut self) {
        debug_assert!(self.is_normalized());
        let c = self.last();
        if c.is_zero() || c.is_one() {
            return;
        }
        for z in &mut self.0 {
            *z /= c;
        }
    }

    /// Divide by `x^n`, dropping the lowest `n` coefficients.
    pub(crate) fn shift_down(&self, n: usize) -> Self {
        if n >= self.0.len() {
            return Self::zero();
        }
        Self(self.0[n..].to_vec()).normalize()
    }
}

impl Mul for Poly {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        debug_assert!(self.is_normalized());
        debug_assert!(rhs.is_normalized());

        let mut out = vec![Complex64::zero(); self.0.len() + rhs.0.len() - 1];
        for (i, a) in self.0.iter().enumerate() {
            for (j, b) in rhs.0.iter().enumerate() {
                out[i + j] += a * b;
            }
        }
        Self(out).normalize()
    }
}

impl ComplexFunction for Poly {
    #[inline]
    fn eval(&self, z: Complex64) -> Complex64 {
        Self::eval(self, z)
    }
}

impl Display for Poly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut iter = self.0.iter().enumerate();
        if let Some((_, c)) = iter.next() {
            write!(f, "{}", complex_fmt(c))?;
        } else {
            return Ok(());
        }
        for (i, c) in iter {
            write!(f, " + {}*x^{}", complex_fmt(c), i)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Poly;

    #[test]
    fn from_roots() {
        let p = Poly::from_roots(&[complex!(1.0), complex!(2.0)]);
        assert_eq!(p, poly![2.0, -3.0, 1.0]);
    }

    #[test]
    fn diff() {
        let p = poly![1.0, 2.0, 3.0];
        assert_eq!(p.diff(), poly![2.0, 6.0]);
    }

    /// This was a bug
    #[test]
    fn diff1() {
        let one = poly![1.0];
        assert_eq!(one.diff().degree(), -1);
    }

    #[test]
    fn normalize_trims_leading_zeros() {
        let p = poly![1.0, 2.0, 0.0, 0.0];
        assert_eq!(p.degree(), 1);
        assert!(poly![0.0, 0.0].is_zero());
    }

    #[test]
    fn make_monic() {
        let mut p = poly![2.0, 4.0];
        p.make_monic();
        assert_eq!(p, poly![0.5, 1.0]);
        assert!(p.is_monic());
    }

    #[test]
    fn shift_down() {
        let p = poly![0.0, 0.0, 1.0, 2.0];
        assert_eq!(p.shift_down(2), poly![1.0, 2.0]);
    }

    #[test]
    fn display() {
        let p = Poly::new(&[
            complex!(2.0),
            complex!(4.5),
            complex!(5.0, 1.0),
            complex!(6.0, 1.5),
        ]);
        assert_eq!(p.to_string(), "2 + 4.5*x^1 + (5+i)*x^2 + (6+i1.5)*x^3");
    }
}
