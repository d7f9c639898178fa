//! Functions that can be searched for roots.

use std::sync::atomic::{AtomicU64, Ordering};

use num::complex::Complex64;

/// An analytic function of one complex variable.
///
/// Implementations must be deterministic: evaluating the same point twice
/// must give the same value, because boundary samples computed for one
/// contour are reused by its quadrants.
pub trait ComplexFunction {
    fn eval(&self, z: Complex64) -> Complex64;
}

impl<F: Fn(Complex64) -> Complex64 + ?Sized> ComplexFunction for F {
    #[inline]
    fn eval(&self, z: Complex64) -> Complex64 {
        self(z)
    }
}

/// Wraps a function and counts how many times it was evaluated.
///
/// The search itself never owns the function, so wrap it before handing it
/// over and inspect the counter afterwards.
///
/// ```
/// use contour_roots::{find_all_roots, complex, Counted, SearchConfig};
/// use num::complex::Complex64;
///
/// let f = Counted::new(|z: Complex64| z * z + 1.0);
/// let roots = find_all_roots(&f, complex!(-2.0, -2.0), complex!(2.0, 2.0), &SearchConfig::default()).unwrap();
/// assert_eq!(roots.len(), 2);
/// assert!(f.evaluations() > 0);
/// ```
#[derive(Debug)]
pub struct Counted<F> {
    inner: F,
    evaluations: AtomicU64,
}

impl<F> Counted<F> {
    pub const fn new(inner: F) -> Self {
        Self {
            inner,
            evaluations: AtomicU64::new(0),
        }
    }

    /// Number of evaluations since creation or the last [`Counted::reset`].
    pub fn evaluations(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.evaluations.store(0, Ordering::Relaxed);
    }

    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F: ComplexFunction> ComplexFunction for Counted<F> {
    fn eval(&self, z: Complex64) -> Complex64 {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        self.inner.eval(z)
    }
}
