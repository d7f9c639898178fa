//! Find the zeros of analytic functions inside rectangles of the complex plane.
//!
//! The search integrates moments `∮ w^k / f(z) dz` along the boundary of a
//! rectangle (argument principle), rebuilds a polynomial whose roots
//! approximate the zeros of `f` inside, and polishes each estimate with
//! Muller's method. Rectangles whose direct estimate disagrees with the sum of
//! their four quadrants are subdivided until both agree.
//!
//! ```
//! use contour_roots::{complex, find_all_roots, SearchConfig};
//! use num::complex::Complex64;
//!
//! let f = |z: Complex64| z * z + 1.0;
//! let roots = find_all_roots(&f, complex!(-2.0, -2.0), complex!(2.0, 2.0), &SearchConfig::default()).unwrap();
//! assert_eq!(roots.len(), 2);
//! assert!(roots.iter().any(|z| (z - complex!(0.0, 1.0)).norm() < 1E-9));
//! assert!(roots.iter().any(|z| (z - complex!(0.0, -1.0)).norm() < 1E-9));
//! ```
//!
//! The algorithm is a best-effort heuristic: it does not certify that every
//! zero was found for arbitrary functions.
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub use num;

/// A [`num::complex::Complex64`] from one (real) or two (real and imaginary)
/// components.
///
/// ```
/// use contour_roots::complex;
///
/// assert_eq!(complex!(1.0, 2.0), num::complex::Complex64::new(1.0, 2.0));
/// assert_eq!(complex!(3.0).im, 0.0);
/// ```
#[macro_export]
macro_rules! complex {
    ($re:expr) => {
        $crate::num::complex::Complex64::new($re, 0.0)
    };
    ($re:expr, $im:expr) => {
        $crate::num::complex::Complex64::new($re, $im)
    };
}

/// A [`Poly`] from real coefficients, in ascending order of degree.
///
/// ```
/// use contour_roots::poly;
///
/// // 1 + 2x + 3x^2
/// let p = poly![1.0, 2.0, 3.0];
/// assert_eq!(p.degree(), 2);
/// ```
#[macro_export]
macro_rules! poly {
    () => {
        $crate::Poly::zero()
    };
    ($($c:expr),+ $(,)?) => {
        $crate::Poly::from_real_slice(&[$($c),+])
    };
}

mod config;
pub use config::{Direction, RootOrdering, SearchConfig, SingleRootHeuristic};

mod contour;
pub use contour::{Contour, Quadrant, Tile};

mod error;
pub use error::{Error, Result, RootsResultExt};

mod function;
pub use function::{ComplexFunction, Counted};

mod poly;
pub use poly::{roots::aberth_ehrlich, Poly};

mod refine;
pub use refine::{muller, Refinement};

mod search;
pub use search::{all_roots_in_contour, find_all_roots, find_n_roots, roots_in_contour};

mod util;
pub use util::__testing;
