//! Root searches built on contour moments.

use num::complex::Complex64;

use crate::{
    config::SearchConfig,
    contour::Contour,
    error::Result,
    function::ComplexFunction,
};

mod adaptive;
mod single;
mod sweep;

pub use adaptive::all_roots_in_contour;
pub use single::roots_in_contour;
pub use sweep::find_n_roots;

/// All roots of `f` inside the rectangle spanned by `bottom_left` and
/// `top_right`, boundary included.
///
/// Roots lying exactly on the boundary are not reliably found, widen the
/// rectangle slightly if that matters. Roots of higher multiplicity are
/// returned once per multiplicity, but only to about the square root of the
/// precision of `f`. The copies rarely agree between a contour and its
/// quadrants, so such a search usually ends in `NoConverge` at the maximum
/// depth, with the copies among the partial roots.
///
/// ```
/// use contour_roots::{complex, find_all_roots, SearchConfig};
/// use num::complex::Complex64;
///
/// let roots = find_all_roots(
///     &|z: Complex64| z.sin(),
///     complex!(-10.0, -1.0),
///     complex!(10.0, 1.0),
///     &SearchConfig::default(),
/// )
/// .unwrap();
/// assert_eq!(roots.len(), 7);
/// ```
///
/// # Errors
#[doc = crate::util::doc_macros::errors_invalid_region!()]
#[doc = crate::util::doc_macros::errors_no_converge!()]
#[doc = crate::util::doc_macros::errors_other!()]
pub fn find_all_roots<F: ComplexFunction + ?Sized>(
    f: &F,
    bottom_left: Complex64,
    top_right: Complex64,
    config: &SearchConfig,
) -> Result<Vec<Complex64>> {
    let contour = Contour::new(
        f,
        bottom_left,
        top_right,
        config.max_roots_per_contour,
        config,
    )?;
    log::debug!("searching {contour:?}");
    all_roots_in_contour(&contour, config)
}
