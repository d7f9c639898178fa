use num::complex::Complex64;
use thiserror::Error;

/// The top-level error type for this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The rectangle has zero or negative width or height, or a corner is not
    /// finite.
    #[error("invalid region: bottom left {bottom_left} must be strictly below and left of top right {top_right}")]
    InvalidRegion {
        bottom_left: Complex64,
        top_right: Complex64,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// A search limit (subdivision depth, function evaluations or sweep tiles)
    /// was reached. The roots accepted so far are returned with the error.
    #[error("root search did not converge within the given constraints")]
    NoConverge(Vec<Complex64>),

    #[error("unexpected error while searching for roots")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

mod sealed {
    pub trait Sealed {}
}

/// Extension trait for [`Result<Vec<Complex64>>`](Result).
pub trait RootsResultExt: sealed::Sealed {
    /// Get roots even if the search hit one of its limits. Returns [`None`]
    /// if the search failed without producing any roots.
    fn ignore_errors(self) -> Option<Vec<Complex64>>;
}

impl sealed::Sealed for Result<Vec<Complex64>> {}

impl RootsResultExt for Result<Vec<Complex64>> {
    fn ignore_errors(self) -> Option<Vec<Complex64>> {
        match self {
            Ok(roots) | Err(Error::NoConverge(roots)) => Some(roots),
            _ => None,
        }
    }
}
