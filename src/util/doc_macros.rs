//! Macros for reducing doc comment boilerplate.

/// Default explanation for [`crate::Error::InvalidRegion`] errors.
macro_rules! errors_invalid_region {
    () => {
        r"- `InvalidRegion`: the rectangle has zero or negative width or height, or a corner is not finite.
"
    };
}
pub(crate) use errors_invalid_region;

/// Default explanation for [`crate::Error::NoConverge`] errors.
macro_rules! errors_no_converge {
    () => {
        r"- `NoConverge`: a limit of the [`crate::SearchConfig`] was reached before the subdivision settled. The roots accepted so far are returned with the error.
"
    };
}
pub(crate) use errors_no_converge;

/// Default explanation for [`crate::Error::Other`] errors.
macro_rules! errors_other {
    () => {
        r"- `Other`: the function returned a non-finite value on a contour boundary, so the moment system could not be solved.
"
    };
}
pub(crate) use errors_other;
