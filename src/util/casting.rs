use num::cast;

pub(crate) fn usize_to_i32(x: usize) -> i32 {
    x.try_into().unwrap_or(i32::MAX)
}

/// Cast with loss of precision, explicitly clamping out of bounds values instead
/// of panicking (also shuts up clippy 📎)
pub(crate) fn usize_to_f64(x: usize) -> f64 {
    cast(x).unwrap_or(f64::INFINITY)
}

/// Saturating cast, `NaN` becomes `usize::MAX`
pub(crate) fn f64_to_usize(x: f64) -> usize {
    cast(x).unwrap_or(if x < 0.0 { 0 } else { usize::MAX })
}
