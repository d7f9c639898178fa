// internal utilities for dealing with Complex annoyances

use std::cmp::Ordering;

use num::complex::Complex64;

// sort a slice of complex numbers by their real part only, ties keep their
// relative order
pub(crate) fn complex_sort_re_mut(v: &mut [Complex64]) {
    v.sort_by(|a, b| a.re.partial_cmp(&b.re).unwrap_or(Ordering::Equal));
}

// sort a slice of complex numbers lexicographically, using their real part first
pub(crate) fn complex_sort_mut(v: &mut [Complex64]) {
    v.sort_by(|a, b| {
        let re_ord = a.re.partial_cmp(&b.re).unwrap_or(Ordering::Equal);
        if re_ord != Ordering::Equal {
            return re_ord;
        }
        a.im.partial_cmp(&b.im).unwrap_or(Ordering::Equal)
    });
}

/// Both components finite
pub(crate) fn c_is_finite(z: Complex64) -> bool {
    z.re.is_finite() && z.im.is_finite()
}

/// formatting for Complex, because the implementation is not good enough for me
pub(crate) fn complex_fmt(c: &Complex64) -> String {
    let r = c.re;
    let i = c.im;
    if i == 0.0 {
        format!("{r}")
    } else if i == 1.0 {
        format!("({r}+i)")
    } else {
        format!("({r}+i{i})")
    }
}
