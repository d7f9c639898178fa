use std::collections::VecDeque;

use num::complex::Complex64;

use super::find_all_roots;
use crate::{
    config::{Direction, SearchConfig},
    contour::Contour,
    error::{Error, Result},
    function::ComplexFunction,
};

/// Roots closer than this (relative to the tile diagonal) are the same root,
/// found twice on an edge shared by two tiles.
const DUPLICATE: f64 = 1E-10;

/// At least `n` roots of `f`, searching outwards from the rectangle spanned by
/// `bottom_left` and `top_right` in same-size tiles.
///
/// Tiles are searched in the order they were created, each one with
/// [`find_all_roots`], so `n` only decides when to stop and not how many roots
/// a tile may hold. A tile that yields roots grows the search in `direction`,
/// and so does the last tile in the queue. The search stops as soon as `n`
/// roots were found, so it may return more than `n`.
///
/// ```
/// use contour_roots::{complex, find_n_roots, Direction, SearchConfig};
/// use num::complex::Complex64;
///
/// let f = |z: Complex64| z.sin();
/// let roots = find_n_roots(
///     &f,
///     3,
///     complex!(-0.5, -1.0),
///     complex!(0.5, 1.0),
///     Direction::Right,
///     &SearchConfig::default(),
/// )
/// .unwrap();
/// assert!(roots.len() >= 3);
/// ```
///
/// # Errors
/// - `InvalidConfig`: `n` is zero or `config` is invalid.
#[doc = crate::util::doc_macros::errors_invalid_region!()]
/// - `NoConverge`: the tile limit was reached, or the search inside a tile
///   hit one of its limits. The roots found so far are returned with the error.
#[doc = crate::util::doc_macros::errors_other!()]
pub fn find_n_roots<F: ComplexFunction + ?Sized>(
    f: &F,
    n: usize,
    bottom_left: Complex64,
    top_right: Complex64,
    direction: Direction,
    config: &SearchConfig,
) -> Result<Vec<Complex64>> {
    if n == 0 {
        return Err(Error::InvalidConfig("must search for at least one root"));
    }
    let seed = Contour::new(f, bottom_left, top_right, n, config)?;
    let mut queue = VecDeque::from([seed]);
    let mut roots: Vec<Complex64> = vec![];
    let mut visited = 0;

    while let Some(tile) = queue.pop_front() {
        if visited == config.max_tiles {
            log::warn!(
                "tile limit reached with {} of {n} roots found",
                roots.len()
            );
            return Err(Error::NoConverge(roots));
        }
        visited += 1;

        let found = match find_all_roots(f, tile.bottom_left(), tile.top_right(), config) {
            Ok(found) => found,
            Err(Error::NoConverge(partial)) => {
                merge(&mut roots, partial, tile.diagonal());
                return Err(Error::NoConverge(roots));
            }
            Err(e) => return Err(e),
        };
        let yielded = merge(&mut roots, found, tile.diagonal());
        log::info!(
            "tile {:?}: {yielded} new roots, {} of {n}",
            tile.tile(),
            roots.len()
        );

        if roots.len() >= n {
            break;
        }
        if yielded > 0 || queue.is_empty() {
            match direction {
                Direction::UpRight => queue.extend(tile.expand_up_right()),
                Direction::Right => queue.push_back(tile.expand_right()),
            }
        }
    }
    Ok(roots)
}

/// Append the roots of `found` that are not in `roots` yet, returns how many.
fn merge(roots: &mut Vec<Complex64>, found: Vec<Complex64>, scale: f64) -> usize {
    let before = roots.len();
    for z in found {
        if !roots[..before].iter().any(|r| (r - z).norm() <= DUPLICATE * scale) {
            roots.push(z);
        }
    }
    roots.len() - before
}

#[cfg(test)]
mod test {
    use num::complex::Complex64;

    use super::{find_n_roots, merge};
    use crate::{util::__testing::check_roots, Direction, Error, Poly, SearchConfig};

    #[test]
    fn shared_edge_roots_are_merged() {
        let mut roots = vec![complex!(1.0)];
        let added = merge(
            &mut roots,
            vec![complex!(1.0 + 1E-13), complex!(2.0), complex!(2.0)],
            1.0,
        );
        // duplicates inside one tile are distinct roots of higher multiplicity
        assert_eq!(added, 2);
        assert_eq!(roots.len(), 3);
    }

    #[test]
    fn sweep_right() {
        let f = |z: Complex64| z.sin();
        let roots = find_n_roots(
            &f,
            3,
            complex!(-0.5, -1.0),
            complex!(0.5, 1.0),
            Direction::Right,
            &SearchConfig::default(),
        )
        .unwrap();
        assert!(roots.len() >= 3);
        for k in 0..3 {
            let expected = complex!(f64::from(k) * std::f64::consts::PI);
            assert!(roots.iter().any(|r| (r - expected).norm() < 1E-9), "{k}");
        }
    }

    #[test]
    fn tiles_are_not_limited_to_n_roots() {
        let f = |z: Complex64| z.sin();
        let roots = find_n_roots(
            &f,
            1,
            complex!(-10.0, -1.0),
            complex!(10.0, 1.0),
            Direction::Right,
            &SearchConfig::default(),
        )
        .unwrap();
        let expected = (-3..=3)
            .map(|k| complex!(f64::from(k) * std::f64::consts::PI))
            .collect();
        assert!(check_roots(roots, expected, 1E-9));
    }

    #[test]
    fn sweep_up_right() {
        let expected = [complex!(0.0), complex!(1.2, 0.9), complex!(2.1, 1.8)];
        let f = Poly::from_roots(&expected);
        let roots = find_n_roots(
            &f,
            3,
            complex!(-0.5, -0.5),
            complex!(0.5, 0.5),
            Direction::UpRight,
            &SearchConfig::default(),
        )
        .unwrap();
        assert_eq!(roots.len(), 3);
        for z in expected {
            assert!(roots.iter().any(|r| (r - z).norm() < 1E-9), "{z}");
        }
    }

    #[test]
    fn tile_limit() {
        // no roots at all, the sweep grows until it gives up
        let f = |z: Complex64| z.exp();
        let res = find_n_roots(
            &f,
            1,
            complex!(-0.5, -0.5),
            complex!(0.5, 0.5),
            Direction::Right,
            &SearchConfig::default().with_max_tiles(5),
        );
        match res {
            Err(Error::NoConverge(roots)) => assert!(roots.is_empty()),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn zero_roots_requested() {
        let f = |z: Complex64| z;
        let res = find_n_roots(
            &f,
            0,
            complex!(-0.5, -0.5),
            complex!(0.5, 0.5),
            Direction::Right,
            &SearchConfig::default(),
        );
        assert!(matches!(res, Err(Error::InvalidConfig(_))));
    }
}
