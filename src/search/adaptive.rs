use num::complex::Complex64;

use super::single::roots_in_contour;
use crate::{
    config::{RootOrdering, SearchConfig, SingleRootHeuristic},
    contour::{Contour, Quadrant},
    error::{Error, Result},
    function::ComplexFunction,
    util::complex::{complex_sort_mut, complex_sort_re_mut},
};

/// Roots found by the direct and the quadrant estimates must agree this well.
const AGREEMENT: f64 = 1E-10;

/// Outcome of comparing a contour's own estimate with its quadrants'.
enum Step<'a, F: ComplexFunction + ?Sized> {
    Accept(Vec<Complex64>),
    Subdivide {
        direct: Vec<Complex64>,
        children: Vec<(Contour<'a, F>, Vec<Complex64>)>,
    },
}

/// All roots inside `contour`, subdividing it until the roots found from its
/// own moments agree with the roots found in its four quadrants.
///
/// Quadrants are processed depth first, bottom left first. Their moments reuse
/// the samples of the parent's boundary and split lines.
///
/// # Errors
#[doc = crate::util::doc_macros::errors_no_converge!()]
#[doc = crate::util::doc_macros::errors_other!()]
pub fn all_roots_in_contour<F: ComplexFunction + ?Sized>(
    contour: &Contour<'_, F>,
    config: &SearchConfig,
) -> Result<Vec<Complex64>> {
    config.validate()?;
    let mut search = Search {
        config,
        start: contour.evaluations(),
        roots: vec![],
        limited: false,
    };

    let direct = roots_in_contour(contour, contour.boundary_moments())?;
    let mut stack: Vec<_> = search
        .visit(contour, direct, 0)?
        .into_iter()
        .rev()
        .map(|(child, direct)| (child, direct, 1))
        .collect();

    while let Some((contour, direct, depth)) = stack.pop() {
        let children = search.visit(&contour, direct, depth)?;
        stack.extend(
            children
                .into_iter()
                .rev()
                .map(|(child, direct)| (child, direct, depth + 1)),
        );
    }

    if search.limited {
        return Err(Error::NoConverge(search.roots));
    }
    Ok(search.roots)
}

/// Roots accepted so far, and the limits they were found under.
struct Search<'c> {
    config: &'c SearchConfig,
    start: u64,
    roots: Vec<Complex64>,
    limited: bool,
}

impl Search<'_> {
    /// Accept the roots of `contour` or return its quadrants for a closer
    /// look. Contours at the maximum depth keep their direct roots.
    fn visit<'a, F: ComplexFunction + ?Sized>(
        &mut self,
        contour: &Contour<'a, F>,
        direct: Vec<Complex64>,
        depth: usize,
    ) -> Result<Vec<(Contour<'a, F>, Vec<Complex64>)>> {
        if self
            .config
            .max_evaluations
            .is_some_and(|max| contour.evaluations() - self.start > max)
        {
            log::warn!(
                "evaluation budget exhausted with {} roots found",
                self.roots.len()
            );
            return Err(Error::NoConverge(std::mem::take(&mut self.roots)));
        }

        match step(contour, direct, self.config)? {
            Step::Accept(found) => {
                self.roots.extend(found);
                Ok(vec![])
            }
            Step::Subdivide { direct, .. } if depth >= self.config.max_depth => {
                log::warn!("maximum depth reached in {contour:?}");
                self.limited = true;
                self.roots.extend(direct);
                Ok(vec![])
            }
            Step::Subdivide { children, .. } => {
                log::debug!("subdividing {contour:?} at depth {depth}");
                Ok(children)
            }
        }
    }
}

/// Compare the roots `direct` found from the contour's own moments with the
/// roots of its quadrants.
///
/// The quadrants start with the contour's effective order, but never with
/// fewer roots than were found directly. If they disagree they are searched
/// again with the contour's full budget, so a cluster of roots cannot hide
/// behind a shrunk order.
fn step<'a, F: ComplexFunction + ?Sized>(
    contour: &Contour<'a, F>,
    direct: Vec<Complex64>,
    config: &SearchConfig,
) -> Result<Step<'a, F>> {
    let inherited = contour.effective_roots().max(direct.len());
    let mut children = quadrants(contour, inherited)?;
    if inherited < contour.max_roots()
        && !roots_agree(&direct, &subtotal(&children), config.ordering)
    {
        log::trace!("searching the quadrants of {contour:?} with the full budget");
        children = quadrants(contour, contour.max_roots())?;
    }
    let subtotal = subtotal(&children);

    if roots_agree(&direct, &subtotal, config.ordering) {
        return Ok(Step::Accept(direct));
    }
    if config.single_root_heuristic == SingleRootHeuristic::TrustDirect
        && direct.len() == 1
        && subtotal.is_empty()
    {
        log::debug!("trusting the single root {} of {contour:?}", direct[0]);
        return Ok(Step::Accept(direct));
    }
    log::trace!(
        "{} roots directly, {} in quadrants of {contour:?}",
        direct.len(),
        subtotal.len()
    );
    Ok(Step::Subdivide { direct, children })
}

/// The four quadrants with budget `max_roots`, each with its direct roots.
fn quadrants<'a, F: ComplexFunction + ?Sized>(
    contour: &Contour<'a, F>,
    max_roots: usize,
) -> Result<Vec<(Contour<'a, F>, Vec<Complex64>)>> {
    Quadrant::ALL
        .into_iter()
        .map(|q| {
            let child = contour.quadrant_with_roots(q, max_roots);
            let found = roots_in_contour(&child, child.boundary_moments())?;
            Ok((child, found))
        })
        .collect()
}

fn subtotal<F: ComplexFunction + ?Sized>(
    children: &[(Contour<'_, F>, Vec<Complex64>)],
) -> Vec<Complex64> {
    children.iter().flat_map(|(_, r)| r).copied().collect()
}

fn roots_agree(a: &[Complex64], b: &[Complex64], ordering: RootOrdering) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let (mut a, mut b) = (a.to_vec(), b.to_vec());
    let sort = match ordering {
        RootOrdering::RealPart => complex_sort_re_mut,
        RootOrdering::Lexicographic => complex_sort_mut,
    };
    sort(&mut a);
    sort(&mut b);
    a.iter().zip(&b).all(|(x, y)| (x - y).norm() <= AGREEMENT)
}

#[cfg(test)]
mod test {
    use num::complex::Complex64;

    use super::{all_roots_in_contour, roots_agree, step, Step};
    use crate::{
        search::roots_in_contour, util::__testing::check_roots, Contour, Counted, Error, Poly,
        RootOrdering, SearchConfig, SingleRootHeuristic,
    };

    #[test]
    fn agreement_depends_on_ordering() {
        let a = [complex!(0.0, 1.0), complex!(0.0, -1.0)];
        let b = [complex!(0.0, -1.0), complex!(0.0, 1.0)];
        assert!(!roots_agree(&a, &b, RootOrdering::RealPart));
        assert!(roots_agree(&a, &b, RootOrdering::Lexicographic));
        assert!(roots_agree(&a, &a, RootOrdering::RealPart));
        assert!(!roots_agree(&a, &a[..1], RootOrdering::Lexicographic));
    }

    #[test]
    fn adaptive_finds_at_least_the_direct_roots() {
        let expected = vec![
            complex!(0.35, 0.3),
            complex!(-0.6, -0.1),
            complex!(0.7, -0.65),
            complex!(-0.3, -0.4),
        ];
        let f = Poly::from_roots(&expected);
        let config = SearchConfig::default();
        let contour = Contour::new(&f, complex!(-1.0, -1.0), complex!(1.0, 1.0), 2, &config).unwrap();
        let single = roots_in_contour(&contour, contour.boundary_moments()).unwrap();
        let adaptive = all_roots_in_contour(&contour, &config).unwrap();
        assert!(adaptive.len() >= single.len());
        assert!(check_roots(adaptive, expected, 1E-9));
    }

    #[test]
    fn depth_limit_returns_partial_roots() {
        let expected: Vec<_> = (0..6)
            .map(|k| Complex64::from_polar(0.5, 0.3 + f64::from(k)))
            .collect();
        let f = Poly::from_roots(&expected);
        let config = SearchConfig::default().with_max_depth(0);
        // one root per contour can never resolve six, and depth zero never
        // looks at the quadrants' quadrants
        let contour = Contour::new(&f, complex!(-1.0, -1.0), complex!(1.0, 1.0), 1, &config).unwrap();
        match all_roots_in_contour(&contour, &config) {
            Err(Error::NoConverge(partial)) => assert!(partial.len() <= 1),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn evaluation_budget() {
        let f = Counted::new(|z: Complex64| z.sin());
        let config = SearchConfig::default()
            .with_max_roots_per_contour(1)
            .with_max_evaluations(Some(10));
        let contour = Contour::new(&f, complex!(-10.0, -1.0), complex!(10.0, 1.0), 1, &config).unwrap();
        assert!(matches!(
            all_roots_in_contour(&contour, &config),
            Err(Error::NoConverge(_))
        ));
    }

    #[test]
    fn evaluation_budget_is_checked_before_the_first_split() {
        let f = |z: Complex64| z;
        let config = SearchConfig::default().with_max_evaluations(Some(1));
        let contour = Contour::new(&f, complex!(-1.0, -1.0), complex!(1.0, 1.0), 1, &config).unwrap();
        match all_roots_in_contour(&contour, &config) {
            Err(Error::NoConverge(partial)) => assert!(partial.is_empty()),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn lone_direct_root_is_trusted() {
        // no roots anywhere, so the quadrants find none
        let f = |z: Complex64| z.exp();
        let config = SearchConfig::default();
        let contour = Contour::new(&f, complex!(-1.0, -1.0), complex!(1.0, 1.0), 1, &config).unwrap();
        let lone = vec![complex!(0.2, 0.1)];
        match step(&contour, lone.clone(), &config).unwrap() {
            Step::Accept(found) => assert_eq!(found, lone),
            Step::Subdivide { .. } => panic!("expected the direct root to be kept"),
        }

        let config = config.with_single_root_heuristic(SingleRootHeuristic::Subdivide);
        match step(&contour, lone.clone(), &config).unwrap() {
            Step::Subdivide { direct, children } => {
                assert_eq!(direct, lone);
                assert_eq!(children.len(), 4);
                assert!(children.iter().all(|(_, found)| found.is_empty()));
            }
            Step::Accept(_) => panic!("expected a subdivision"),
        }
    }

    #[test]
    fn quadrants_get_at_least_the_direct_count() {
        let expected = vec![
            complex!(0.1345, 0.0992),
            complex!(0.1345, -0.0992),
            complex!(-0.0313, 0.1181),
            complex!(-0.0313, -0.1181),
        ];
        let f = Poly::from_roots(&expected);
        let config = SearchConfig::default();
        let contour = Contour::new(&f, complex!(-1.5, -1.5), complex!(1.5, 1.5), 10, &config).unwrap();
        let direct = roots_in_contour(&contour, contour.boundary_moments()).unwrap();
        assert_eq!(direct.len(), 4);
        let found = match step(&contour, direct, &config).unwrap() {
            Step::Accept(found) => found,
            Step::Subdivide { children, .. } => {
                assert!(children.iter().all(|(child, _)| child.max_roots() >= 4));
                children.into_iter().flat_map(|(_, found)| found).collect()
            }
        };
        assert!(check_roots(found, expected, 1E-9));
    }
}
