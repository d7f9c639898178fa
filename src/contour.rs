use std::{
    cell::{Cell, OnceCell},
    fmt::Debug,
    rc::Rc,
};

use num::complex::Complex64;

use crate::{
    config::SearchConfig,
    error::{Error, Result},
    function::ComplexFunction,
    util::{casting::f64_to_usize, complex::c_is_finite},
};

mod quadrature;
use quadrature::{Basis, Rule, Side};

mod tiling;
pub use tiling::Tile;

/// Where the four quadrants meet, as a fraction of width and height measured
/// from the bottom left corner. Off center, so that roots on the symmetry
/// lines of a symmetric region do not end up on an internal edge.
const SPLIT_FRACTION: f64 = 0.5618;

/// Initial panels along the shorter side of a contour. Longer sides get
/// proportionally more, so panels start out roughly square.
const PANELS_PER_SHORT_SIDE: f64 = 2.0;

const MAX_INITIAL_PANELS: usize = 64;

/// Moments smaller than this, relative to the integral of their absolute
/// value, are cancellation noise.
const ROUND_OFF: f64 = 1E-8;

/// One of the four tiles a contour is split into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    BottomLeft,
    BottomRight,
    TopRight,
    TopLeft,
}

impl Quadrant {
    /// Counter-clockwise, starting from the bottom left.
    pub const ALL: [Self; 4] = [
        Self::BottomLeft,
        Self::BottomRight,
        Self::TopRight,
        Self::TopLeft,
    ];
}

/// The four sides of a rectangle, each traversed counter-clockwise.
#[derive(Clone, Debug)]
struct Boundary {
    /// left to right
    bottom: Side,
    /// bottom to top
    right: Side,
    /// right to left
    top: Side,
    /// top to bottom
    left: Side,
}

impl Boundary {
    fn accumulate(&self, basis: &Basis, moments: &mut [Complex64], masses: &mut [f64]) {
        for side in [&self.bottom, &self.right, &self.top, &self.left] {
            side.accumulate(basis, moments, masses);
        }
    }
}

/// Samples shared by the quadrants of a contour: the four internal edges
/// leaving the split point, and the boundary cut at the split lines.
#[derive(Debug)]
struct Interior {
    /// `(xs, y0)` to the split point
    v_low: Side,
    /// split point to `(xs, y1)`
    v_high: Side,
    /// `(x0, ys)` to the split point
    h_left: Side,
    /// split point to `(x1, ys)`
    h_right: Side,
    bottom: (Side, Side),
    right: (Side, Side),
    top: (Side, Side),
    left: (Side, Side),
}

/// An axis-aligned rectangle of the complex plane, and the moments
///
/// ```text
/// m_k = ∮ w^k / f(z) dz,    w = (z - center) / radius
/// ```
///
/// along its boundary, where `radius` is half the diagonal. Boundary samples
/// are computed on first use and shared with the quadrants.
///
/// The contour borrows the function, it never owns it.
pub struct Contour<'a, F: ComplexFunction + ?Sized> {
    f: &'a F,
    bottom_left: Complex64,
    top_right: Complex64,
    max_roots: usize,
    eps: f64,
    mu: f64,
    max_k: u32,
    tile: Tile,
    evaluations: Rc<Cell<u64>>,
    boundary: OnceCell<Boundary>,
    interior: OnceCell<Interior>,
    moments: OnceCell<Vec<Complex64>>,
}

impl<'a, F: ComplexFunction + ?Sized> Contour<'a, F> {
    /// A contour that can resolve up to `max_roots` roots.
    ///
    /// Tolerances are taken from `config`.
    ///
    /// # Errors
    #[doc = crate::util::doc_macros::errors_invalid_region!()]
    /// - `InvalidConfig`: `max_roots` is zero or `config` is invalid.
    pub fn new(
        f: &'a F,
        bottom_left: Complex64,
        top_right: Complex64,
        max_roots: usize,
        config: &SearchConfig,
    ) -> Result<Self> {
        config.validate()?;
        if max_roots == 0 {
            return Err(Error::InvalidConfig("a contour needs a budget of at least one root"));
        }
        let is_valid = c_is_finite(bottom_left)
            && c_is_finite(top_right)
            && top_right.re > bottom_left.re
            && top_right.im > bottom_left.im;
        if !is_valid {
            return Err(Error::InvalidRegion {
                bottom_left,
                top_right,
            });
        }
        Ok(Self {
            f,
            bottom_left,
            top_right,
            max_roots,
            eps: config.eps,
            mu: config.mu,
            max_k: config.max_k,
            tile: Tile::default(),
            evaluations: Rc::new(Cell::new(0)),
            boundary: OnceCell::new(),
            interior: OnceCell::new(),
            moments: OnceCell::new(),
        })
    }

    /// Same function, tolerances and evaluation counter, different rectangle.
    fn sibling(&self, bottom_left: Complex64, top_right: Complex64, max_roots: usize) -> Self {
        Self {
            f: self.f,
            bottom_left,
            top_right,
            max_roots,
            eps: self.eps,
            mu: self.mu,
            max_k: self.max_k,
            tile: self.tile,
            evaluations: Rc::clone(&self.evaluations),
            boundary: OnceCell::new(),
            interior: OnceCell::new(),
            moments: OnceCell::new(),
        }
    }

    #[must_use]
    pub const fn bottom_left(&self) -> Complex64 {
        self.bottom_left
    }

    #[must_use]
    pub const fn top_right(&self) -> Complex64 {
        self.top_right
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.top_right.re - self.bottom_left.re
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.top_right.im - self.bottom_left.im
    }

    #[must_use]
    pub fn center(&self) -> Complex64 {
        (self.bottom_left + self.top_right) * 0.5
    }

    /// Length of the diagonal
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        (self.top_right - self.bottom_left).norm()
    }

    /// The root budget `N` of this contour.
    #[must_use]
    pub const fn max_roots(&self) -> usize {
        self.max_roots
    }

    /// Number of moments spanning the Hankel matrix, `2N - 1`. One more
    /// moment is integrated for the right hand side of the linear system.
    #[must_use]
    pub const fn moment_count(&self) -> usize {
        2 * self.max_roots - 1
    }

    /// Position in the sweep grid, relative to the seed tile.
    #[must_use]
    pub const fn tile(&self) -> Tile {
        self.tile
    }

    /// Function evaluations performed so far by this contour, the contours
    /// derived from it and the contour it was derived from.
    #[must_use]
    pub fn evaluations(&self) -> u64 {
        self.evaluations.get()
    }

    /// Inclusive point-in-rectangle test.
    #[must_use]
    pub fn contains(&self, z: Complex64) -> bool {
        (self.bottom_left.re..=self.top_right.re).contains(&z.re)
            && (self.bottom_left.im..=self.top_right.im).contains(&z.im)
    }

    /// Evaluate the function, counting the call.
    pub(crate) fn eval(&self, z: Complex64) -> Complex64 {
        self.evaluations.set(self.evaluations.get().saturating_add(1));
        self.f.eval(z)
    }

    fn basis(&self) -> Basis {
        Basis {
            center: self.center(),
            radius: self.diagonal() * 0.5,
        }
    }

    fn rule(&self) -> Rule {
        Rule {
            eps: self.eps,
            max_k: self.max_k,
            moments: 2 * self.max_roots,
        }
    }

    fn panels_along(&self, length: f64) -> usize {
        let short = self.width().min(self.height());
        f64_to_usize((PANELS_PER_SHORT_SIDE * length / short).ceil()).clamp(1, MAX_INITIAL_PANELS)
    }

    /// Integrate `[start, end]` with this contour's panel size and tolerances.
    fn integrate(&self, start: Complex64, end: Complex64) -> Side {
        let eval = |z| self.eval(z);
        let panels = self.panels_along((end - start).norm());
        Side::integrate(&eval, start, end, panels, &self.basis(), &self.rule())
    }

    fn corners(&self) -> [Complex64; 4] {
        let (x0, y0) = (self.bottom_left.re, self.bottom_left.im);
        let (x1, y1) = (self.top_right.re, self.top_right.im);
        [
            Complex64::new(x0, y0),
            Complex64::new(x1, y0),
            Complex64::new(x1, y1),
            Complex64::new(x0, y1),
        ]
    }

    fn boundary(&self) -> &Boundary {
        self.boundary.get_or_init(|| {
            log::trace!(
                "sampling boundary {{bottom_left: {}, top_right: {}}}",
                self.bottom_left,
                self.top_right
            );
            let [bl, br, tr, tl] = self.corners();
            Boundary {
                bottom: self.integrate(bl, br),
                right: self.integrate(br, tr),
                top: self.integrate(tr, tl),
                left: self.integrate(tl, bl),
            }
        })
    }

    /// The moments `m_0 .. m_{2N-1}` of the boundary, without the trailing
    /// moments that are below round-off noise. The length is always even.
    ///
    /// Computed once, later calls return the cached values.
    pub fn boundary_moments(&self) -> &[Complex64] {
        self.moments.get_or_init(|| {
            let count = 2 * self.max_roots;
            let mut moments = vec![Complex64::new(0.0, 0.0); count];
            let mut masses = vec![0.0; count];
            self.boundary()
                .accumulate(&self.basis(), &mut moments, &mut masses);
            let len = resolved_len(&moments, &masses);
            if len < count {
                log::trace!("dropping {} moments below round-off", count - len);
            }
            moments.truncate(len);
            moments
        })
    }

    /// Where the four quadrants meet.
    #[must_use]
    pub fn split_point(&self) -> Complex64 {
        self.bottom_left + (self.top_right - self.bottom_left) * SPLIT_FRACTION
    }

    fn interior(&self) -> &Interior {
        self.interior.get_or_init(|| {
            let boundary = self.boundary();
            let s = self.split_point();
            let (x0, y0) = (self.bottom_left.re, self.bottom_left.im);
            let (x1, y1) = (self.top_right.re, self.top_right.im);
            let eval = |z| self.eval(z);
            let (basis, rule) = (self.basis(), self.rule());
            let on_bottom = Complex64::new(s.re, y0);
            let on_right = Complex64::new(x1, s.im);
            Interior {
                v_low: self.integrate(on_bottom, s),
                v_high: self.integrate(s, Complex64::new(s.re, y1)),
                h_left: self.integrate(Complex64::new(x0, s.im), s),
                h_right: self.integrate(s, on_right),
                bottom: boundary.bottom.split_at(&eval, on_bottom, &basis, &rule),
                right: boundary.right.split_at(&eval, on_right, &basis, &rule),
                top: boundary
                    .top
                    .split_at(&eval, Complex64::new(s.re, y1), &basis, &rule),
                left: boundary
                    .left
                    .split_at(&eval, Complex64::new(x0, s.im), &basis, &rule),
            }
        })
    }

    /// The contour covering one of the four tiles of this one.
    ///
    /// The quadrant shares this contour's boundary samples and the samples of
    /// its internal split lines. Its root budget is [`Contour::effective_roots`]
    /// if the moments were already computed, this contour's budget otherwise.
    #[must_use]
    pub fn quadrant(&self, q: Quadrant) -> Self {
        self.quadrant_with_roots(q, self.effective_roots())
    }

    /// Half the number of moments that are at least `mu` times the largest
    /// one, at least one and at most the budget. The budget itself while the
    /// moments are not known yet.
    #[must_use]
    pub fn effective_roots(&self) -> usize {
        self.moments.get().map_or(self.max_roots, |m| {
            (significant_len(m, self.mu) / 2).clamp(1, self.max_roots)
        })
    }

    /// [`Contour::quadrant`] with an explicit root budget.
    pub(crate) fn quadrant_with_roots(&self, q: Quadrant, max_roots: usize) -> Self {
        let s = self.split_point();
        let (x0, y0) = (self.bottom_left.re, self.bottom_left.im);
        let (x1, y1) = (self.top_right.re, self.top_right.im);
        let interior = self.interior();

        let (bottom_left, top_right, boundary) = match q {
            Quadrant::BottomLeft => (
                self.bottom_left,
                s,
                Boundary {
                    bottom: interior.bottom.0.clone(),
                    right: interior.v_low.clone(),
                    top: interior.h_left.reversed(),
                    left: interior.left.1.clone(),
                },
            ),
            Quadrant::BottomRight => (
                Complex64::new(s.re, y0),
                Complex64::new(x1, s.im),
                Boundary {
                    bottom: interior.bottom.1.clone(),
                    right: interior.right.0.clone(),
                    top: interior.h_right.reversed(),
                    left: interior.v_low.reversed(),
                },
            ),
            Quadrant::TopRight => (
                s,
                self.top_right,
                Boundary {
                    bottom: interior.h_right.clone(),
                    right: interior.right.1.clone(),
                    top: interior.top.0.clone(),
                    left: interior.v_high.reversed(),
                },
            ),
            Quadrant::TopLeft => (
                Complex64::new(x0, s.im),
                Complex64::new(s.re, y1),
                Boundary {
                    bottom: interior.h_left.clone(),
                    right: interior.v_high.clone(),
                    top: interior.top.1.clone(),
                    left: interior.left.0.clone(),
                },
            ),
        };

        let child = self.sibling(bottom_left, top_right, max_roots);
        // freshly created, cannot be initialized yet
        let _ = child.boundary.set(boundary);
        child
    }

    /// Moments of one quadrant, see [`Contour::quadrant`] and
    /// [`Contour::boundary_moments`].
    #[must_use]
    pub fn quadrant_moments(&self, q: Quadrant) -> Vec<Complex64> {
        self.quadrant(q).boundary_moments().to_vec()
    }
}

impl<F: ComplexFunction + ?Sized> Debug for Contour<'_, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contour")
            .field("bottom_left", &self.bottom_left)
            .field("top_right", &self.top_right)
            .field("max_roots", &self.max_roots)
            .field("tile", &self.tile)
            .finish_non_exhaustive()
    }
}

/// Number of leading moments above the round-off of their own absolute
/// integral, rounded up to an even count.
fn resolved_len(moments: &[Complex64], masses: &[f64]) -> usize {
    if !moments.iter().copied().all(c_is_finite) {
        // let the solver report it
        return moments.len();
    }
    let last = moments
        .iter()
        .zip(masses)
        .rposition(|(m, mass)| m.norm() > ROUND_OFF * mass);
    even_len(last, moments.len())
}

/// Number of leading moments up to the last one that is at least `mu` times
/// the largest, rounded up to an even count.
fn significant_len(moments: &[Complex64], mu: f64) -> usize {
    let largest = moments.iter().map(|m| m.norm()).fold(0.0, f64::max);
    let last = moments
        .iter()
        .rposition(|m| m.norm() > 0.0 && m.norm() >= mu * largest);
    even_len(last, moments.len())
}

fn even_len(last: Option<usize>, len: usize) -> usize {
    last.map_or(0, |k| ((k + 2) / 2 * 2).min(len))
}
