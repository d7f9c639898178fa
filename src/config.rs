use crate::error::{Error, Result};

/// How root lists are sorted before the direct estimate of a contour is
/// compared with the sum of its quadrants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RootOrdering {
    /// Sort by real part only. Roots sharing a real part keep the order in
    /// which they were found, so a mismatch in their imaginary parts can
    /// trigger a (harmless) extra subdivision.
    #[default]
    RealPart,

    /// Sort by real part, then imaginary part.
    Lexicographic,
}

/// What to do when a contour finds exactly one root but its quadrants find
/// none, which happens when the root sits on an internal split line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SingleRootHeuristic {
    /// Accept the root of the parent contour.
    #[default]
    TrustDirect,

    /// Subdivide like any other disagreement.
    Subdivide,
}

/// Direction in which [`crate::find_n_roots`] grows the searched area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// L-shaped shells of tiles above and to the right of the seed.
    UpRight,

    /// A row of tiles to the right of the seed.
    Right,
}

/// Tuning knobs of the search.
///
/// ```
/// use contour_roots::{RootOrdering, SearchConfig};
///
/// let config = SearchConfig::default()
///     .with_eps(1E-6)
///     .with_max_depth(8)
///     .with_ordering(RootOrdering::Lexicographic);
/// assert_eq!(config.max_k, 4);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// Relative truncation tolerance of the boundary quadrature.
    pub eps: f64,

    /// Moments below this fraction of the largest one do not count towards
    /// the root budget a quadrant inherits.
    pub mu: f64,

    /// Maximum number of bisections of a boundary panel.
    pub max_k: u32,

    /// Root budget of a single contour, the Hankel system has this size.
    pub max_roots_per_contour: usize,

    /// Maximum subdivision depth of the adaptive search.
    pub max_depth: usize,

    /// Optional budget of function evaluations for one adaptive search.
    pub max_evaluations: Option<u64>,

    /// Maximum number of tiles visited by [`crate::find_n_roots`].
    pub max_tiles: usize,

    pub ordering: RootOrdering,

    pub single_root_heuristic: SingleRootHeuristic,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            eps: 1E-4,
            mu: 1E-4,
            max_k: 4,
            max_roots_per_contour: 10,
            max_depth: 16,
            max_evaluations: None,
            max_tiles: 64,
            ordering: RootOrdering::default(),
            single_root_heuristic: SingleRootHeuristic::default(),
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    #[must_use]
    pub fn with_mu(mut self, mu: f64) -> Self {
        self.mu = mu;
        self
    }

    #[must_use]
    pub fn with_max_k(mut self, max_k: u32) -> Self {
        self.max_k = max_k;
        self
    }

    #[must_use]
    pub fn with_max_roots_per_contour(mut self, max_roots: usize) -> Self {
        self.max_roots_per_contour = max_roots;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_max_evaluations(mut self, max_evaluations: Option<u64>) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    #[must_use]
    pub fn with_max_tiles(mut self, max_tiles: usize) -> Self {
        self.max_tiles = max_tiles;
        self
    }

    #[must_use]
    pub fn with_ordering(mut self, ordering: RootOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    #[must_use]
    pub fn with_single_root_heuristic(mut self, heuristic: SingleRootHeuristic) -> Self {
        self.single_root_heuristic = heuristic;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.eps.is_finite() && self.eps > 0.0) {
            return Err(Error::InvalidConfig("eps must be positive and finite"));
        }
        if !(self.mu.is_finite() && self.mu > 0.0) {
            return Err(Error::InvalidConfig("mu must be positive and finite"));
        }
        if self.max_roots_per_contour == 0 {
            return Err(Error::InvalidConfig(
                "max_roots_per_contour must be at least one",
            ));
        }
        if self.max_tiles == 0 {
            return Err(Error::InvalidConfig("max_tiles must be at least one"));
        }
        Ok(())
    }
}
