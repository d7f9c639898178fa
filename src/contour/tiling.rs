use super::Contour;
use crate::function::ComplexFunction;

/// Grid position of a contour in a sweep, in units of the seed contour's size.
/// The seed is `(0, 0)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tile {
    pub col: usize,
    pub row: usize,
}

impl Tile {
    /// L-shaped shell of the up-right growth the tile belongs to
    #[must_use]
    pub fn shell(self) -> usize {
        self.col.max(self.row)
    }
}

impl<F: ComplexFunction + ?Sized> Contour<'_, F> {
    /// The same-size tile immediately to the right.
    #[must_use]
    pub fn expand_right(&self) -> Self {
        self.neighbour(true, false)
    }

    /// Same-size tiles of the next L-shaped shell that grow out of this one.
    ///
    /// Every tile of shell `s + 1` is produced by exactly one tile of shell
    /// `s`: the right neighbour by tiles on the right edge of the shell, the
    /// upper neighbour by tiles on the top edge, and the corner only grows
    /// diagonally as well. Expanding every tile of a shell therefore never
    /// yields the same tile twice.
    ///
    /// ```
    /// use contour_roots::{complex, Contour, SearchConfig, Tile};
    /// use num::complex::Complex64;
    ///
    /// let f = |z: Complex64| z;
    /// let seed = Contour::new(&f, complex!(0.0), complex!(1.0, 1.0), 1, &SearchConfig::default()).unwrap();
    /// let tiles: Vec<Tile> = seed.expand_up_right().iter().map(|c| c.tile()).collect();
    /// assert_eq!(
    ///     tiles,
    ///     vec![
    ///         Tile { col: 1, row: 0 },
    ///         Tile { col: 0, row: 1 },
    ///         Tile { col: 1, row: 1 },
    ///     ]
    /// );
    /// ```
    #[must_use]
    pub fn expand_up_right(&self) -> Vec<Self> {
        let Tile { col, row } = self.tile;
        let shell = self.tile.shell();
        let mut out = vec![];
        if col == shell {
            out.push(self.neighbour(true, false));
        }
        if row == shell {
            out.push(self.neighbour(false, true));
        }
        if col == shell && row == shell {
            out.push(self.neighbour(true, true));
        }
        out
    }

    fn neighbour(&self, right: bool, up: bool) -> Self {
        let (mut bottom_left, mut top_right) = (self.bottom_left, self.top_right);
        // shift by the size of the tile, sharing the edge exactly
        if right {
            bottom_left.re = self.top_right.re;
            top_right.re += self.width();
        }
        if up {
            bottom_left.im = self.top_right.im;
            top_right.im += self.height();
        }
        let mut next = self.sibling(bottom_left, top_right, self.max_roots);
        next.tile = Tile {
            col: self.tile.col + usize::from(right),
            row: self.tile.row + usize::from(up),
        };
        next
    }
}
