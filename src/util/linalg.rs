use anyhow::ensure;
use num::{complex::Complex64, Zero};

use super::complex::c_is_finite;

/// A dense, row-major square matrix. Only as much as the moment solver needs.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SquareMatrix {
    n: usize,
    data: Vec<Complex64>,
}

impl SquareMatrix {
    pub(crate) fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> Complex64) -> Self {
        let mut data = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                data.push(f(i, j));
            }
        }
        Self { n, data }
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> Complex64 {
        self.data[i * self.n + j]
    }

    #[inline]
    fn get_mut(&mut self, i: usize, j: usize) -> &mut Complex64 {
        &mut self.data[i * self.n + j]
    }

    fn swap_rows(&mut self, i: usize, k: usize) {
        if i == k {
            return;
        }
        for j in 0..self.n {
            self.data.swap(i * self.n + j, k * self.n + j);
        }
    }

    fn max_norm(&self) -> f64 {
        self.data.iter().map(|z| z.norm()).fold(0.0, f64::max)
    }
}

/// Solve `a x = b` with Gaussian elimination and partial pivoting.
///
/// Pivots smaller than `rank_tolerance` times the largest entry of `a` are
/// treated as zero and their unknown is set to zero. Consistent but rank
/// deficient systems therefore still produce a (particular) solution instead
/// of exploding.
///
/// Returns the solution and the numerical rank of `a` (the number of pivots).
pub(crate) fn solve_rank_deficient(
    a: &SquareMatrix,
    b: &[Complex64],
    rank_tolerance: f64,
) -> anyhow::Result<(Vec<Complex64>, usize)> {
    let n = a.n;
    ensure!(
        b.len() == n,
        "right hand side has length {} but the matrix is {n}x{n}",
        b.len()
    );
    ensure!(
        a.data.iter().chain(b).copied().all(c_is_finite),
        "linear system contains non-finite entries"
    );

    let mut m = a.clone();
    let mut rhs = b.to_vec();
    let threshold = rank_tolerance * m.max_norm();
    let mut pivots = Vec::with_capacity(n);

    let mut row = 0;
    for col in 0..n {
        if row == n {
            break;
        }
        let (p, p_norm) = (row..n)
            .map(|r| (r, m.get(r, col).norm()))
            .fold((row, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        if p_norm <= threshold || p_norm == 0.0 {
            log::trace!("free column {{col: {col}, pivot: {p_norm:e}}}");
            continue;
        }
        m.swap_rows(row, p);
        rhs.swap(row, p);

        let pivot = m.get(row, col);
        for r in (row + 1)..n {
            let factor = m.get(r, col) / pivot;
            if factor.is_zero() {
                continue;
            }
            for c in col..n {
                let delta = factor * m.get(row, c);
                *m.get_mut(r, c) -= delta;
            }
            let delta = factor * rhs[row];
            rhs[r] -= delta;
        }
        pivots.push((row, col));
        row += 1;
    }

    let mut x = vec![Complex64::zero(); n];
    for &(r, c) in pivots.iter().rev() {
        let mut s = rhs[r];
        for k in (c + 1)..n {
            s -= m.get(r, k) * x[k];
        }
        x[c] = s / m.get(r, c);
    }
    Ok((x, pivots.len()))
}
