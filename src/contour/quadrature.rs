//! Adaptive Gauss-Kronrod quadrature of `w^k / f(z)` along straight boundary
//! segments.
//!
//! Panels keep the 15 samples of `1 / f` they were integrated with, so the
//! moments of any contour sharing a segment can be recomputed without
//! evaluating `f` again.

use std::rc::Rc;

use num::{complex::Complex64, Zero};

use crate::util::{casting::usize_to_f64, complex::c_is_finite};

/// Kronrod nodes on `[-1, 1]`. The Gauss nodes are the odd indices.
const XGK: [f64; 15] = [
    -0.991_455_371_120_812_6,
    -0.949_107_912_342_758_5,
    -0.864_864_423_359_769_1,
    -0.741_531_185_599_394_4,
    -0.586_087_235_467_691_1,
    -0.405_845_151_377_397_2,
    -0.207_784_955_007_898_5,
    0.0,
    0.207_784_955_007_898_5,
    0.405_845_151_377_397_2,
    0.586_087_235_467_691_1,
    0.741_531_185_599_394_4,
    0.864_864_423_359_769_1,
    0.949_107_912_342_758_5,
    0.991_455_371_120_812_6,
];

const WGK: [f64; 15] = [
    0.022_935_322_010_529_224,
    0.063_092_092_629_978_56,
    0.104_790_010_322_250_18,
    0.140_653_259_715_525_92,
    0.169_004_726_639_267_9,
    0.190_350_578_064_785_4,
    0.204_432_940_075_298_89,
    0.209_482_141_084_727_82,
    0.204_432_940_075_298_89,
    0.190_350_578_064_785_4,
    0.169_004_726_639_267_9,
    0.140_653_259_715_525_92,
    0.104_790_010_322_250_18,
    0.063_092_092_629_978_56,
    0.022_935_322_010_529_224,
];

const WG: [f64; 7] = [
    0.129_484_966_168_869_7,
    0.279_705_391_489_276_64,
    0.381_830_050_505_118_9,
    0.417_959_183_673_469_4,
    0.381_830_050_505_118_9,
    0.279_705_391_489_276_64,
    0.129_484_966_168_869_7,
];

/// Contour-local coordinates `w = (z - center) / radius`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Basis {
    pub center: Complex64,
    pub radius: f64,
}

impl Basis {
    #[inline]
    fn local(&self, z: Complex64) -> Complex64 {
        (z - self.center) / self.radius
    }
}

/// Acceptance rule of a panel: every moment `k < moments` must satisfy
/// `|K15 - G7| <= eps * mass_k`, at most `max_k` bisections deep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Rule {
    pub eps: f64,
    pub max_k: u32,
    pub moments: usize,
}

#[derive(Debug)]
struct Panel {
    start: Complex64,
    end: Complex64,
    /// `1 / f` at the Kronrod nodes
    samples: [Complex64; 15],
}

impl Panel {
    fn sample(eval: &impl Fn(Complex64) -> Complex64, start: Complex64, end: Complex64) -> Self {
        let mid = (start + end) * 0.5;
        let half = (end - start) * 0.5;
        let mut samples = [Complex64::zero(); 15];
        for (s, x) in samples.iter_mut().zip(XGK) {
            *s = eval(mid + half * x).inv();
        }
        Self {
            start,
            end,
            samples,
        }
    }

    /// Calls `visit(k, kronrod, gauss, mass)` for the first `count` moments.
    fn rules(
        &self,
        basis: &Basis,
        count: usize,
        mut visit: impl FnMut(usize, Complex64, Complex64, f64),
    ) {
        let mid = (self.start + self.end) * 0.5;
        let half = (self.end - self.start) * 0.5;
        let mut ws = [Complex64::zero(); 15];
        for (w, x) in ws.iter_mut().zip(XGK) {
            *w = basis.local(mid + half * x);
        }
        let mut terms = self.samples;
        for k in 0..count {
            let mut kronrod = Complex64::zero();
            let mut mass = 0.0;
            for (t, wgk) in terms.iter().zip(WGK) {
                kronrod += *t * wgk;
                mass += t.norm() * wgk;
            }
            let mut gauss = Complex64::zero();
            for (j, wg) in WG.iter().enumerate() {
                gauss += terms[2 * j + 1] * *wg;
            }
            visit(k, kronrod * half, gauss * half, mass * half.norm());
            for (t, w) in terms.iter_mut().zip(ws) {
                *t *= w;
            }
        }
    }

    fn accepted(&self, basis: &Basis, rule: &Rule) -> bool {
        if !self.samples.iter().copied().all(c_is_finite) {
            // bisecting will not make a pole go away
            return true;
        }
        let mut ok = true;
        self.rules(basis, rule.moments, |_, kronrod, gauss, mass| {
            ok &= (kronrod - gauss).norm() <= rule.eps * mass;
        });
        ok
    }
}

/// Integrate `[start, end]`, bisecting until the panel is accepted.
fn adaptive(
    eval: &impl Fn(Complex64) -> Complex64,
    start: Complex64,
    end: Complex64,
    depth: u32,
    basis: &Basis,
    rule: &Rule,
    out: &mut Vec<Piece>,
) {
    let panel = Panel::sample(eval, start, end);
    if depth < rule.max_k && !panel.accepted(basis, rule) {
        log::trace!("bisecting panel {{start: {start}, end: {end}, depth: {depth}}}");
        let mid = (start + end) * 0.5;
        adaptive(eval, start, mid, depth + 1, basis, rule, out);
        adaptive(eval, mid, end, depth + 1, basis, rule, out);
        return;
    }
    out.push(Piece {
        panel: Rc::new(panel),
        reversed: false,
    });
}

/// A panel traversed forward or backward. Panels are shared between the
/// contours on both sides of a segment, which traverse it in opposite
/// directions.
#[derive(Clone, Debug)]
struct Piece {
    panel: Rc<Panel>,
    reversed: bool,
}

impl Piece {
    fn head(&self) -> Complex64 {
        if self.reversed {
            self.panel.end
        } else {
            self.panel.start
        }
    }

    fn tail(&self) -> Complex64 {
        if self.reversed {
            self.panel.start
        } else {
            self.panel.end
        }
    }
}

/// Straight run of panels, in traversal order.
#[derive(Clone, Debug, Default)]
pub(crate) struct Side {
    pieces: Vec<Piece>,
}

impl Side {
    /// Integrate the segment `[start, end]` starting from `panels` equal
    /// panels.
    pub(crate) fn integrate(
        eval: &impl Fn(Complex64) -> Complex64,
        start: Complex64,
        end: Complex64,
        panels: usize,
        basis: &Basis,
        rule: &Rule,
    ) -> Self {
        let panels = panels.max(1);
        let step = (end - start) / usize_to_f64(panels);
        let mut pieces = vec![];
        for i in 0..panels {
            let a = start + step * usize_to_f64(i);
            // last panel ends exactly on the corner
            let b = if i + 1 == panels {
                end
            } else {
                start + step * usize_to_f64(i + 1)
            };
            adaptive(eval, a, b, 0, basis, rule, &mut pieces);
        }
        Self { pieces }
    }

    pub(crate) fn start(&self) -> Option<Complex64> {
        self.pieces.first().map(Piece::head)
    }

    pub(crate) fn end(&self) -> Option<Complex64> {
        self.pieces.last().map(Piece::tail)
    }

    /// The same samples, traversed in the opposite direction.
    pub(crate) fn reversed(&self) -> Self {
        let pieces = self
            .pieces
            .iter()
            .rev()
            .map(|p| Piece {
                panel: Rc::clone(&p.panel),
                reversed: !p.reversed,
            })
            .collect();
        Self { pieces }
    }

    /// Split the side at `point`, which must lie on it. Panels entirely on
    /// one side of `point` are shared, the single panel straddling it (if
    /// any) is integrated again as two panels.
    pub(crate) fn split_at(
        &self,
        eval: &impl Fn(Complex64) -> Complex64,
        point: Complex64,
        basis: &Basis,
        rule: &Rule,
    ) -> (Self, Self) {
        let (Some(start), Some(end)) = (self.start(), self.end()) else {
            return (Self::default(), Self::default());
        };
        let length = (end - start).norm();
        let dir = (end - start) / length;
        let position = |z: Complex64| ((z - start) * dir.conj()).re;
        let at = position(point);
        let tol = length * 1E-12;

        let mut before = vec![];
        let mut after = vec![];
        for piece in &self.pieces {
            let (from, to) = (piece.head(), piece.tail());
            if position(to) <= at + tol {
                before.push(piece.clone());
            } else if position(from) >= at - tol {
                after.push(piece.clone());
            } else {
                adaptive(eval, from, point, 0, basis, rule, &mut before);
                adaptive(eval, point, to, 0, basis, rule, &mut after);
            }
        }
        (Self { pieces: before }, Self { pieces: after })
    }

    /// Add the integrals of `w^k / f` and `|w^k / f| |dz|` along this side,
    /// for `k < moments.len()`.
    pub(crate) fn accumulate(&self, basis: &Basis, moments: &mut [Complex64], masses: &mut [f64]) {
        debug_assert_eq!(moments.len(), masses.len());
        for piece in &self.pieces {
            let sign = if piece.reversed { -1.0 } else { 1.0 };
            piece.panel.rules(basis, moments.len(), |k, kronrod, _, mass| {
                moments[k] += kronrod * sign;
                masses[k] += mass;
            });
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pieces.len()
    }
}
