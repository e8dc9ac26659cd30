//! Multilinear interpolation over the table's rectilinear 4-D grid.
//!
//! For each query point, every axis contributes a bracketing pair of grid
//! indices and a fractional weight; the result is the weighted sum over the
//! 16 surrounding samples. Points outside the grid hull evaluate to NaN.

use ndarray::Array4;

use crate::table::{Axes, Axis};

/// Relative slack (of the axis span) allowed when testing a coordinate
/// against the grid hull, so ranges like `0:0.1:1` reach the last knot.
const HULL_TOLERANCE: f64 = 1e-12;

/// Borrowed view of a 4-D sample array together with its axes.
pub struct RegularGrid<'a> {
    axes: [&'a [f64]; 4],
    values: &'a Array4<f64>,
}

/// Bracketing index and weight of the upper neighbour along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bracket {
    lo: usize,
    t: f64,
}

impl<'a> RegularGrid<'a> {
    pub fn new(axes: &'a Axes, values: &'a Array4<f64>) -> Self {
        Self {
            axes: Axis::ALL.map(|a| axes.get(a)),
            values,
        }
    }

    /// Interpolate at one `[l, vgs, vds, vsb]` point.
    pub fn eval(&self, point: [f64; 4]) -> f64 {
        let mut brackets = [Bracket { lo: 0, t: 0.0 }; 4];
        for (dim, &coord) in point.iter().enumerate() {
            match bracket(self.axes[dim], coord) {
                Some(b) => brackets[dim] = b,
                None => return f64::NAN,
            }
        }

        let mut sum = 0.0;
        for corner in 0..16usize {
            let mut weight = 1.0;
            let mut idx = [0usize; 4];
            for dim in 0..4 {
                let upper = (corner >> dim) & 1 == 1;
                let b = brackets[dim];
                weight *= if upper { b.t } else { 1.0 - b.t };
                idx[dim] = if upper { b.lo + 1 } else { b.lo };
            }
            // Zero-weight corners are skipped so a NaN neighbour cannot
            // poison a point that sits exactly on a grid line.
            if weight == 0.0 {
                continue;
            }
            sum += weight * self.values[idx];
        }
        sum
    }

    /// Interpolate at every point of the Cartesian product of the four query
    /// vectors, in row-major `(l, vgs, vds, vsb)` order.
    pub fn eval_product(&self, query: &[Vec<f64>; 4]) -> Vec<f64> {
        let mut out = Vec::with_capacity(query.iter().map(Vec::len).product());
        for &l in &query[0] {
            for &vgs in &query[1] {
                for &vds in &query[2] {
                    for &vsb in &query[3] {
                        out.push(self.eval([l, vgs, vds, vsb]));
                    }
                }
            }
        }
        out
    }
}

/// Locate `x` on a strictly increasing axis. `None` outside the hull.
fn bracket(axis: &[f64], x: f64) -> Option<Bracket> {
    if x.is_nan() {
        return None;
    }
    let first = axis[0];
    let last = axis[axis.len() - 1];
    let slack = HULL_TOLERANCE * (last - first).abs().max(first.abs()).max(1.0);

    if axis.len() == 1 {
        return ((x - first).abs() <= slack).then_some(Bracket { lo: 0, t: 0.0 });
    }
    if x < first - slack || x > last + slack {
        return None;
    }
    let x = x.clamp(first, last);
    let lo = super::interval(axis, x);
    let t = (x - axis[lo]) / (axis[lo + 1] - axis[lo]);
    Some(Bracket { lo, t })
}
