//! Piecewise cubic Hermite interpolating polynomial (PCHIP).
//!
//! Knot derivatives follow Fritsch–Carlson: zero at local extrema, a
//! weighted harmonic mean of the neighbouring secants elsewhere, and a
//! shape-preserving three-point formula at the two ends. The result never
//! overshoots monotone data.

use super::{in_domain, interval, Interpolant};

pub struct Pchip {
    xs: Vec<f64>,
    ys: Vec<f64>,
    slopes: Vec<f64>,
    extrapolate: bool,
}

impl Pchip {
    /// Knots are assumed validated (finite, strictly increasing, n >= 2).
    pub fn new(xs: &[f64], ys: &[f64], extrapolate: bool) -> Self {
        Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            slopes: derivatives(xs, ys),
            extrapolate,
        }
    }
}

impl Interpolant for Pchip {
    fn eval(&self, x: f64) -> f64 {
        if x.is_nan() || (!self.extrapolate && !in_domain(&self.xs, x)) {
            return f64::NAN;
        }
        let i = interval(&self.xs, x);
        hermite(
            self.xs[i],
            self.xs[i + 1],
            self.ys[i],
            self.ys[i + 1],
            self.slopes[i],
            self.slopes[i + 1],
            x,
        )
    }

    fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}

fn derivatives(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let delta: Vec<f64> = (0..n - 1).map(|k| (ys[k + 1] - ys[k]) / h[k]).collect();

    // Two knots: straight line.
    if n == 2 {
        return vec![delta[0]; 2];
    }

    let mut d = vec![0.0; n];
    for k in 1..n - 1 {
        let (d0, d1) = (delta[k - 1], delta[k]);
        if sign(d0) == 0 || sign(d0) != sign(d1) {
            continue;
        }
        let w1 = 2.0 * h[k] + h[k - 1];
        let w2 = h[k] + 2.0 * h[k - 1];
        d[k] = (w1 + w2) / (w1 / d0 + w2 / d1);
    }
    d[0] = edge_slope(h[0], h[1], delta[0], delta[1]);
    d[n - 1] = edge_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);
    d
}

/// One-sided three-point end derivative, limited to keep the end interval
/// monotone.
fn edge_slope(h0: f64, h1: f64, m0: f64, m1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * m0 - h0 * m1) / (h0 + h1);
    if sign(d) != sign(m0) {
        0.0
    } else if sign(m0) != sign(m1) && d.abs() > 3.0 * m0.abs() {
        3.0 * m0
    } else {
        d
    }
}

// `f64::signum` maps 0.0 to 1.0; the limiter needs a true zero.
fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Cubic Hermite basis evaluation on `[x0, x1]`.
pub(crate) fn hermite(x0: f64, x1: f64, y0: f64, y1: f64, d0: f64, d1: f64, x: f64) -> f64 {
    let h = x1 - x0;
    let t = (x - x0) / h;
    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;
    h00 * y0 + h10 * h * d0 + h01 * y1 + h11 * h * d1
}
