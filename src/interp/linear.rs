//! Piecewise-linear and nearest-neighbour interpolants.

use super::{in_domain, interval, Interpolant};

pub struct Linear {
    xs: Vec<f64>,
    ys: Vec<f64>,
    extrapolate: bool,
}

impl Linear {
    pub fn new(xs: &[f64], ys: &[f64], extrapolate: bool) -> Self {
        Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            extrapolate,
        }
    }
}

impl Interpolant for Linear {
    fn eval(&self, x: f64) -> f64 {
        if x.is_nan() || (!self.extrapolate && !in_domain(&self.xs, x)) {
            return f64::NAN;
        }
        let i = interval(&self.xs, x);
        lerp(self.xs[i], self.xs[i + 1], self.ys[i], self.ys[i + 1], x)
    }

    fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}

/// Value of the closest knot; ties go to the lower knot. Extrapolation holds
/// the end values.
pub struct Nearest {
    xs: Vec<f64>,
    ys: Vec<f64>,
    extrapolate: bool,
}

impl Nearest {
    pub fn new(xs: &[f64], ys: &[f64], extrapolate: bool) -> Self {
        Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            extrapolate,
        }
    }
}

impl Interpolant for Nearest {
    fn eval(&self, x: f64) -> f64 {
        if x.is_nan() || (!self.extrapolate && !in_domain(&self.xs, x)) {
            return f64::NAN;
        }
        let i = interval(&self.xs, x);
        if x - self.xs[i] <= self.xs[i + 1] - x {
            self.ys[i]
        } else {
            self.ys[i + 1]
        }
    }

    fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}

/// Straight line through `(x0, y0)` and `(x1, y1)` evaluated at `x`.
pub fn lerp(x0: f64, x1: f64, y0: f64, y1: f64, x: f64) -> f64 {
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}
