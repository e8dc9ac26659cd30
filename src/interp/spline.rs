//! Cubic spline with not-a-knot end conditions: the third derivative is
//! continuous across the second and second-to-last knots.

use super::{in_domain, interval, Interpolant};

pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivative at each knot.
    m: Vec<f64>,
    extrapolate: bool,
}

impl CubicSpline {
    /// Needs at least four knots.
    pub fn new(xs: &[f64], ys: &[f64], extrapolate: bool) -> Self {
        Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            m: second_derivatives(xs, ys),
            extrapolate,
        }
    }
}

impl Interpolant for CubicSpline {
    fn eval(&self, x: f64) -> f64 {
        if x.is_nan() || (!self.extrapolate && !in_domain(&self.xs, x)) {
            return f64::NAN;
        }
        let i = interval(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;
        a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a * a * a - a) * self.m[i] + (b * b * b - b) * self.m[i + 1]) * h * h / 6.0
    }

    fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}

/// Knot curvatures from the tridiagonal system over the interior knots.
/// The end curvatures are eliminated through the not-a-knot conditions,
/// which only changes the first and last rows.
fn second_derivatives(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut m = vec![0.0; n];
    if n < 4 {
        return m;
    }

    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let inner = n - 2;
    let mut sub = vec![0.0; inner];
    let mut diag = vec![0.0; inner];
    let mut sup = vec![0.0; inner];
    let mut rhs = vec![0.0; inner];
    for k in 0..inner {
        let i = k + 1;
        sub[k] = h[i - 1];
        diag[k] = 2.0 * (h[i - 1] + h[i]);
        sup[k] = h[i];
        rhs[k] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
    }

    let (h0, h1) = (h[0], h[1]);
    diag[0] = (h0 + h1) * (h0 + 2.0 * h1) / h1;
    sup[0] = (h1 * h1 - h0 * h0) / h1;
    let (a, b) = (h[n - 3], h[n - 2]);
    sub[inner - 1] = (a * a - b * b) / a;
    diag[inner - 1] = (a + b) * (2.0 * a + b) / a;

    // Thomas algorithm.
    for k in 1..inner {
        let w = sub[k] / diag[k - 1];
        diag[k] -= w * sup[k - 1];
        rhs[k] -= w * rhs[k - 1];
    }
    m[inner] = rhs[inner - 1] / diag[inner - 1];
    for k in (0..inner - 1).rev() {
        m[k + 1] = (rhs[k] - sup[k] * m[k + 2]) / diag[k];
    }

    m[0] = ((h0 + h1) * m[1] - h0 * m[2]) / h1;
    m[n - 1] = ((a + b) * m[n - 2] - b * m[n - 3]) / a;
    m
}
