//! One-dimensional interpolants and the rectilinear 4-D grid interpolator.

pub mod grid;
pub mod linear;
pub mod pchip;
pub mod spline;

use std::fmt;
use std::str::FromStr;

use crate::error::{LookupError, Result};

/// Interpolation kind used for curve lookups and VGS inversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Shape-preserving piecewise cubic Hermite
    #[default]
    Pchip,
    Linear,
    Nearest,
    /// Cubic spline, not-a-knot ends
    Cubic,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Method::Pchip => "pchip",
            Method::Linear => "linear",
            Method::Nearest => "nearest",
            Method::Cubic => "cubic",
        }
    }

    /// Fewest knots the method can be fit to.
    pub fn min_points(self) -> usize {
        match self {
            Method::Cubic => 4,
            _ => 2,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pchip" => Ok(Method::Pchip),
            "linear" => Ok(Method::Linear),
            "nearest" => Ok(Method::Nearest),
            "cubic" | "spline" => Ok(Method::Cubic),
            other => Err(LookupError::Config(format!(
                "unknown interpolation method '{}'",
                other
            ))),
        }
    }
}

/// A fitted 1-D interpolant.
pub trait Interpolant {
    /// Evaluate at `x`. Outside the knot range this returns NaN unless the
    /// interpolant was built with extrapolation enabled.
    fn eval(&self, x: f64) -> f64;

    /// Knot range `(min, max)`.
    fn domain(&self) -> (f64, f64);

    fn eval_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.eval(x)).collect()
    }
}

/// Fit `method` through `(xs, ys)`.
///
/// Knots must be finite and strictly increasing in x.
pub fn fit(method: Method, xs: &[f64], ys: &[f64], extrapolate: bool) -> Result<Box<dyn Interpolant>> {
    check_knots(xs, ys, method.min_points())?;
    let interpolant: Box<dyn Interpolant> = match method {
        Method::Pchip => Box::new(pchip::Pchip::new(xs, ys, extrapolate)),
        Method::Linear => Box::new(linear::Linear::new(xs, ys, extrapolate)),
        Method::Nearest => Box::new(linear::Nearest::new(xs, ys, extrapolate)),
        Method::Cubic => Box::new(spline::CubicSpline::new(xs, ys, extrapolate)),
    };
    Ok(interpolant)
}

fn check_knots(xs: &[f64], ys: &[f64], min_points: usize) -> Result<()> {
    if xs.len() != ys.len() {
        return Err(LookupError::Interpolation(format!(
            "knot length mismatch: {} x values, {} y values",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < min_points {
        return Err(LookupError::Interpolation(format!(
            "{} knots given, at least {} required",
            xs.len(),
            min_points
        )));
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Err(LookupError::Interpolation("knots must be finite".into()));
    }
    if xs.windows(2).any(|w| w[1] <= w[0]) {
        return Err(LookupError::Interpolation(
            "x knots must be strictly increasing".into(),
        ));
    }
    Ok(())
}

/// Index `i` of the knot interval `[xs[i], xs[i + 1]]` used for `x`, clamped
/// to the first/last interval outside the knot range.
pub(crate) fn interval(xs: &[f64], x: f64) -> usize {
    let last = xs.len() - 2;
    match xs.partition_point(|&k| k <= x) {
        0 => 0,
        p => (p - 1).min(last),
    }
}

pub(crate) fn in_domain(xs: &[f64], x: f64) -> bool {
    x >= xs[0] && x <= xs[xs.len() - 1]
}
