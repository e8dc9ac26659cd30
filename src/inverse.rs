//! Inverse lookup: the VGS that produces a target gm/ID or ID/W.
//!
//! Two bias conventions are supported:
//!
//! - **Direct**: L, VDS and VSB are given (or defaulted); the ratio is
//!   taken along the full VGS axis.
//! - **Body-referenced**: L, VGB and VDB are given. A VSB sweep over the
//!   table's VSB range yields candidate points `VGS = VGB - VSB`,
//!   `VDS = VDB - VSB`; points outside the table are discarded.
//!
//! The (ratio, VGS) pairs are then sorted by ratio and interpolated at the
//! targets. ID/W targets beyond the largest tabulated density are reached
//! by secant extrapolation through the last two points.

use std::fmt;
use std::time::Instant;

use ndarray::Array1;

use crate::error::{LookupError, Result};
use crate::interp::linear::lerp;
use crate::interp::{self, Method};
use crate::lookup::grid;
use crate::ratio::QuantitySpec;
use crate::request::{arange, parse_values};
use crate::stats::Stats;
use crate::table::{Axis, CharacterizationTable, Quantity};

/// Ratio values to solve for.
#[derive(Debug, Clone, PartialEq)]
pub enum InverseTarget {
    /// Transconductance efficiency gm/ID
    GmId(Vec<f64>),
    /// Current density ID/W
    IdW(Vec<f64>),
}

impl InverseTarget {
    pub fn ratio(&self) -> QuantitySpec {
        match self {
            InverseTarget::GmId(_) => QuantitySpec::ratio(Quantity::Gm, Quantity::Id),
            InverseTarget::IdW(_) => QuantitySpec::ratio(Quantity::Id, Quantity::W),
        }
    }

    pub fn values(&self) -> &[f64] {
        match self {
            InverseTarget::GmId(v) | InverseTarget::IdW(v) => v,
        }
    }
}

impl fmt::Display for InverseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ratio())
    }
}

/// Bias point description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bias {
    /// Unset fields default to the smallest L, half the largest VDS and
    /// VSB = 0.
    Direct {
        l: Option<f64>,
        vds: Option<f64>,
        vsb: Option<f64>,
    },
    BodyReferenced {
        l: Option<f64>,
        vgb: f64,
        vdb: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct InverseRequest {
    pub target: InverseTarget,
    pub bias: Bias,
    pub method: Method,
}

impl InverseRequest {
    pub fn new(target: InverseTarget, bias: Bias) -> Self {
        Self {
            target,
            bias,
            method: Method::default(),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Build a request from named string arguments: `GM_ID` or `ID_W`
    /// (value lists), `L`, `VDS`, `VSB`, `VGB`, `VDB` (single values) and
    /// `METHOD`.
    pub fn from_args(args: &[(&str, &str)]) -> Result<Self> {
        let mut gm_id = None;
        let mut id_w = None;
        let mut scalars: [Option<f64>; 5] = [None; 5];
        let mut method = Method::default();

        for (name, value) in args {
            let key = name.trim().to_ascii_uppercase();
            match key.as_str() {
                "GM_ID" => gm_id = Some(parse_values(value)?),
                "ID_W" => id_w = Some(parse_values(value)?),
                "METHOD" => method = value.parse()?,
                _ => {
                    let slot = SCALAR_ARGS
                        .iter()
                        .position(|&n| n == key)
                        .ok_or_else(|| {
                            LookupError::Config(format!(
                                "unexpected argument '{}' for VGS lookup",
                                name
                            ))
                        })?;
                    scalars[slot] = Some(single_value(&key, value)?);
                }
            }
        }

        let target = match (gm_id, id_w) {
            (Some(v), None) => InverseTarget::GmId(v),
            (None, Some(v)) => InverseTarget::IdW(v),
            (Some(_), Some(_)) => {
                return Err(LookupError::Config(
                    "give either GM_ID or ID_W, not both".into(),
                ))
            }
            (None, None) => {
                return Err(LookupError::Config(
                    "VGS lookup needs a GM_ID or ID_W target".into(),
                ))
            }
        };

        let [l, vds, vsb, vgb, vdb] = scalars;
        let bias = match (vgb, vdb) {
            (None, None) => Bias::Direct { l, vds, vsb },
            (Some(vgb), Some(vdb)) => {
                if vds.is_some() || vsb.is_some() {
                    return Err(LookupError::Config(
                        "VGB/VDB cannot be combined with VDS/VSB".into(),
                    ));
                }
                Bias::BodyReferenced { l, vgb, vdb }
            }
            _ => {
                return Err(LookupError::Config(
                    "VGB and VDB must be given together".into(),
                ))
            }
        };

        let request = Self {
            target,
            bias,
            method,
        };
        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> Result<()> {
        let values = self.target.values();
        if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
            return Err(LookupError::Config(format!(
                "{} targets must be finite and non-empty",
                self.target
            )));
        }
        Ok(())
    }
}

const SCALAR_ARGS: [&str; 5] = ["L", "VDS", "VSB", "VGB", "VDB"];

fn single_value(name: &str, text: &str) -> Result<f64> {
    match parse_values(text)?.as_slice() {
        [v] if v.is_finite() => Ok(*v),
        _ => Err(LookupError::Config(format!(
            "{} takes a single finite value, got '{}'",
            name, text
        ))),
    }
}

// ---------------------------------------------------------------------------
// Solving
// ---------------------------------------------------------------------------

/// Solve for VGS, returning every failure as an error.
pub fn solve(
    table: &CharacterizationTable,
    request: &InverseRequest,
    mut stats: Option<&mut Stats>,
) -> Result<Array1<f64>> {
    let _span = tracing::info_span!("inverse_vgs", target = %request.target).entered();
    request.validate()?;
    let start = stats.as_ref().map(|_| Instant::now());

    let ratio = request.target.ratio();
    let (ratios, vgs) = match request.bias {
        Bias::Direct { l, vds, vsb } => direct_curve(table, &ratio, l, vds, vsb)?,
        Bias::BodyReferenced { l, vgb, vdb } => body_curve(table, &ratio, l, vgb, vdb)?,
    };
    let result = invert(&ratios, &vgs, &request.target, request.method, stats.as_deref_mut())?;

    if let (Some(s), Some(t0)) = (stats, start) {
        s.add_phase("Inverse", t0.elapsed());
    }
    Ok(result)
}

/// Solve for VGS. Numeric dead ends (no operating points, too few valid
/// points, interpolation failure) log a warning and give an empty array;
/// malformed requests and missing data are still errors.
pub fn inverse_vgs(
    table: &CharacterizationTable,
    request: &InverseRequest,
    stats: Option<&mut Stats>,
) -> Result<Array1<f64>> {
    match solve(table, request, stats) {
        Err(e) if e.is_degraded() => {
            tracing::warn!(error = %e, target = %request.target, "VGS lookup returned no result");
            Ok(Array1::zeros(0))
        }
        other => other,
    }
}

/// Convenience wrapper over [`InverseRequest::from_args`] and
/// [`inverse_vgs`].
pub fn vgs(table: &CharacterizationTable, args: &[(&str, &str)]) -> Result<Array1<f64>> {
    let request = InverseRequest::from_args(args)?;
    inverse_vgs(table, &request, None)
}

/// Ratio along the full VGS axis at a fixed L/VDS/VSB.
fn direct_curve(
    table: &CharacterizationTable,
    ratio: &QuantitySpec,
    l: Option<f64>,
    vds: Option<f64>,
    vsb: Option<f64>,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let axes = table.axes();
    let l = l.unwrap_or(axes.range(Axis::L).0);
    let vds = vds.unwrap_or(axes.range(Axis::Vds).1 / 2.0);
    let vsb = vsb.unwrap_or(0.0);
    let vgs = table.axis(Axis::Vgs).to_vec();

    let query = [vec![l], vgs.clone(), vec![vds], vec![vsb]];
    let ratios = grid::grid_lookup(table, ratio, &query, None)?;
    Ok((ratios.iter().copied().collect(), vgs))
}

/// Ratio at body-referenced candidates along a VSB sweep.
fn body_curve(
    table: &CharacterizationTable,
    ratio: &QuantitySpec,
    l: Option<f64>,
    vgb: f64,
    vdb: f64,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let axes = table.axes();
    let l = l.unwrap_or(axes.range(Axis::L).0);
    let (vsb_min, vsb_max) = axes.range(Axis::Vsb);
    let vgs_axis = table.axis(Axis::Vgs);

    let sweep = if vsb_max > vsb_min && vgs_axis.len() >= 2 {
        let step = vgs_axis[1] - vgs_axis[0];
        arange(vsb_min, step, vsb_max + step)?
    } else {
        table.axis(Axis::Vsb).to_vec()
    };

    let inside = |axis: Axis, v: f64| {
        let (lo, hi) = axes.range(axis);
        v >= lo && v <= hi
    };
    let points: Vec<[f64; 4]> = sweep
        .iter()
        .map(|&vsb| [l, vgb - vsb, vdb - vsb, vsb])
        .filter(|p| {
            inside(Axis::L, p[0])
                && inside(Axis::Vgs, p[1])
                && inside(Axis::Vds, p[2])
                && inside(Axis::Vsb, p[3])
        })
        .collect();
    tracing::debug!(
        candidates = sweep.len(),
        retained = points.len(),
        "body-referenced operating points"
    );
    if points.is_empty() {
        return Err(LookupError::NoValidOperatingPoints);
    }

    let ratios = grid::interpolate_points(table, ratio, &points)?;
    let vgs = points.iter().map(|p| p[1]).collect();
    Ok((ratios, vgs))
}

/// Interpolate VGS as a function of the ratio at each target.
fn invert(
    ratios: &[f64],
    vgs: &[f64],
    target: &InverseTarget,
    method: Method,
    stats: Option<&mut Stats>,
) -> Result<Array1<f64>> {
    let mut pairs: Vec<(f64, f64)> = ratios
        .iter()
        .zip(vgs)
        .filter(|(r, v)| r.is_finite() && v.is_finite())
        .map(|(&r, &v)| (r, v))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    pairs.dedup_by(|next, kept| next.0 == kept.0);

    let n = pairs.len();
    if n < 2 {
        return Err(LookupError::InsufficientPoints { found: n });
    }
    let (r, v): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();

    let r_max = r[n - 1];
    let secant = |t: f64| matches!(target, InverseTarget::IdW(_)) && t > r_max;
    let interpolant = if target.values().iter().any(|&t| !secant(t)) {
        Some(interp::fit(method, &r, &v, true)?)
    } else {
        None
    };

    let mut extrapolated = 0;
    let result: Vec<f64> = target
        .values()
        .iter()
        .map(|&t| match &interpolant {
            Some(f) if !secant(t) => f.eval(t),
            _ => {
                extrapolated += 1;
                lerp(r[n - 2], r[n - 1], v[n - 2], v[n - 1], t)
            }
        })
        .collect();

    if extrapolated > 0 {
        tracing::debug!(extrapolated, r_max, "ID/W targets above table, secant extrapolation");
    }
    if let Some(s) = stats {
        s.operating_points += n;
        s.interpolants_built += u32::from(interpolant.is_some());
        s.extrapolated_targets += extrapolated;
    }
    Ok(Array1::from(result))
}
