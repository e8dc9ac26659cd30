//! Cross lookup (mode 3): one ratio as a function of another.
//!
//! For each value of the sweep axis the table is snapped to the nearest
//! grid point in L, VDS and VSB, the `(input, output)` curve is extracted
//! along VGS, repaired into a single-valued branch and re-interpolated at
//! the requested input values.

use ndarray::{s, ArrayD};

use crate::error::Result;
use crate::interp::{self, Method};
use crate::request::{CrossInput, LookupRequest};
use crate::stats::Stats;
use crate::table::{Axis, CharacterizationTable};

use super::curve::{Curve, Repair};

/// Relative tolerance for matching a query against a single-point curve.
const SINGLE_POINT_RTOL: f64 = 1e-10;

/// Sweep axis priority.
const SWEEP_PRIORITY: [Axis; 4] = [Axis::L, Axis::Vds, Axis::Vgs, Axis::Vsb];

/// One evaluated entry of a sweep row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Value(f64),
    Undefined,
}

impl Sample {
    fn from_f64(v: f64) -> Self {
        if v.is_nan() {
            Sample::Undefined
        } else {
            Sample::Value(v)
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Sample::Value(v) => v,
            Sample::Undefined => f64::NAN,
        }
    }
}

/// First axis (by priority) bound to more than one value, else L.
pub fn sweep_axis(request: &LookupRequest) -> Axis {
    SWEEP_PRIORITY
        .into_iter()
        .find(|&a| request.axis_values(a).is_some_and(|v| v.len() > 1))
        .unwrap_or(Axis::L)
}

/// Index of the grid value closest to `value`; ties go to the lower index.
pub fn nearest_index(axis: &[f64], value: f64) -> usize {
    let mut best = 0;
    for (i, &v) in axis.iter().enumerate() {
        if (v - value).abs() < (axis[best] - value).abs() {
            best = i;
        }
    }
    best
}

pub fn cross_lookup(
    table: &CharacterizationTable,
    request: &LookupRequest,
    input: &CrossInput,
    mut stats: Option<&mut Stats>,
) -> Result<ArrayD<f64>> {
    let _span = tracing::info_span!("cross_lookup", input = %input.ratio).entered();

    let x_samples = crate::ratio::resolve(table, &input.ratio)?;
    let y_samples = crate::ratio::resolve(table, &request.output)?;
    let repair = Repair::for_input(&input.ratio);

    let sweep = sweep_axis(request);
    let sweep_values = request.resolved_axis(table, sweep);
    let pinned = Axis::ALL.map(|axis| {
        request
            .resolved_axis(table, axis)
            .first()
            .copied()
            .unwrap_or(f64::NAN)
    });
    tracing::debug!(sweep = %sweep, rows = sweep_values.len(), ?repair, "cross sweep");

    let queries = &input.values;
    let mut out = Vec::with_capacity(sweep_values.len() * queries.len());

    for &sweep_value in &sweep_values {
        let snap = |axis: Axis| {
            let target = if axis == sweep {
                sweep_value
            } else {
                pinned[axis.index()]
            };
            nearest_index(table.axis(axis), target)
        };
        let (li, di, si) = (snap(Axis::L), snap(Axis::Vds), snap(Axis::Vsb));

        let curve = Curve::extract(
            x_samples.slice(s![li, .., di, si]),
            y_samples.slice(s![li, .., di, si]),
        )
        .repaired(repair);

        if let Some(ref mut s) = stats {
            s.sweep_rows += 1;
            s.curve_points += curve.len();
        }

        let row = match evaluate_row(&curve, request.method, queries) {
            Ok(row) => {
                if curve.len() >= 2 {
                    if let Some(ref mut s) = stats {
                        s.interpolants_built += 1;
                    }
                }
                row
            }
            Err(e) => {
                tracing::warn!(
                    sweep = %sweep,
                    value = sweep_value,
                    points = curve.len(),
                    error = %e,
                    "cross lookup row failed, filling with NaN"
                );
                if let Some(ref mut s) = stats {
                    s.rows_failed += 1;
                }
                vec![Sample::Undefined; queries.len()]
            }
        };
        out.extend(row.into_iter().map(Sample::value));
    }

    super::squeeze(out, &[sweep_values.len(), queries.len()], false)
}

/// Evaluate one repaired curve at every query.
fn evaluate_row(curve: &Curve, method: Method, queries: &[f64]) -> Result<Vec<Sample>> {
    match curve.len() {
        0 => Ok(vec![Sample::Undefined; queries.len()]),
        1 => {
            let (x0, y0) = (curve.x[0], curve.y[0]);
            Ok(queries
                .iter()
                .map(|&q| {
                    if (q - x0).abs() <= SINGLE_POINT_RTOL * x0.abs() {
                        Sample::Value(y0)
                    } else {
                        Sample::Undefined
                    }
                })
                .collect())
        }
        _ => {
            let interpolant = interp::fit(method, &curve.x, &curve.y, false)?;
            Ok(interpolant
                .eval_many(queries)
                .into_iter()
                .map(Sample::from_f64)
                .collect())
        }
    }
}
