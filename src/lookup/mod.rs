//! Forward lookup: evaluate a base or ratio quantity at query points.
//!
//! Three evaluation modes exist:
//!
//! 1. Base output over the grid (multilinear interpolation).
//! 2. Ratio output over the grid, the ratio resolved first.
//! 3. Cross lookup, where the output ratio is evaluated as a function of an
//!    input ratio by extracting and re-interpolating VGS curves.
//!
//! Every result is at least 1-D. Grid results put the first swept axis
//! last after squeezing (see [`grid`]); cross results are `(sweep, x)`.

pub mod cross;
pub mod curve;
pub mod grid;

use std::time::Instant;

use ndarray::{ArrayD, IxDyn};

use crate::error::{LookupError, Result};
use crate::request::{LookupRequest, Mode};
use crate::stats::Stats;
use crate::table::CharacterizationTable;

/// Evaluate a forward lookup request against a table.
pub fn forward_lookup(
    table: &CharacterizationTable,
    request: &LookupRequest,
    mut stats: Option<&mut Stats>,
) -> Result<ArrayD<f64>> {
    let _span = tracing::info_span!("forward_lookup", output = %request.output).entered();
    let mode = request.mode()?;
    tracing::debug!(mode = mode.number(), method = %request.method, "lookup mode selected");

    let start = stats.as_ref().map(|_| Instant::now());
    let result = match (mode, &request.input) {
        (Mode::Grid | Mode::RatioGrid, _) => grid::grid_lookup(
            table,
            &request.output,
            &request.resolved_axes(table),
            stats.as_deref_mut(),
        ),
        (Mode::Cross, Some(input)) => {
            cross::cross_lookup(table, request, input, stats.as_deref_mut())
        }
        (Mode::Cross, None) => Err(LookupError::Config(
            "cross lookup requires a ratio input".into(),
        )),
    }?;

    if let (Some(s), Some(t0)) = (stats, start) {
        s.add_phase("Lookup", t0.elapsed());
    }
    Ok(result)
}

/// Convenience wrapper over [`LookupRequest::from_args`] and
/// [`forward_lookup`].
pub fn lookup(
    table: &CharacterizationTable,
    output: &str,
    args: &[(&str, &str)],
) -> Result<ArrayD<f64>> {
    let request = LookupRequest::from_args(output, args)?;
    forward_lookup(table, &request, None)
}

/// Drop size-1 axes from a row-major buffer of shape `dims`, optionally
/// reversing the remaining axes. A fully scalar result stays 1-D.
pub(crate) fn squeeze(values: Vec<f64>, dims: &[usize], reverse: bool) -> Result<ArrayD<f64>> {
    let mut kept: Vec<usize> = dims.iter().copied().filter(|&n| n > 1).collect();
    if kept.is_empty() {
        kept.push(values.len());
    }
    let array = ArrayD::from_shape_vec(IxDyn(&kept), values)
        .map_err(|e| LookupError::Interpolation(format!("result shape: {}", e)))?;
    if reverse && array.ndim() > 1 {
        Ok(array.reversed_axes().as_standard_layout().into_owned())
    } else {
        Ok(array)
    }
}
