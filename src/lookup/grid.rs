//! Grid lookups (modes 1 and 2).
//!
//! The query is the Cartesian product of four per-axis vectors. Results are
//! reshaped to `(|L|, |VGS|, |VDS|, |VSB|)`, squeezed, and have their axes
//! reversed when more than one remains, so a `(L, VGS)` sweep comes back as
//! `(VGS, L)`.

use ndarray::ArrayD;

use crate::error::Result;
use crate::interp::grid::RegularGrid;
use crate::ratio::{self, QuantitySpec};
use crate::stats::Stats;
use crate::table::CharacterizationTable;

/// Interpolate `spec` over the product of `query` vectors.
pub fn grid_lookup(
    table: &CharacterizationTable,
    spec: &QuantitySpec,
    query: &[Vec<f64>; 4],
    stats: Option<&mut Stats>,
) -> Result<ArrayD<f64>> {
    let samples = ratio::resolve(table, spec)?;
    let grid = RegularGrid::new(table.axes(), &samples);
    let values = grid.eval_product(query);

    let outside = values.iter().filter(|v| v.is_nan()).count();
    if outside > 0 {
        tracing::debug!(outside, total = values.len(), "grid lookup produced NaN samples");
    }
    if let Some(s) = stats {
        s.grid_points += values.len();
    }

    let dims: Vec<usize> = query.iter().map(Vec::len).collect();
    super::squeeze(values, &dims, true)
}

/// Interpolate `spec` at individual `[l, vgs, vds, vsb]` points.
pub fn interpolate_points(
    table: &CharacterizationTable,
    spec: &QuantitySpec,
    points: &[[f64; 4]],
) -> Result<Vec<f64>> {
    let samples = ratio::resolve(table, spec)?;
    let grid = RegularGrid::new(table.axes(), &samples);
    Ok(points.iter().map(|&p| grid.eval(p)).collect())
}
