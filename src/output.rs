//! Results output formatting (CSV).

use crate::error::Result;
use crate::table::{Axis, CharacterizationTable};
use ndarray::{ArrayD, Axis as ArrayAxis};
use std::io::Write;

/// Write a lookup result as CSV.
///
/// Format:
/// ```csv
/// 1.2e-6
/// 3.4e-6
/// ```
/// for 1-D results, one comma-separated line per row for 2-D results.
/// Higher ranks are flattened to rows along the last axis. Undefined
/// samples are written as `NaN`.
pub fn write_csv<W: Write>(result: &ArrayD<f64>, writer: &mut W) -> Result<()> {
    match result.ndim() {
        0 => {
            if let Some(v) = result.first() {
                writeln!(writer, "{}", format_value(*v))?;
            }
        }
        1 => {
            for v in result.iter() {
                writeln!(writer, "{}", format_value(*v))?;
            }
        }
        n => {
            for row in result.lanes(ArrayAxis(n - 1)) {
                let line: Vec<String> = row.iter().map(|v| format_value(*v)).collect();
                writeln!(writer, "{}", line.join(","))?;
            }
        }
    }
    Ok(())
}

/// Write a table summary: width, axis ranges and stored quantities.
///
/// Format:
/// ```csv
/// Field,Value
/// W,1e-6
/// L,0.18:0.35 (2 points)
/// Quantities,ID GM GDS
/// ```
pub fn write_info<W: Write>(table: &CharacterizationTable, writer: &mut W) -> Result<()> {
    writeln!(writer, "Field,Value")?;
    writeln!(writer, "W,{}", table.width())?;
    for axis in Axis::ALL {
        let values = table.axis(axis);
        let (min, max) = table.axes().range(axis);
        writeln!(writer, "{},{}:{} ({} points)", axis, min, max, values.len())?;
    }
    let names: Vec<&str> = table.stored().map(|q| q.name()).collect();
    writeln!(writer, "Quantities,{}", names.join(" "))?;
    Ok(())
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        v.to_string()
    }
}
