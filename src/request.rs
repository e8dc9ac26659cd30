//! Forward lookup requests.
//!
//! A request names the output quantity, optionally a ratio input with its
//! query values (cross lookup), per-axis bound values and the interpolation
//! method. Axis value text accepts a single number, a comma-separated list,
//! or a `start:step:end` range (end exclusive).

use nom::bytes::complete::tag;
use nom::character::complete::space0;
use nom::combinator::{all_consuming, map};
use nom::multi::separated_list1;
use nom::sequence::delimited;
use nom::IResult;
use nom::Parser;

use crate::error::{LookupError, Result};
use crate::interp::Method;
use crate::parser::eng_value;
use crate::ratio::QuantitySpec;
use crate::table::{Axis, CharacterizationTable};

/// Ratio input of a cross lookup: the ratio and the values it is queried at.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossInput {
    pub ratio: QuantitySpec,
    pub values: Vec<f64>,
}

/// How a request is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Base output, grid interpolation
    Grid,
    /// Ratio output, grid interpolation
    RatioGrid,
    /// Ratio output as a function of a ratio input
    Cross,
}

impl Mode {
    pub fn number(self) -> u8 {
        match self {
            Mode::Grid => 1,
            Mode::RatioGrid => 2,
            Mode::Cross => 3,
        }
    }
}

/// A forward lookup request.
///
/// Unbound axes take table defaults: the smallest L, the full VGS sweep,
/// half the largest VDS and VSB = 0.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupRequest {
    pub output: QuantitySpec,
    pub input: Option<CrossInput>,
    pub l: Option<Vec<f64>>,
    pub vgs: Option<Vec<f64>>,
    pub vds: Option<Vec<f64>>,
    pub vsb: Option<Vec<f64>>,
    pub method: Method,
}

impl LookupRequest {
    pub fn new(output: QuantitySpec) -> Self {
        Self {
            output,
            input: None,
            l: None,
            vgs: None,
            vds: None,
            vsb: None,
            method: Method::default(),
        }
    }

    /// Build a request from string tokens, e.g.
    /// `from_args("GM_CGG", &[("GM_ID", "5:0.5:20"), ("L", "0.18,0.35")])`.
    pub fn from_args(output: &str, args: &[(&str, &str)]) -> Result<Self> {
        let mut request = Self::new(output.parse()?);
        for (name, value) in args {
            request.bind(name, value)?;
        }
        request.mode()?;
        Ok(request)
    }

    pub fn with_axis(mut self, axis: Axis, values: Vec<f64>) -> Self {
        *self.axis_slot(axis) = Some(values);
        self
    }

    pub fn with_input(mut self, ratio: QuantitySpec, values: Vec<f64>) -> Self {
        self.input = Some(CrossInput { ratio, values });
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Bind one named argument: an axis (`L`, `VGS`, `VDS`, `VSB`), a ratio
    /// input (`GM_ID`, ...) or `METHOD`.
    pub fn bind(&mut self, name: &str, value: &str) -> Result<()> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("METHOD") {
            self.method = value.parse()?;
            return Ok(());
        }
        if let Ok(axis) = name.parse::<Axis>() {
            *self.axis_slot(axis) = Some(parse_values(value)?);
            return Ok(());
        }

        let spec: QuantitySpec = name.parse()?;
        if !spec.is_ratio() {
            return Err(LookupError::Config(format!(
                "argument '{}' must be an axis or a ratio",
                name
            )));
        }
        if let Some(existing) = &self.input {
            return Err(LookupError::Config(format!(
                "only one ratio input is allowed, got {} and {}",
                existing.ratio, spec
            )));
        }
        self.input = Some(CrossInput {
            ratio: spec,
            values: parse_values(value)?,
        });
        Ok(())
    }

    pub fn axis_values(&self, axis: Axis) -> Option<&[f64]> {
        match axis {
            Axis::L => self.l.as_deref(),
            Axis::Vgs => self.vgs.as_deref(),
            Axis::Vds => self.vds.as_deref(),
            Axis::Vsb => self.vsb.as_deref(),
        }
    }

    fn axis_slot(&mut self, axis: Axis) -> &mut Option<Vec<f64>> {
        match axis {
            Axis::L => &mut self.l,
            Axis::Vgs => &mut self.vgs,
            Axis::Vds => &mut self.vds,
            Axis::Vsb => &mut self.vsb,
        }
    }

    /// Classify the request, rejecting inconsistent combinations.
    pub fn mode(&self) -> Result<Mode> {
        for axis in Axis::ALL {
            if let Some(values) = self.axis_values(axis) {
                check_values(axis.name(), values)?;
            }
        }

        let Some(input) = &self.input else {
            return Ok(if self.output.is_ratio() {
                Mode::RatioGrid
            } else {
                Mode::Grid
            });
        };

        check_values(&input.ratio.to_string(), &input.values)?;
        if !input.ratio.is_ratio() {
            return Err(LookupError::Config(format!(
                "cross lookup input '{}' must be a ratio",
                input.ratio
            )));
        }
        if !self.output.is_ratio() {
            return Err(LookupError::Config(format!(
                "cross lookup on '{}' requires a ratio output",
                input.ratio
            )));
        }
        let swept: Vec<&str> = Axis::ALL
            .iter()
            .filter(|a| self.axis_values(**a).is_some_and(|v| v.len() > 1))
            .map(|a| a.name())
            .collect();
        if swept.len() > 1 {
            return Err(LookupError::Config(format!(
                "cross lookup allows one swept axis, got {}",
                swept.join(", ")
            )));
        }
        Ok(Mode::Cross)
    }

    /// Query vector for `axis`: the bound values or the table default.
    pub fn resolved_axis(&self, table: &CharacterizationTable, axis: Axis) -> Vec<f64> {
        if let Some(values) = self.axis_values(axis) {
            return values.to_vec();
        }
        default_axis(table, axis)
    }

    /// All four query vectors in storage order.
    pub fn resolved_axes(&self, table: &CharacterizationTable) -> [Vec<f64>; 4] {
        Axis::ALL.map(|axis| self.resolved_axis(table, axis))
    }
}

/// Table default for an unbound axis.
pub fn default_axis(table: &CharacterizationTable, axis: Axis) -> Vec<f64> {
    let (min, max) = table.axes().range(axis);
    match axis {
        Axis::L => vec![min],
        Axis::Vgs => table.axis(Axis::Vgs).to_vec(),
        Axis::Vds => vec![max / 2.0],
        Axis::Vsb => vec![0.0],
    }
}

fn check_values(name: &str, values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(LookupError::Config(format!("{} has no values", name)));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(LookupError::Config(format!("{} has non-finite values", name)));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Value text parsing
// ---------------------------------------------------------------------------

/// Parse axis/ratio value text: `0.5`, `0.2, 0.4, 0.6` or `0:0.1:1`.
pub fn parse_values(text: &str) -> Result<Vec<f64>> {
    let text = text.trim();
    if text.contains(':') {
        let (_, (start, step, end)) = range_triple(text).map_err(|_| {
            LookupError::Config(format!(
                "malformed range '{}', expected start:step:end",
                text
            ))
        })?;
        return arange(start, step, end);
    }
    let (_, values) = all_consuming(separated_list1(delimited(space0, tag(","), space0), number))
        .parse(text)
        .map_err(|_| LookupError::Config(format!("malformed value list '{}'", text)))?;
    Ok(values)
}

fn number(input: &str) -> IResult<&str, f64> {
    eng_value(input)
}

fn range_triple(input: &str) -> IResult<&str, (f64, f64, f64)> {
    let sep = || delimited(space0, tag(":"), space0);
    all_consuming(map(
        (number, sep(), number, sep(), number),
        |(start, _, step, _, end)| (start, step, end),
    ))
    .parse(input)
}

/// Longest range `arange` will expand.
pub const MAX_RANGE_POINTS: usize = 1_000_000;

/// `start, start + step, ...` up to but excluding `end`.
pub fn arange(start: f64, step: f64, end: f64) -> Result<Vec<f64>> {
    if step == 0.0 || !step.is_finite() {
        return Err(LookupError::Config(format!("invalid range step {}", step)));
    }
    let count = ((end - start) / step).ceil();
    if !count.is_finite() || count < 1.0 {
        return Err(LookupError::Config(format!(
            "range {}:{}:{} is empty",
            start, step, end
        )));
    }
    if count > MAX_RANGE_POINTS as f64 {
        return Err(LookupError::Config(format!(
            "range {}:{}:{} has more than {} points",
            start, step, end, MAX_RANGE_POINTS
        )));
    }
    Ok((0..count as usize).map(|i| start + step * i as f64).collect())
}
