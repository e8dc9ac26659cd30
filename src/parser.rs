//! Characterization table file parser.
//!
//! Reads a plain-text sweep dump into `CharacterizationTable`s.
//!
//! # Supported syntax
//!
//! ```text
//! * comment line
//! .DEVICE NCH|PCH           (start a device block)
//! .W value                  (device width)
//! .AXIS L|VGS|VDS|VSB v...  (axis values, strictly increasing)
//! .DATA NAME v...           (samples, row-major: L outermost, VSB innermost)
//! + v...                    (continuation of the previous .AXIS/.DATA)
//! v...                      (bare number lines also continue it)
//! .END
//! ```
//!
//! Values support engineering suffixes: T, G, MEG, K, M, U, N, P, F
//! (case-insensitive). `NaN` marks an undefined sample. Directives before
//! the first `.DEVICE` belong to an implicit NCH block. VSB may be omitted,
//! in which case it defaults to a single 0 V point.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use ndarray::Array4;
use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::combinator::{all_consuming, map, opt};
use nom::number::complete::double;
use nom::IResult;
use nom::Parser;

use crate::error::{LookupError, Result};
use crate::table::{Axes, Axis, CharacterizationTable, Quantity};

/// Device polarity of a table block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Polarity {
    Nch,
    Pch,
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Nch => f.write_str("nch"),
            Polarity::Pch => f.write_str("pch"),
        }
    }
}

impl FromStr for Polarity {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NCH" | "N" | "NMOS" => Ok(Polarity::Nch),
            "PCH" | "P" | "PMOS" => Ok(Polarity::Pch),
            other => Err(LookupError::Config(format!("unknown device polarity '{}'", other))),
        }
    }
}

/// All device tables read from one file.
#[derive(Debug, Clone)]
pub struct CharacterizationFile {
    pub devices: Vec<(Polarity, CharacterizationTable)>,
}

impl CharacterizationFile {
    pub fn device(&self, polarity: Polarity) -> Option<&CharacterizationTable> {
        self.devices
            .iter()
            .find(|(p, _)| *p == polarity)
            .map(|(_, t)| t)
    }

    /// NCH if present, otherwise PCH.
    pub fn primary(&self) -> Option<(Polarity, &CharacterizationTable)> {
        [Polarity::Nch, Polarity::Pch]
            .into_iter()
            .find_map(|p| self.device(p).map(|t| (p, t)))
    }
}

/// Read and parse a table file from disk.
pub fn load(path: impl AsRef<Path>) -> Result<CharacterizationFile> {
    let input = std::fs::read_to_string(path)?;
    parse(&input)
}

/// Parse table file text.
pub fn parse(input: &str) -> Result<CharacterizationFile> {
    let mut devices = Vec::new();
    let mut block: Option<DeviceBlock> = None;

    for (line_num, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim();

        // Skip blank lines and comments
        if line.is_empty() || line.starts_with('*') {
            continue;
        }

        let upper = line.to_uppercase();
        if upper == ".END" {
            break;
        }

        if upper.starts_with(".DEVICE") {
            if let Some(done) = block.take() {
                devices.push(done.finish()?);
            }
            let polarity = line[".DEVICE".len()..]
                .trim()
                .parse()
                .map_err(|e: LookupError| parse_err(line_num, raw_line, &e.to_string()))?;
            block = Some(DeviceBlock::new(polarity, line_num));
            continue;
        }

        let current = block.get_or_insert_with(|| DeviceBlock::new(Polarity::Nch, line_num));
        current
            .feed(line)
            .map_err(|e| parse_err(line_num, raw_line, &e))?;
    }

    if let Some(done) = block.take() {
        devices.push(done.finish()?);
    }
    if devices.is_empty() {
        return Err(LookupError::Parse("no device data found".into()));
    }
    for (i, (polarity, _)) in devices.iter().enumerate() {
        if devices[..i].iter().any(|(p, _)| p == polarity) {
            return Err(LookupError::Parse(format!(
                "duplicate {} device block",
                polarity
            )));
        }
    }

    Ok(CharacterizationFile { devices })
}

fn parse_err(line_num: usize, raw_line: &str, detail: &str) -> LookupError {
    LookupError::Parse(format!("line {}: {} in: {}", line_num + 1, detail, raw_line))
}

// ---------------------------------------------------------------------------
// Device block accumulation
// ---------------------------------------------------------------------------

/// Which list continuation lines extend.
#[derive(Debug, Clone, Copy)]
enum Target {
    Axis(Axis),
    Data(Quantity),
}

struct DeviceBlock {
    polarity: Polarity,
    start_line: usize,
    width: Option<f64>,
    axes: BTreeMap<Axis, Vec<f64>>,
    data: BTreeMap<Quantity, Vec<f64>>,
    target: Option<Target>,
}

impl DeviceBlock {
    fn new(polarity: Polarity, start_line: usize) -> Self {
        Self {
            polarity,
            start_line,
            width: None,
            axes: BTreeMap::new(),
            data: BTreeMap::new(),
            target: None,
        }
    }

    fn feed(&mut self, line: &str) -> std::result::Result<(), String> {
        let mut tokens = line.split_whitespace();
        let Some(head) = tokens.next() else {
            return Ok(());
        };

        if !head.starts_with('.') {
            let values = if head == "+" {
                parse_numbers(tokens)?
            } else {
                parse_numbers(line.split_whitespace())?
            };
            return self.extend(values);
        }

        let directive = head.to_uppercase();
        match directive.as_str() {
            ".W" => {
                let values = parse_numbers(tokens)?;
                if values.len() != 1 {
                    return Err(".W takes exactly one value".into());
                }
                self.width = Some(values[0]);
                self.target = None;
            }
            ".AXIS" => {
                let name = tokens.next().ok_or("expected axis name after .AXIS")?;
                let axis: Axis = name.parse().map_err(|e: LookupError| e.to_string())?;
                if self.axes.insert(axis, Vec::new()).is_some() {
                    return Err(format!("axis {} defined twice", axis));
                }
                self.target = Some(Target::Axis(axis));
                self.extend(parse_numbers(tokens)?)?;
            }
            ".DATA" => {
                let name = tokens.next().ok_or("expected quantity name after .DATA")?;
                let quantity: Quantity = name.parse().map_err(|e: LookupError| e.to_string())?;
                if self.data.insert(quantity, Vec::new()).is_some() {
                    return Err(format!("data for {} defined twice", quantity));
                }
                self.target = Some(Target::Data(quantity));
                self.extend(parse_numbers(tokens)?)?;
            }
            other => return Err(format!("unknown directive '{}'", other)),
        }
        Ok(())
    }

    fn extend(&mut self, values: Vec<f64>) -> std::result::Result<(), String> {
        let slot = match self.target {
            Some(Target::Axis(axis)) => self.axes.entry(axis).or_default(),
            Some(Target::Data(q)) => self.data.entry(q).or_default(),
            None => return Err("values outside of an .AXIS or .DATA block".into()),
        };
        slot.extend(values);
        Ok(())
    }

    fn finish(mut self) -> Result<(Polarity, CharacterizationTable)> {
        let context = |detail: String| {
            LookupError::Parse(format!(
                "{} block starting at line {}: {}",
                self.polarity,
                self.start_line + 1,
                detail
            ))
        };

        let width = self.width.ok_or_else(|| context("missing .W".into()))?;
        let mut take_axis = |axis: Axis| self.axes.remove(&axis);
        let l = take_axis(Axis::L).ok_or_else(|| context("missing .AXIS L".into()))?;
        let vgs = take_axis(Axis::Vgs).ok_or_else(|| context("missing .AXIS VGS".into()))?;
        let vds = take_axis(Axis::Vds).ok_or_else(|| context("missing .AXIS VDS".into()))?;
        let vsb = take_axis(Axis::Vsb);
        let axes = Axes::new(l, vgs, vds, vsb);
        let shape = axes.shape();

        let mut arrays = Vec::with_capacity(self.data.len());
        for (quantity, samples) in std::mem::take(&mut self.data) {
            let found = samples.len();
            let samples = Array4::from_shape_vec(shape, samples).map_err(|_| {
                context(format!(
                    "{} has {} samples, expected {} for shape {:?}",
                    quantity,
                    found,
                    shape.0 * shape.1 * shape.2 * shape.3,
                    shape
                ))
            })?;
            arrays.push((quantity, samples));
        }

        let table = CharacterizationTable::new(axes, width, arrays)?;
        Ok((self.polarity, table))
    }
}

fn parse_numbers<'a>(
    tokens: impl Iterator<Item = &'a str>,
) -> std::result::Result<Vec<f64>, String> {
    tokens
        .map(|tok| {
            if tok.eq_ignore_ascii_case("nan") {
                return Ok(f64::NAN);
            }
            all_consuming(eng_value)
                .parse(tok)
                .map(|(_, v)| v)
                .map_err(|_| format!("invalid number '{}'", tok))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Engineering suffix value parser
// ---------------------------------------------------------------------------

/// Parse a numeric value with optional engineering suffix.
/// Handles: 10k, 100n, 4.7u, 1MEG, 1e3, -3.3, etc.
pub(crate) fn eng_value(input: &str) -> IResult<&str, f64> {
    let (rest, num) = double(input)?;
    let (rest, suffix) = opt(eng_suffix).parse(rest)?;
    let multiplier = suffix.unwrap_or(1.0);
    Ok((rest, num * multiplier))
}

/// Match an engineering suffix and return its multiplier.
fn eng_suffix(input: &str) -> IResult<&str, f64> {
    // MEG must be tried before M
    alt((
        map(tag_no_case("MEG"), |_: &str| 1e6),
        map(tag_no_case("T"), |_: &str| 1e12),
        map(tag_no_case("G"), |_: &str| 1e9),
        map(tag_no_case("K"), |_: &str| 1e3),
        map(tag_no_case("M"), |_: &str| 1e-3),
        map(tag_no_case("U"), |_: &str| 1e-6),
        map(tag_no_case("N"), |_: &str| 1e-9),
        map(tag_no_case("P"), |_: &str| 1e-12),
        map(tag_no_case("F"), |_: &str| 1e-15),
    ))
    .parse(input)
}
