//! Characterization table data model.
//!
//! A `CharacterizationTable` holds one device polarity's sweep: four axis
//! vectors (L, VGS, VDS, VSB), the device width and one 4-D sample array per
//! base quantity, indexed `[l, vgs, vds, vsb]`. Tables are immutable once
//! built.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ndarray::Array4;

use crate::error::{LookupError, Result};

/// One of the four independent table axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// Channel length
    L,
    /// Gate-source voltage
    Vgs,
    /// Drain-source voltage
    Vds,
    /// Source-body voltage
    Vsb,
}

impl Axis {
    /// Axes in storage order.
    pub const ALL: [Axis; 4] = [Axis::L, Axis::Vgs, Axis::Vds, Axis::Vsb];

    pub fn name(self) -> &'static str {
        match self {
            Axis::L => "L",
            Axis::Vgs => "VGS",
            Axis::Vds => "VDS",
            Axis::Vsb => "VSB",
        }
    }

    /// Position of this axis in a sample array index.
    pub fn index(self) -> usize {
        match self {
            Axis::L => 0,
            Axis::Vgs => 1,
            Axis::Vds => 2,
            Axis::Vsb => 3,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Axis {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(Axis::L),
            "VGS" => Ok(Axis::Vgs),
            "VDS" => Ok(Axis::Vds),
            "VSB" => Ok(Axis::Vsb),
            other => Err(LookupError::Config(format!("unknown axis '{}'", other))),
        }
    }
}

/// Closed vocabulary of base quantities a table can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quantity {
    L,
    W,
    Vgs,
    Vds,
    Vsb,
    Id,
    Vt,
    Igd,
    Igs,
    Gm,
    Gmb,
    Gds,
    Cgg,
    Cgs,
    Csg,
    Cgd,
    Cdg,
    Cgb,
    Cdd,
    Css,
    Sth,
    Sfl,
}

impl Quantity {
    pub const ALL: [Quantity; 22] = [
        Quantity::L,
        Quantity::W,
        Quantity::Vgs,
        Quantity::Vds,
        Quantity::Vsb,
        Quantity::Id,
        Quantity::Vt,
        Quantity::Igd,
        Quantity::Igs,
        Quantity::Gm,
        Quantity::Gmb,
        Quantity::Gds,
        Quantity::Cgg,
        Quantity::Cgs,
        Quantity::Csg,
        Quantity::Cgd,
        Quantity::Cdg,
        Quantity::Cgb,
        Quantity::Cdd,
        Quantity::Css,
        Quantity::Sth,
        Quantity::Sfl,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Quantity::L => "L",
            Quantity::W => "W",
            Quantity::Vgs => "VGS",
            Quantity::Vds => "VDS",
            Quantity::Vsb => "VSB",
            Quantity::Id => "ID",
            Quantity::Vt => "VT",
            Quantity::Igd => "IGD",
            Quantity::Igs => "IGS",
            Quantity::Gm => "GM",
            Quantity::Gmb => "GMB",
            Quantity::Gds => "GDS",
            Quantity::Cgg => "CGG",
            Quantity::Cgs => "CGS",
            Quantity::Csg => "CSG",
            Quantity::Cgd => "CGD",
            Quantity::Cdg => "CDG",
            Quantity::Cgb => "CGB",
            Quantity::Cdd => "CDD",
            Quantity::Css => "CSS",
            Quantity::Sth => "STH",
            Quantity::Sfl => "SFL",
        }
    }

    /// The table axis this quantity mirrors, if it is a bias/geometry axis.
    pub fn axis(self) -> Option<Axis> {
        match self {
            Quantity::L => Some(Axis::L),
            Quantity::Vgs => Some(Axis::Vgs),
            Quantity::Vds => Some(Axis::Vds),
            Quantity::Vsb => Some(Axis::Vsb),
            _ => None,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Quantity {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Quantity::ALL
            .iter()
            .copied()
            .find(|q| q.name() == upper)
            .ok_or_else(|| LookupError::UnknownQuantity(s.trim().to_string()))
    }
}

/// The four sweep axes of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    pub l: Vec<f64>,
    pub vgs: Vec<f64>,
    pub vds: Vec<f64>,
    pub vsb: Vec<f64>,
}

impl Axes {
    /// Build the axis set. A missing VSB sweep becomes `[0.0]`.
    pub fn new(l: Vec<f64>, vgs: Vec<f64>, vds: Vec<f64>, vsb: Option<Vec<f64>>) -> Self {
        Self {
            l,
            vgs,
            vds,
            vsb: vsb.unwrap_or_else(|| vec![0.0]),
        }
    }

    pub fn get(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::L => &self.l,
            Axis::Vgs => &self.vgs,
            Axis::Vds => &self.vds,
            Axis::Vsb => &self.vsb,
        }
    }

    /// Sample array shape `(|L|, |VGS|, |VDS|, |VSB|)`.
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        (self.l.len(), self.vgs.len(), self.vds.len(), self.vsb.len())
    }

    /// Smallest and largest value along an axis.
    pub fn range(&self, axis: Axis) -> (f64, f64) {
        let values = self.get(axis);
        // Validated non-empty and increasing at construction.
        (values[0], values[values.len() - 1])
    }

    fn validate(&self) -> Result<()> {
        for axis in Axis::ALL {
            let values = self.get(axis);
            if values.is_empty() {
                return Err(LookupError::InvalidTable(format!("axis {} is empty", axis)));
            }
            if values.iter().any(|v| !v.is_finite()) {
                return Err(LookupError::InvalidTable(format!(
                    "axis {} contains non-finite values",
                    axis
                )));
            }
            if values.windows(2).any(|w| w[1] <= w[0]) {
                return Err(LookupError::InvalidTable(format!(
                    "axis {} must be strictly increasing",
                    axis
                )));
            }
        }
        Ok(())
    }
}

/// Immutable characterization data for one device polarity.
#[derive(Debug, Clone)]
pub struct CharacterizationTable {
    axes: Axes,
    width: f64,
    data: BTreeMap<Quantity, Array4<f64>>,
}

impl CharacterizationTable {
    /// Build a table, checking axis ordering and that every sample array
    /// matches the axis shape.
    pub fn new<I>(axes: Axes, width: f64, data: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Quantity, Array4<f64>)>,
    {
        axes.validate()?;
        if !width.is_finite() || width <= 0.0 {
            return Err(LookupError::InvalidTable(format!(
                "device width must be positive, got {}",
                width
            )));
        }

        let expected = axes.shape();
        let mut map = BTreeMap::new();
        for (quantity, samples) in data {
            if samples.dim() != expected {
                return Err(LookupError::InvalidTable(format!(
                    "{} has shape {:?}, expected {:?}",
                    quantity,
                    samples.dim(),
                    expected
                )));
            }
            if map.insert(quantity, samples).is_some() {
                return Err(LookupError::InvalidTable(format!(
                    "{} supplied more than once",
                    quantity
                )));
            }
        }

        tracing::debug!(
            shape = ?expected,
            quantities = map.len(),
            width,
            "Characterization table built"
        );

        Ok(Self {
            axes,
            width,
            data: map,
        })
    }

    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    pub fn axis(&self, axis: Axis) -> &[f64] {
        self.axes.get(axis)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn shape(&self) -> (usize, usize, usize, usize) {
        self.axes.shape()
    }

    /// Whether `quantity` can be served, either stored or synthesized from
    /// the axes/width.
    pub fn contains(&self, quantity: Quantity) -> bool {
        self.data.contains_key(&quantity) || quantity == Quantity::W || quantity.axis().is_some()
    }

    /// Quantities that can be served, in vocabulary order.
    pub fn quantities(&self) -> impl Iterator<Item = Quantity> + '_ {
        Quantity::ALL.into_iter().filter(|q| self.contains(*q))
    }

    /// Quantities backed by a stored sample array.
    pub fn stored(&self) -> impl Iterator<Item = Quantity> + '_ {
        self.data.keys().copied()
    }

    /// The 4-D sample array for a base quantity.
    ///
    /// Stored arrays are borrowed. Axis quantities and `W` are broadcast
    /// across the grid when the source did not store them.
    pub fn base(&self, quantity: Quantity) -> Result<Cow<'_, Array4<f64>>> {
        if let Some(samples) = self.data.get(&quantity) {
            return Ok(Cow::Borrowed(samples));
        }
        if quantity == Quantity::W {
            return Ok(Cow::Owned(Array4::from_elem(self.shape(), self.width)));
        }
        if let Some(axis) = quantity.axis() {
            let values = self.axes.get(axis);
            let samples = Array4::from_shape_fn(self.shape(), |(l, g, d, s)| {
                let idx = [l, g, d, s];
                values[idx[axis.index()]]
            });
            return Ok(Cow::Owned(samples));
        }
        Err(LookupError::DataUnavailable(quantity.name().to_string()))
    }
}
