//! Quantity specifications and on-demand ratio synthesis.
//!
//! A lookup names either a base quantity (`ID`) or a ratio of two base
//! quantities joined by an underscore (`GM_ID`, `ID_W`). Ratios are never
//! stored in the table; `resolve` divides the two operand arrays each time.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use ndarray::{Array4, Zip};

use crate::error::{LookupError, Result};
use crate::table::{CharacterizationTable, Quantity};

/// Token separating numerator and denominator in a ratio name.
pub const RATIO_SEPARATOR: char = '_';

/// A base quantity or a ratio of two base quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantitySpec {
    Base(Quantity),
    Ratio {
        numerator: Quantity,
        denominator: Quantity,
    },
}

impl QuantitySpec {
    pub fn ratio(numerator: Quantity, denominator: Quantity) -> Self {
        QuantitySpec::Ratio {
            numerator,
            denominator,
        }
    }

    pub fn is_ratio(&self) -> bool {
        matches!(self, QuantitySpec::Ratio { .. })
    }

    /// `(numerator, denominator)` for ratios.
    pub fn operands(&self) -> Option<(Quantity, Quantity)> {
        match *self {
            QuantitySpec::Ratio {
                numerator,
                denominator,
            } => Some((numerator, denominator)),
            QuantitySpec::Base(_) => None,
        }
    }

    /// Whether the ratio is exactly `numerator / denominator`.
    pub fn is_pair(&self, numerator: Quantity, denominator: Quantity) -> bool {
        self.operands() == Some((numerator, denominator))
    }
}

impl fmt::Display for QuantitySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantitySpec::Base(q) => write!(f, "{}", q),
            QuantitySpec::Ratio {
                numerator,
                denominator,
            } => write!(f, "{}{}{}", numerator, RATIO_SEPARATOR, denominator),
        }
    }
}

impl From<Quantity> for QuantitySpec {
    fn from(q: Quantity) -> Self {
        QuantitySpec::Base(q)
    }
}

impl FromStr for QuantitySpec {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        match token.split_once(RATIO_SEPARATOR) {
            None => Ok(QuantitySpec::Base(token.parse()?)),
            Some((num, den)) => {
                if num.is_empty() || den.is_empty() || den.contains(RATIO_SEPARATOR) {
                    return Err(LookupError::Config(format!(
                        "malformed ratio '{}', expected NUM_DEN",
                        token
                    )));
                }
                Ok(QuantitySpec::ratio(num.parse()?, den.parse()?))
            }
        }
    }
}

/// Resolve a quantity specification to its 4-D sample array.
///
/// Base quantities borrow the table's storage. Ratios are computed
/// elementwise; when either operand is `W` the width scalar is used
/// directly. A zero denominator yields NaN at that sample.
pub fn resolve<'a>(
    table: &'a CharacterizationTable,
    spec: &QuantitySpec,
) -> Result<Cow<'a, Array4<f64>>> {
    let (numerator, denominator) = match *spec {
        QuantitySpec::Base(q) => return table.base(q),
        QuantitySpec::Ratio {
            numerator,
            denominator,
        } => (numerator, denominator),
    };

    let w = table.width();
    let samples = match (numerator, denominator) {
        (Quantity::W, Quantity::W) => Array4::from_elem(table.shape(), 1.0),
        (num, Quantity::W) => table.base(num)?.mapv(|v| v / w),
        (Quantity::W, den) => table.base(den)?.mapv(|d| safe_div(w, d)),
        (num, den) => {
            let (n, d) = (table.base(num)?, table.base(den)?);
            safe_divide(&n, &d)
        }
    };
    Ok(Cow::Owned(samples))
}

/// Elementwise `num / den` with NaN wherever `den == 0`.
pub fn safe_divide(num: &Array4<f64>, den: &Array4<f64>) -> Array4<f64> {
    Zip::from(num).and(den).map_collect(|&n, &d| safe_div(n, d))
}

fn safe_div(n: f64, d: f64) -> f64 {
    if d == 0.0 {
        f64::NAN
    } else {
        n / d
    }
}
