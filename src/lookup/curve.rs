//! Ratio-vs-ratio curves extracted along the VGS axis.

use ndarray::ArrayView1;

use crate::ratio::QuantitySpec;
use crate::table::Quantity;

/// Branch selection applied to a curve whose x turns around along VGS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    None,
    /// Keep the samples from the peak onward.
    KeepAfterPeak,
    /// Keep the samples up to and including the peak.
    KeepUpToPeak,
}

impl Repair {
    /// Repair rule for a curve whose x is `input`.
    ///
    /// gm/ID rises through a peak in weak inversion before decaying; only the
    /// decaying branch is single-valued in VGS. gm/Cgg and gm/Cgs fall off
    /// past their peak at strong inversion, so the rising branch is kept.
    /// Other ratios are taken as monotone.
    pub fn for_input(input: &QuantitySpec) -> Self {
        if input.is_pair(Quantity::Gm, Quantity::Id) {
            Repair::KeepAfterPeak
        } else if input.is_pair(Quantity::Gm, Quantity::Cgg)
            || input.is_pair(Quantity::Gm, Quantity::Cgs)
        {
            Repair::KeepUpToPeak
        } else {
            Repair::None
        }
    }
}

/// Paired samples `(x, y)` from one VGS sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Curve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Curve {
    /// Pair up samples in VGS order, dropping pairs with a non-finite member.
    pub fn extract(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Self {
        let (x, y) = x
            .iter()
            .zip(y.iter())
            .filter(|(a, b)| a.is_finite() && b.is_finite())
            .map(|(&a, &b)| (a, b))
            .unzip();
        Self { x, y }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Apply `repair`, sort by x and drop consecutive duplicate x values
    /// (first occurrence kept). The result has strictly increasing x.
    pub fn repaired(mut self, repair: Repair) -> Self {
        if let Some(peak) = peak_index(&self.x) {
            match repair {
                Repair::KeepAfterPeak => {
                    self.x.drain(..peak);
                    self.y.drain(..peak);
                }
                Repair::KeepUpToPeak => {
                    self.x.truncate(peak + 1);
                    self.y.truncate(peak + 1);
                }
                Repair::None => {}
            }
        }

        let mut pairs: Vec<(f64, f64)> = self.x.into_iter().zip(self.y).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        pairs.dedup_by(|next, kept| next.0 == kept.0);
        let (x, y) = pairs.into_iter().unzip();
        Self { x, y }
    }
}

/// Index of the first local maximum reached after a rising run, i.e. where
/// an increase is first followed by a decrease. `None` if x never turns.
fn peak_index(x: &[f64]) -> Option<usize> {
    let mut rising = false;
    let mut peak = 0;
    for i in 1..x.len() {
        if x[i] > x[i - 1] {
            rising = true;
            peak = i;
        } else if x[i] < x[i - 1] && rising {
            return Some(peak);
        }
    }
    None
}
