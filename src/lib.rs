//! Lookup engine over pre-characterized MOSFET parameter tables.
//!
//! A [`CharacterizationTable`] holds 4-D sample arrays indexed by
//! `(L, VGS, VDS, VSB)`. On top of it:
//!
//! - [`forward_lookup`] evaluates base quantities and ratios such as
//!   `GM_ID` on the grid, or one ratio against another (`GM_CGG` vs `GM_ID`);
//! - [`inverse_vgs`] finds the VGS giving a target gm/ID or ID/W.

pub mod error;
pub mod interp;
pub mod inverse;
pub mod lookup;
pub mod output;
pub mod parser;
pub mod ratio;
pub mod request;
pub mod stats;
pub mod table;

pub use error::{LookupError, Result};
pub use interp::Method;
pub use inverse::{inverse_vgs, Bias, InverseRequest, InverseTarget};
pub use lookup::{forward_lookup, lookup};
pub use parser::{CharacterizationFile, Polarity};
pub use ratio::QuantitySpec;
pub use request::LookupRequest;
pub use table::{Axes, Axis, CharacterizationTable, Quantity};
