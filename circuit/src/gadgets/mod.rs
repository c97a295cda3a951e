//! Constraint gadgets.
//!
//! Every gadget allocates its variables in `new` and emits its relations in
//! `generate_constraints`. Witness values are computed lazily from the values
//! of the inputs, so the same code runs in setup mode where nothing is
//! assigned and the constraint shape is identical.

pub mod bits;
pub mod curve;
pub mod float;
pub mod math;
pub mod transfer;

pub use bits::{BitDecomposition, StrictBits, pack_bits};
pub use curve::PointOnCurve;
pub use float::{AccuracyBound, FloatDecode};
pub use math::{FieldLessThan, RangeLeq, RangedAdd, RangedSub};
pub use transfer::Transfer;
