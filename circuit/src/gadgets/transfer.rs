//! Value-conserving balance transfer.

use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use super::math::{RangedAdd, RangedSub};

/// Moves `amount` from one balance to another.
///
/// The payer side is a range-checked subtraction, so overdrawing has no
/// satisfying assignment. The payee side is range checked to the same width.
/// Both sides use the same `amount` variable, so the sum of the two balances
/// is preserved.
#[derive(Clone, Debug)]
pub struct Transfer {
    from: RangedSub,
    to: RangedAdd,
}

impl Transfer {
    pub fn new(
        cs: ConstraintSystemRef<Fr>,
        from: &FpVar<Fr>,
        to: &FpVar<Fr>,
        amount: &FpVar<Fr>,
        amount_bits: usize,
    ) -> Result<Self, SynthesisError> {
        Ok(Self {
            from: RangedSub::new(cs.clone(), from, amount, amount_bits)?,
            to: RangedAdd::new(cs, to, amount, amount_bits)?,
        })
    }

    pub fn generate_constraints(&self) -> Result<(), SynthesisError> {
        self.from.generate_constraints()?;
        self.to.generate_constraints()
    }

    pub fn from_after(&self) -> &FpVar<Fr> {
        self.from.result()
    }

    pub fn to_after(&self) -> &FpVar<Fr> {
        self.to.result()
    }
}
