//! Range-bounded arithmetic and comparisons.

use ark_bn254::Fr;
use ark_r1cs_std::{
    R1CSVar, alloc::AllocVar, boolean::Boolean, eq::EqGadget, fields::fp::FpVar,
    select::CondSelectGadget,
};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use super::bits::{BitDecomposition, StrictBits};

/// `a + b`, range checked to `num_bits`.
#[derive(Clone, Debug)]
pub struct RangedAdd {
    sum: BitDecomposition,
}

impl RangedAdd {
    pub fn new(
        cs: ConstraintSystemRef<Fr>,
        a: &FpVar<Fr>,
        b: &FpVar<Fr>,
        num_bits: usize,
    ) -> Result<Self, SynthesisError> {
        let sum = BitDecomposition::from_packed(cs, a + b, num_bits)?;
        Ok(Self { sum })
    }

    pub fn generate_constraints(&self) -> Result<(), SynthesisError> {
        self.sum.generate_constraints()
    }

    pub fn result(&self) -> &FpVar<Fr> {
        &self.sum.packed
    }
}

/// `a - b`, range checked to `num_bits`. For operands below `2^num_bits`
/// this also enforces `b <= a`: an underflow wraps to a value near the
/// modulus which has no short decomposition.
#[derive(Clone, Debug)]
pub struct RangedSub {
    difference: BitDecomposition,
}

impl RangedSub {
    pub fn new(
        cs: ConstraintSystemRef<Fr>,
        a: &FpVar<Fr>,
        b: &FpVar<Fr>,
        num_bits: usize,
    ) -> Result<Self, SynthesisError> {
        let difference = BitDecomposition::from_packed(cs, a - b, num_bits)?;
        Ok(Self { difference })
    }

    pub fn generate_constraints(&self) -> Result<(), SynthesisError> {
        self.difference.generate_constraints()
    }

    pub fn result(&self) -> &FpVar<Fr> {
        &self.difference.packed
    }
}

/// Enforces `a <= b` for operands known to fit in `num_bits`.
#[derive(Clone, Debug)]
pub struct RangeLeq {
    gap: RangedSub,
}

impl RangeLeq {
    pub fn new(
        cs: ConstraintSystemRef<Fr>,
        a: &FpVar<Fr>,
        b: &FpVar<Fr>,
        num_bits: usize,
    ) -> Result<Self, SynthesisError> {
        Ok(Self {
            gap: RangedSub::new(cs, b, a, num_bits)?,
        })
    }

    pub fn generate_constraints(&self) -> Result<(), SynthesisError> {
        self.gap.generate_constraints()
    }
}

/// `a < b` over the canonical integer representatives of two arbitrary
/// field elements.
#[derive(Clone, Debug)]
pub struct FieldLessThan {
    a: StrictBits,
    b: StrictBits,
    lt: Boolean<Fr>,
}

impl FieldLessThan {
    pub fn new(
        cs: ConstraintSystemRef<Fr>,
        a: &FpVar<Fr>,
        b: &FpVar<Fr>,
    ) -> Result<Self, SynthesisError> {
        let lt = Boolean::new_witness(cs.clone(), || Ok(a.value()? < b.value()?))?;
        Ok(Self {
            a: StrictBits::new(cs.clone(), a)?,
            b: StrictBits::new(cs, b)?,
            lt,
        })
    }

    pub fn generate_constraints(&self) -> Result<(), SynthesisError> {
        self.a.generate_constraints()?;
        self.b.generate_constraints()?;

        // Scan from the least significant bit: the highest differing bit wins.
        let mut lt = Boolean::FALSE;
        for (a, b) in self.a.bits.iter().zip(&self.b.bits) {
            let differ = a ^ b;
            lt = Boolean::conditionally_select(&differ, b, &lt)?;
        }
        lt.enforce_equal(&self.lt)
    }

    pub fn lt(&self) -> &Boolean<Fr> {
        &self.lt
    }
}
