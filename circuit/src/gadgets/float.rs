//! In-circuit float decoding and the accuracy bound.

use ark_bn254::Fr;
use ark_ff::{Field, One};
use ark_r1cs_std::{
    R1CSVar,
    alloc::AllocVar,
    boolean::Boolean,
    fields::{FieldVar, fp::FpVar},
};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use super::bits::{BitDecomposition, pack_bits};
use super::math::RangeLeq;
use crate::float::{Accuracy, FloatEncoding};

/// Decodes a float into `mantissa * base^exponent`.
///
/// Exponent bit `j` selects a factor of `base^(2^j)` or `1`; the factors are
/// multiplied into the mantissa one at a time, one product witness each.
#[derive(Clone, Debug)]
pub struct FloatDecode {
    float: BitDecomposition,
    steps: Vec<(FpVar<Fr>, FpVar<Fr>, FpVar<Fr>)>,
    value: FpVar<Fr>,
}

impl FloatDecode {
    pub fn new(
        cs: ConstraintSystemRef<Fr>,
        encoding: &FloatEncoding,
        f: impl FnOnce() -> Result<Fr, SynthesisError>,
    ) -> Result<Self, SynthesisError> {
        let float = BitDecomposition::new_witness(cs.clone(), encoding.num_bits(), f)?;
        let (mantissa_bits, exponent_bits) = float.bits.split_at(encoding.mantissa_bits);

        let mut acc = pack_bits(mantissa_bits);
        let mut power = Fr::from(encoding.base);
        let mut steps = Vec::with_capacity(exponent_bits.len());
        for bit in exponent_bits {
            let factor = FpVar::from(bit.clone()) * (power - Fr::one()) + Fr::one();
            let product = FpVar::new_witness(cs.clone(), || Ok(acc.value()? * factor.value()?))?;
            steps.push((acc, factor, product.clone()));
            acc = product;
            power.square_in_place();
        }

        Ok(Self {
            float,
            steps,
            value: acc,
        })
    }

    pub fn generate_constraints(&self) -> Result<(), SynthesisError> {
        self.float.generate_constraints()?;
        for (acc, factor, product) in &self.steps {
            acc.mul_equals(factor, product)?;
        }
        Ok(())
    }

    /// Little-endian bits of the encoded float.
    pub fn bits(&self) -> &[Boolean<Fr>] {
        &self.float.bits
    }

    pub fn value(&self) -> &FpVar<Fr> {
        &self.value
    }
}

/// Enforces `value <= original` and `original * N <= value * D`.
///
/// `original` must already be range checked to `amount_bits`.
#[derive(Clone, Debug)]
pub struct AccuracyBound {
    not_above: RangeLeq,
    within: RangeLeq,
}

impl AccuracyBound {
    pub fn new(
        cs: ConstraintSystemRef<Fr>,
        value: &FpVar<Fr>,
        original: &FpVar<Fr>,
        accuracy: &Accuracy,
        amount_bits: usize,
    ) -> Result<Self, SynthesisError> {
        let not_above = RangeLeq::new(cs.clone(), value, original, amount_bits)?;
        let scaled_original = original * Fr::from(accuracy.numerator);
        let scaled_value = value * Fr::from(accuracy.denominator);
        let within = RangeLeq::new(
            cs,
            &scaled_original,
            &scaled_value,
            amount_bits + accuracy.num_bits(),
        )?;
        Ok(Self { not_above, within })
    }

    pub fn generate_constraints(&self) -> Result<(), SynthesisError> {
        self.not_above.generate_constraints()?;
        self.within.generate_constraints()
    }
}
