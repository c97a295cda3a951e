//! Bit decompositions.

use ark_bn254::Fr;
use ark_ff::{BigInteger, One, PrimeField};
use ark_r1cs_std::{
    R1CSVar,
    alloc::AllocVar,
    boolean::Boolean,
    eq::EqGadget,
    fields::{FieldVar, fp::FpVar},
};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::constants::FIELD_BITS;

/// Little-endian bit `i` of the canonical representation of `value`.
pub(crate) fn field_bit(value: Fr, i: usize) -> bool {
    value.into_bigint().get_bit(i)
}

/// Recombines little-endian bits into one linear combination.
pub fn pack_bits(bits: &[Boolean<Fr>]) -> FpVar<Fr> {
    let mut acc = FpVar::zero();
    let mut coeff = Fr::one();
    for bit in bits {
        acc += FpVar::from(bit.clone()) * coeff;
        coeff += coeff;
    }
    acc
}

fn alloc_bits(
    cs: &ConstraintSystemRef<Fr>,
    packed: &FpVar<Fr>,
    num_bits: usize,
) -> Result<Vec<Boolean<Fr>>, SynthesisError> {
    (0..num_bits)
        .map(|i| Boolean::new_witness(cs.clone(), || Ok(field_bit(packed.value()?, i))))
        .collect()
}

/// A value together with its `num_bits` little-endian bits.
///
/// Binding the bits to the value is also the range check `value < 2^num_bits`;
/// with `num_bits < FIELD_BITS` the decomposition is unique.
#[derive(Clone, Debug)]
pub struct BitDecomposition {
    pub packed: FpVar<Fr>,
    pub bits: Vec<Boolean<Fr>>,
}

impl BitDecomposition {
    /// Allocates a fresh witness value and its bits.
    pub fn new_witness(
        cs: ConstraintSystemRef<Fr>,
        num_bits: usize,
        f: impl FnOnce() -> Result<Fr, SynthesisError>,
    ) -> Result<Self, SynthesisError> {
        let packed = FpVar::new_witness(cs.clone(), f)?;
        Self::from_packed(cs, packed, num_bits)
    }

    /// Decomposes an existing variable.
    pub fn from_packed(
        cs: ConstraintSystemRef<Fr>,
        packed: FpVar<Fr>,
        num_bits: usize,
    ) -> Result<Self, SynthesisError> {
        debug_assert!(num_bits < FIELD_BITS);
        let bits = alloc_bits(&cs, &packed, num_bits)?;
        Ok(Self { packed, bits })
    }

    pub fn generate_constraints(&self) -> Result<(), SynthesisError> {
        pack_bits(&self.bits).enforce_equal(&self.packed)
    }
}

/// Canonical decomposition of an arbitrary field element: all `FIELD_BITS`
/// bits, additionally constrained to encode an integer below the modulus so
/// no element has two representations.
#[derive(Clone, Debug)]
pub struct StrictBits {
    packed: FpVar<Fr>,
    pub bits: Vec<Boolean<Fr>>,
}

impl StrictBits {
    pub fn new(cs: ConstraintSystemRef<Fr>, packed: &FpVar<Fr>) -> Result<Self, SynthesisError> {
        let bits = alloc_bits(&cs, packed, FIELD_BITS)?;
        Ok(Self {
            packed: packed.clone(),
            bits,
        })
    }

    pub fn generate_constraints(&self) -> Result<(), SynthesisError> {
        pack_bits(&self.bits).enforce_equal(&self.packed)?;
        Boolean::enforce_in_field_le(&self.bits)
    }
}
