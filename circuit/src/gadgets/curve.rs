//! Curve point validity.

use ark_bn254::Fr;
use ark_ff::Field;
use ark_r1cs_std::{
    R1CSVar,
    alloc::AllocVar,
    eq::EqGadget,
    fields::{FieldVar, fp::FpVar},
};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::curve::CurveParams;

/// Enforces `a*x^2 + y^2 = 1 + d*x^2*y^2`.
#[derive(Clone, Debug)]
pub struct PointOnCurve {
    x: FpVar<Fr>,
    y: FpVar<Fr>,
    x2: FpVar<Fr>,
    y2: FpVar<Fr>,
    x2y2: FpVar<Fr>,
    params: CurveParams,
}

impl PointOnCurve {
    pub fn new(
        cs: ConstraintSystemRef<Fr>,
        params: &CurveParams,
        x: &FpVar<Fr>,
        y: &FpVar<Fr>,
    ) -> Result<Self, SynthesisError> {
        let x2 = FpVar::new_witness(cs.clone(), || Ok(x.value()?.square()))?;
        let y2 = FpVar::new_witness(cs.clone(), || Ok(y.value()?.square()))?;
        let x2y2 = FpVar::new_witness(cs, || Ok(x2.value()? * y2.value()?))?;
        Ok(Self {
            x: x.clone(),
            y: y.clone(),
            x2,
            y2,
            x2y2,
            params: *params,
        })
    }

    pub fn generate_constraints(&self) -> Result<(), SynthesisError> {
        self.x.mul_equals(&self.x, &self.x2)?;
        self.y.mul_equals(&self.y, &self.y2)?;
        self.x2.mul_equals(&self.y2, &self.x2y2)?;

        let lhs = &self.x2 * self.params.a + &self.y2;
        let rhs = &self.x2y2 * self.params.d + FpVar::one();
        lhs.enforce_equal(&rhs)
    }
}
