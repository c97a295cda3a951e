//! Padding slot. Changes nothing and publishes nothing.

use ark_bn254::Fr;
use ark_r1cs_std::boolean::Boolean;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use super::outputs::TransactionOutputs;
use super::state::{TransactionSnapshot, TransactionState};
use super::{TransactionCircuit, TransactionType};
use crate::errors::WitnessError;
use crate::params::Params;

#[derive(Clone, Debug)]
pub struct NoopCircuit {
    outputs: TransactionOutputs,
}

impl TransactionCircuit for NoopCircuit {
    type Input = ();
    type Witness = ();

    const TYPE: TransactionType = TransactionType::Noop;

    fn assign_witness(
        _params: &Params,
        _snapshot: &TransactionSnapshot,
        _input: &(),
    ) -> Result<(), WitnessError> {
        Ok(())
    }

    fn build(
        _cs: ConstraintSystemRef<Fr>,
        params: &Params,
        state: &TransactionState,
        _witness: Option<&()>,
    ) -> Result<Self, SynthesisError> {
        Ok(Self {
            outputs: TransactionOutputs::unchanged(params, state),
        })
    }

    fn generate_constraints(&self) -> Result<(), SynthesisError> {
        Ok(())
    }

    fn outputs(&self) -> &TransactionOutputs {
        &self.outputs
    }

    fn public_data(&self) -> Vec<Boolean<Fr>> {
        Vec::new()
    }
}
