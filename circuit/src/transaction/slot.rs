//! One transaction slot of a block.
//!
//! A slot holds exactly one of a closed set of transaction circuits, selected
//! by [`TransactionType`]. Its public data is zero padded to a fixed size and
//! committed to as public inputs.

use ark_bn254::Fr;
use ark_r1cs_std::{R1CSVar, alloc::AllocVar, boolean::Boolean, eq::EqGadget, fields::fp::FpVar};
use ark_relations::r1cs::{
    ConstraintSynthesizer, ConstraintSystem, ConstraintSystemRef, SynthesisError, SynthesisMode,
};
use tracing::{debug, warn};

use super::noop::NoopCircuit;
use super::outputs::{OutputValues, TransactionOutputs};
use super::public_key_update::{PublicKeyUpdate, PublicKeyUpdateCircuit, PublicKeyUpdateWitness};
use super::state::{TransactionSnapshot, TransactionState};
use super::{TransactionCircuit, TransactionType};
use crate::errors::{CircuitError, WitnessError};
use crate::gadgets::pack_bits;
use crate::params::Params;
use crate::public_data::{CHUNK_BYTES, bits_to_bytes, to_field_elements};

/// Concrete request for one slot
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionInput {
    Noop,
    PublicKeyUpdate(PublicKeyUpdate),
}

impl TransactionInput {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Noop => TransactionType::Noop,
            Self::PublicKeyUpdate(_) => TransactionType::PublicKeyUpdate,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotWitness {
    Noop,
    PublicKeyUpdate(PublicKeyUpdateWitness),
}

impl SlotWitness {
    pub fn assign(
        params: &Params,
        snapshot: &TransactionSnapshot,
        input: &TransactionInput,
    ) -> Result<Self, WitnessError> {
        Ok(match input {
            TransactionInput::Noop => {
                NoopCircuit::assign_witness(params, snapshot, &())?;
                Self::Noop
            }
            TransactionInput::PublicKeyUpdate(update) => Self::PublicKeyUpdate(
                PublicKeyUpdateCircuit::assign_witness(params, snapshot, update)?,
            ),
        })
    }

    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Noop => TransactionType::Noop,
            Self::PublicKeyUpdate(_) => TransactionType::PublicKeyUpdate,
        }
    }

    /// Amount owed to the operator once the slot is applied.
    pub fn fee_paid(&self) -> u128 {
        match self {
            Self::Noop => 0,
            Self::PublicKeyUpdate(w) => w.decoded_fee,
        }
    }
}

#[derive(Clone, Debug)]
pub enum SlotCircuit {
    Noop(NoopCircuit),
    PublicKeyUpdate(PublicKeyUpdateCircuit),
}

impl SlotCircuit {
    pub fn build(
        cs: ConstraintSystemRef<Fr>,
        params: &Params,
        transaction_type: TransactionType,
        state: &TransactionState,
        witness: Option<&SlotWitness>,
    ) -> Result<Self, CircuitError> {
        let slot = match (transaction_type, witness) {
            (TransactionType::Noop, None | Some(SlotWitness::Noop)) => {
                Self::Noop(NoopCircuit::build(cs, params, state, None)?)
            }
            (TransactionType::PublicKeyUpdate, None) => {
                Self::PublicKeyUpdate(PublicKeyUpdateCircuit::build(cs, params, state, None)?)
            }
            (TransactionType::PublicKeyUpdate, Some(SlotWitness::PublicKeyUpdate(w))) => {
                Self::PublicKeyUpdate(PublicKeyUpdateCircuit::build(cs, params, state, Some(w))?)
            }
            (expected, Some(w)) => {
                return Err(CircuitError::TypeMismatch {
                    expected,
                    found: w.transaction_type(),
                });
            }
        };
        Ok(slot)
    }

    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Noop(_) => NoopCircuit::TYPE,
            Self::PublicKeyUpdate(_) => PublicKeyUpdateCircuit::TYPE,
        }
    }

    pub fn generate_constraints(&self) -> Result<(), SynthesisError> {
        match self {
            Self::Noop(c) => c.generate_constraints(),
            Self::PublicKeyUpdate(c) => c.generate_constraints(),
        }
    }

    pub fn outputs(&self) -> &TransactionOutputs {
        match self {
            Self::Noop(c) => c.outputs(),
            Self::PublicKeyUpdate(c) => c.outputs(),
        }
    }

    /// Public data zero padded to the slot size.
    pub fn public_data(&self, params: &Params) -> Vec<Boolean<Fr>> {
        let mut bits = match self {
            Self::Noop(c) => c.public_data(),
            Self::PublicKeyUpdate(c) => c.public_data(),
        };
        bits.resize(params.public_data_bytes() * 8, Boolean::FALSE);
        bits
    }
}

/// Commits to public data bits as big-endian chunks of [`CHUNK_BYTES`] bytes.
fn enforce_public_inputs(
    cs: &ConstraintSystemRef<Fr>,
    bits: &[Boolean<Fr>],
) -> Result<(), SynthesisError> {
    for chunk in bits.chunks(CHUNK_BYTES * 8) {
        let le: Vec<_> = chunk.iter().rev().cloned().collect();
        let packed = pack_bits(&le);
        let input = FpVar::new_input(cs.clone(), || packed.value())?;
        input.enforce_equal(&packed)?;
    }
    Ok(())
}

/// Synthesizer for a single slot. Without a snapshot and witness it runs in
/// setup mode.
#[derive(Clone, Debug)]
pub struct SlotSynthesizer {
    params: Params,
    transaction_type: TransactionType,
    snapshot: Option<TransactionSnapshot>,
    witness: Option<SlotWitness>,
}

impl SlotSynthesizer {
    pub fn setup(params: Params, transaction_type: TransactionType) -> Self {
        Self {
            params,
            transaction_type,
            snapshot: None,
            witness: None,
        }
    }

    pub fn prove(params: Params, snapshot: TransactionSnapshot, witness: SlotWitness) -> Self {
        Self {
            params,
            transaction_type: witness.transaction_type(),
            snapshot: Some(snapshot),
            witness: Some(witness),
        }
    }

    /// Builds and constrains the slot, returning it for inspection.
    pub fn synthesize(self, cs: ConstraintSystemRef<Fr>) -> Result<SlotCircuit, CircuitError> {
        let snapshot = self.snapshot;
        let state = TransactionState::new_witness(cs.clone(), || {
            snapshot.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let slot = SlotCircuit::build(
            cs.clone(),
            &self.params,
            self.transaction_type,
            &state,
            self.witness.as_ref(),
        )?;
        slot.generate_constraints()?;
        enforce_public_inputs(&cs, &slot.public_data(&self.params))?;

        debug!(
            transaction_type = ?self.transaction_type,
            constraints = cs.num_constraints(),
            witnesses = cs.num_witness_variables(),
            "slot synthesized"
        );
        Ok(slot)
    }
}

impl ConstraintSynthesizer<Fr> for SlotSynthesizer {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        match self.synthesize(cs) {
            Ok(_) => Ok(()),
            Err(CircuitError::Synthesis(err)) => Err(err),
            Err(_) => Err(SynthesisError::Unsatisfiable),
        }
    }
}

/// Result of a checked slot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotReport {
    pub transaction_type: TransactionType,
    pub outputs: OutputValues,
    /// Decoded fee owed to the operator
    pub fee_paid: u128,
    pub public_data: Vec<u8>,
    pub num_constraints: usize,
}

impl SlotReport {
    /// Public inputs a verifier supplies for this slot.
    pub fn public_inputs(&self) -> Vec<Fr> {
        to_field_elements(&self.public_data)
    }
}

/// Runs every phase for one slot: admission, build, constraints and a
/// satisfiability check. An instance that fails the check is reported, never
/// returned.
pub fn check_slot(
    params: &Params,
    snapshot: &TransactionSnapshot,
    input: &TransactionInput,
) -> Result<SlotReport, CircuitError> {
    params.validate()?;

    let witness = SlotWitness::assign(params, snapshot, input).inspect_err(|err| {
        warn!(transaction_type = ?input.transaction_type(), %err, "witness rejected");
    })?;
    let transaction_type = witness.transaction_type();
    let fee_paid = witness.fee_paid();

    let cs = ConstraintSystem::<Fr>::new_ref();
    let slot = SlotSynthesizer::prove(*params, snapshot.clone(), witness).synthesize(cs.clone())?;

    if !cs.is_satisfied()? {
        let at = cs
            .which_is_unsatisfied()?
            .unwrap_or_else(|| "unknown constraint".to_string());
        warn!(?transaction_type, constraint = %at, "slot unsatisfied");
        return Err(CircuitError::Unsatisfied(at));
    }

    let bits = slot
        .public_data(params)
        .iter()
        .map(|b| b.value())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SlotReport {
        transaction_type,
        outputs: slot.outputs().values()?,
        fee_paid,
        public_data: bits_to_bytes(&bits),
        num_constraints: cs.num_constraints(),
    })
}

/// Constraint system size of one slot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircuitShape {
    pub transaction_type: TransactionType,
    pub num_constraints: usize,
    pub num_witness_variables: usize,
    pub num_instance_variables: usize,
}

/// Synthesizes a slot in setup mode and reports its size.
pub fn circuit_shape(
    params: &Params,
    transaction_type: TransactionType,
) -> Result<CircuitShape, CircuitError> {
    params.validate()?;
    let cs = ConstraintSystem::<Fr>::new_ref();
    cs.set_mode(SynthesisMode::Setup);
    SlotSynthesizer::setup(*params, transaction_type).synthesize(cs.clone())?;

    Ok(CircuitShape {
        transaction_type,
        num_constraints: cs.num_constraints(),
        num_witness_variables: cs.num_witness_variables(),
        num_instance_variables: cs.num_instance_variables(),
    })
}
