//! Transaction circuits.
//!
//! Every transaction type implements [`TransactionCircuit`] and is driven in
//! a fixed order:
//!
//! 1. [`assign_witness`](TransactionCircuit::assign_witness) checks a concrete
//!    input against the snapshot off-circuit and derives every value the
//!    circuit needs. Inadmissible inputs are rejected here, before anything is
//!    allocated.
//! 2. [`build`](TransactionCircuit::build) allocates all variables and
//!    sub-gadgets. Values are bound lazily from the witness; with `None`
//!    (setup mode) the shape is the same.
//! 3. [`generate_constraints`](TransactionCircuit::generate_constraints)
//!    emits the relations. It never reads values.
//! 4. [`outputs`](TransactionCircuit::outputs) and
//!    [`public_data`](TransactionCircuit::public_data) expose the effect of
//!    the transaction to the encompassing circuit.

use ark_bn254::Fr;
use ark_r1cs_std::boolean::Boolean;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::errors::WitnessError;
use crate::params::Params;

mod noop;
mod outputs;
mod public_key_update;
mod slot;
mod state;

pub use noop::NoopCircuit;
pub use outputs::{OutputValues, TransactionOutputs};
pub use public_key_update::{PublicKeyUpdate, PublicKeyUpdateCircuit, PublicKeyUpdateWitness};
pub use slot::{
    CircuitShape, SlotCircuit, SlotReport, SlotSynthesizer, SlotWitness, TransactionInput,
    check_slot, circuit_shape,
};
pub use state::{AccountSnapshot, AccountVar, Constants, TransactionSnapshot, TransactionState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Noop,
    PublicKeyUpdate,
}

pub trait TransactionCircuit: Sized {
    /// Concrete request, e.g. [`PublicKeyUpdate`]
    type Input;
    /// Validated values derived from the input and the snapshot
    type Witness;

    const TYPE: TransactionType;

    fn assign_witness(
        params: &Params,
        snapshot: &TransactionSnapshot,
        input: &Self::Input,
    ) -> Result<Self::Witness, WitnessError>;

    fn build(
        cs: ConstraintSystemRef<Fr>,
        params: &Params,
        state: &TransactionState,
        witness: Option<&Self::Witness>,
    ) -> Result<Self, SynthesisError>;

    fn generate_constraints(&self) -> Result<(), SynthesisError>;

    fn outputs(&self) -> &TransactionOutputs;

    /// MSB-first public data bits of this transaction.
    fn public_data(&self) -> Vec<Boolean<Fr>>;
}
