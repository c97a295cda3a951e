//! Per-slot snapshot of the state a transaction reads.

use std::borrow::Borrow;

use ark_bn254::Fr;
use ark_r1cs_std::{
    alloc::{AllocVar, AllocationMode},
    fields::{FieldVar, fp::FpVar},
};
use ark_relations::r1cs::{Namespace, SynthesisError};

use crate::curve::CurveParams;
use crate::ledger::Address;

/// Acting account with its selected balance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub owner: Address,
    pub public_key_x: Fr,
    pub public_key_y: Fr,
    pub nonce: u64,
    pub balance_s: u128,
}

/// Plain values a slot is built against.
///
/// Supplied fresh for every slot; circuits only read it and report their
/// effect through [`TransactionOutputs`](super::TransactionOutputs).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionSnapshot {
    pub account_a: AccountSnapshot,
    pub operator_balance_b: u128,
    pub num_conditional_transactions: u64,
}

#[derive(Clone, Debug)]
pub struct AccountVar {
    pub owner: FpVar<Fr>,
    pub public_key_x: FpVar<Fr>,
    pub public_key_y: FpVar<Fr>,
    pub nonce: FpVar<Fr>,
    pub balance_s: FpVar<Fr>,
}

/// Shared constants, injected once per constraint system
#[derive(Clone, Debug)]
pub struct Constants {
    pub zero: FpVar<Fr>,
    pub one: FpVar<Fr>,
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            zero: FpVar::zero(),
            one: FpVar::one(),
        }
    }
}

/// In-circuit [`TransactionSnapshot`] plus constants and curve parameters.
#[derive(Clone, Debug)]
pub struct TransactionState {
    pub account_a: AccountVar,
    pub operator_balance_b: FpVar<Fr>,
    pub num_conditional_transactions: FpVar<Fr>,
    pub constants: Constants,
    pub curve: CurveParams,
}

impl AllocVar<TransactionSnapshot, Fr> for TransactionState {
    fn new_variable<T: Borrow<TransactionSnapshot>>(
        cs: impl Into<Namespace<Fr>>,
        f: impl FnOnce() -> Result<T, SynthesisError>,
        mode: AllocationMode,
    ) -> Result<Self, SynthesisError> {
        let cs = cs.into().cs();
        let snapshot = f().map(|s| s.borrow().clone());
        let alloc = |get: fn(&TransactionSnapshot) -> Fr| {
            FpVar::new_variable(
                cs.clone(),
                || {
                    snapshot
                        .as_ref()
                        .map(get)
                        .map_err(|_| SynthesisError::AssignmentMissing)
                },
                mode,
            )
        };

        let account_a = AccountVar {
            owner: alloc(|s| s.account_a.owner.to_field())?,
            public_key_x: alloc(|s| s.account_a.public_key_x)?,
            public_key_y: alloc(|s| s.account_a.public_key_y)?,
            nonce: alloc(|s| Fr::from(s.account_a.nonce))?,
            balance_s: alloc(|s| Fr::from(s.account_a.balance_s))?,
        };
        Ok(Self {
            account_a,
            operator_balance_b: alloc(|s| Fr::from(s.operator_balance_b))?,
            num_conditional_transactions: alloc(|s| Fr::from(s.num_conditional_transactions))?,
            constants: Constants::default(),
            curve: CurveParams::baby_jubjub(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_r1cs_std::R1CSVar;
    use ark_relations::r1cs::{ConstraintSystem, SynthesisMode};

    fn snapshot() -> TransactionSnapshot {
        TransactionSnapshot {
            account_a: AccountSnapshot {
                owner: Address([0xab; 20]),
                public_key_x: Fr::from(3u64),
                public_key_y: Fr::from(4u64),
                nonce: 7,
                balance_s: 1_000_000,
            },
            operator_balance_b: 5,
            num_conditional_transactions: 2,
        }
    }

    #[test]
    fn test_allocates_snapshot_values() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let state = TransactionState::new_witness(cs.clone(), || Ok(snapshot())).unwrap();
        assert_eq!(state.account_a.nonce.value().unwrap(), Fr::from(7u64));
        assert_eq!(
            state.account_a.balance_s.value().unwrap(),
            Fr::from(1_000_000u64)
        );
        assert_eq!(
            state.account_a.owner.value().unwrap(),
            Address([0xab; 20]).to_field()
        );
        assert_eq!(
            state.num_conditional_transactions.value().unwrap(),
            Fr::from(2u64)
        );
        assert_eq!(cs.num_witness_variables(), 7);
    }

    #[test]
    fn test_setup_mode_allocates_without_values() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        cs.set_mode(SynthesisMode::Setup);
        let state = TransactionState::new_witness(cs.clone(), || {
            Err::<TransactionSnapshot, _>(SynthesisError::AssignmentMissing)
        })
        .unwrap();
        assert!(state.account_a.nonce.value().is_err());
        assert_eq!(cs.num_witness_variables(), 7);
    }
}
