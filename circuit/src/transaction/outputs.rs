//! Declared outputs of a transaction slot.

use ark_bn254::Fr;
use ark_ff::{PrimeField, Zero};
use ark_r1cs_std::{R1CSVar, boolean::Boolean, fields::fp::FpVar};
use ark_relations::r1cs::SynthesisError;

use super::state::TransactionState;
use crate::errors::CircuitError;
use crate::ledger::{AccountId, TokenId};
use crate::params::Params;

/// The only channel through which a transaction affects global state. The
/// encompassing circuit folds these into the account and balance roots.
#[derive(Clone, Debug)]
pub struct TransactionOutputs {
    /// Little-endian bits of the account id
    pub account_a_address: Vec<Boolean<Fr>>,
    pub account_a_public_key_x: FpVar<Fr>,
    pub account_a_public_key_y: FpVar<Fr>,
    pub account_a_nonce: FpVar<Fr>,
    /// Little-endian bits of the token id
    pub balance_s_address: Vec<Boolean<Fr>>,
    pub balance_s_balance: FpVar<Fr>,
    pub signature_required_a: FpVar<Fr>,
    pub signature_required_b: FpVar<Fr>,
    pub num_conditional_transactions: FpVar<Fr>,
}

impl TransactionOutputs {
    /// Outputs that leave the state untouched: address zero, every value
    /// copied from the state and both signatures required.
    pub fn unchanged(params: &Params, state: &TransactionState) -> Self {
        Self {
            account_a_address: vec![Boolean::FALSE; params.account_bits],
            account_a_public_key_x: state.account_a.public_key_x.clone(),
            account_a_public_key_y: state.account_a.public_key_y.clone(),
            account_a_nonce: state.account_a.nonce.clone(),
            balance_s_address: vec![Boolean::FALSE; params.token_bits],
            balance_s_balance: state.account_a.balance_s.clone(),
            signature_required_a: state.constants.one.clone(),
            signature_required_b: state.constants.one.clone(),
            num_conditional_transactions: state.num_conditional_transactions.clone(),
        }
    }

    /// Reads the assigned output values.
    pub fn values(&self) -> Result<OutputValues, CircuitError> {
        let flag = |v: &FpVar<Fr>| -> Result<bool, CircuitError> {
            let v = v.value()?;
            if v.is_zero() {
                Ok(false)
            } else if v == Fr::from(1u64) {
                Ok(true)
            } else {
                Err(CircuitError::Unsatisfied("signature flag is not boolean".into()))
            }
        };

        Ok(OutputValues {
            account_id: AccountId(bits_to_u32(&self.account_a_address, "account address")?),
            public_key_x: self.account_a_public_key_x.value()?,
            public_key_y: self.account_a_public_key_y.value()?,
            nonce: to_u64(self.account_a_nonce.value()?, "nonce")?,
            token_id: TokenId(bits_to_u32(&self.balance_s_address, "balance address")?),
            balance: to_u128(self.balance_s_balance.value()?, "balance")?,
            signature_required_a: flag(&self.signature_required_a)?,
            signature_required_b: flag(&self.signature_required_b)?,
            num_conditional_transactions: to_u64(
                self.num_conditional_transactions.value()?,
                "conditional transaction counter",
            )?,
        })
    }
}

/// Plain values of [`TransactionOutputs`] after witness assignment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputValues {
    pub account_id: AccountId,
    pub public_key_x: Fr,
    pub public_key_y: Fr,
    pub nonce: u64,
    pub token_id: TokenId,
    pub balance: u128,
    pub signature_required_a: bool,
    pub signature_required_b: bool,
    pub num_conditional_transactions: u64,
}

/// Canonical integer value of a field element, if it fits in a `u128`.
fn field_to_u128(value: Fr) -> Option<u128> {
    let limbs = value.into_bigint().0;
    if limbs[2] != 0 || limbs[3] != 0 {
        return None;
    }
    Some(u128::from(limbs[0]) | (u128::from(limbs[1]) << 64))
}

fn to_u128(value: Fr, name: &str) -> Result<u128, CircuitError> {
    field_to_u128(value).ok_or_else(|| CircuitError::Unsatisfied(format!("{name} out of range")))
}

fn to_u64(value: Fr, name: &str) -> Result<u64, CircuitError> {
    to_u128(value, name)?
        .try_into()
        .map_err(|_| CircuitError::Unsatisfied(format!("{name} out of range")))
}

fn bits_to_u32(bits: &[Boolean<Fr>], name: &str) -> Result<u32, CircuitError> {
    if bits.len() > 32 {
        return Err(CircuitError::Unsatisfied(format!("{name} wider than 32 bits")));
    }
    bits.iter().rev().try_fold(0u32, |acc, bit| {
        Ok::<_, SynthesisError>((acc << 1) | u32::from(bit.value()?))
    })
    .map_err(CircuitError::from)
}
