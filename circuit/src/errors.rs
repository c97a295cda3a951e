//! Error types for parameter validation, witness admission and synthesis.
//!
//! Two classes are kept apart: [`ParamsError`] is a structural defect in the
//! deployment parameters and can never be fixed at proving time, while
//! [`WitnessError`] rejects one concrete transaction before any witness is
//! handed to a prover.

use ark_relations::r1cs::SynthesisError;
use thiserror::Error;

use crate::ledger::AccountId;
use crate::transaction::TransactionType;

/// Invalid deployment parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    #[error("public data format version must be non-zero")]
    InvalidFormatVersion,

    #[error("{field} must be between 1 and {max} bits, got {bits}")]
    InvalidWidth {
        field: &'static str,
        bits: usize,
        max: usize,
    },

    #[error("exponent base must be at least 2, got {0}")]
    InvalidBase(u32),

    #[error("invalid accuracy policy {numerator}/{denominator}")]
    InvalidAccuracy { numerator: u32, denominator: u32 },

    #[error("float encoding cannot represent every {amount_bits}-bit amount")]
    FloatRangeTooSmall { amount_bits: usize },

    #[error("float encoding values overflow the supported integer range")]
    FloatTooWide,

    #[error(
        "float mantissa of {mantissa_bits} bits cannot meet accuracy {numerator}/{denominator}"
    )]
    AccuracyUnreachable {
        mantissa_bits: usize,
        numerator: u32,
        denominator: u32,
    },
}

/// A concrete transaction that no satisfying assignment exists for
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WitnessError {
    #[error("public key is not a point on the curve")]
    PublicKeyOffCurve,

    #[error("{field} = {value} does not fit in {bits} bits")]
    ValueTooWide {
        field: &'static str,
        value: u128,
        bits: usize,
    },

    #[error("owner address does not fit in {bits} bits")]
    OwnerTooWide { bits: usize },

    #[error("fee {fee} exceeds the largest encodable float")]
    FeeNotEncodable { fee: u128 },

    #[error("encoded fee {decoded} is not within accuracy of {fee}")]
    FeeAccuracy { fee: u128, decoded: u128 },

    #[error("fee {fee} exceeds available balance {balance}")]
    InsufficientBalance { fee: u128, balance: u128 },

    #[error("operator balance {balance} plus fee {fee} overflows {bits} bits")]
    BalanceOverflow {
        balance: u128,
        fee: u128,
        bits: usize,
    },

    #[error("nonce {nonce} cannot be incremented within {bits} bits")]
    NonceOverflow { nonce: u64, bits: usize },

    #[error("conditional transaction counter overflow")]
    CounterOverflow,
}

/// Off-circuit ledger failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("unknown account {0}")]
    UnknownAccount(AccountId),

    #[error("report for a {0:?} slot cannot be applied to an account")]
    NotApplicable(TransactionType),

    #[error("operator balance overflow while settling fee")]
    FeeSettlementOverflow,
}

/// Errors raised while building or checking a slot
#[derive(Error, Debug)]
pub enum CircuitError {
    #[error("invalid parameters: {0}")]
    Params(#[from] ParamsError),

    #[error("witness rejected: {0}")]
    Witness(#[from] WitnessError),

    #[error("constraint synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("slot declared as {expected:?} was given a {found:?} witness")]
    TypeMismatch {
        expected: TransactionType,
        found: TransactionType,
    },

    #[error("constraint system is not satisfied at {0}")]
    Unsatisfied(String),
}
