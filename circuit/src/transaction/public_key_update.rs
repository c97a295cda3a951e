//! Account public key rotation, paid with a fee to the operator.
//!
//! The new key must be on the curve. It is published compressed as a sign bit
//! and the Y coordinate. The fee is published as a float, and the decoded
//! float is what moves from the account to the operator. The transaction is
//! authorized outside the circuit, so it requires no signature and counts as
//! a conditional transaction.

use ark_bn254::Fr;
use ark_r1cs_std::{alloc::AllocVar, boolean::Boolean, fields::fp::FpVar};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use super::outputs::TransactionOutputs;
use super::state::{TransactionSnapshot, TransactionState};
use super::{TransactionCircuit, TransactionType};
use crate::constants::{FIELD_BITS, SIGN_PADDING_BITS};
use crate::curve::{CurveParams, sign_bit};
use crate::errors::WitnessError;
use crate::gadgets::{
    AccuracyBound, BitDecomposition, FieldLessThan, FloatDecode, PointOnCurve, RangeLeq,
    RangedAdd, StrictBits, Transfer,
};
use crate::ledger::{AccountId, Address, TokenId};
use crate::params::Params;
use crate::public_data::{PublicDataWriter, flatten_reverse};

/// Request to rotate the key of `account_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKeyUpdate {
    pub account_id: AccountId,
    pub fee_token_id: TokenId,
    /// Full precision fee
    pub fee: u128,
    pub public_key_x: Fr,
    pub public_key_y: Fr,
}

impl PublicKeyUpdate {
    /// Public data an observer derives from the plaintext request and the
    /// account's owner and current nonce.
    pub fn expected_public_data(
        &self,
        owner: &Address,
        nonce: u64,
        params: &Params,
    ) -> Result<Vec<u8>, WitnessError> {
        let fee_float = params
            .float
            .encode(self.fee)
            .ok_or(WitnessError::FeeNotEncodable { fee: self.fee })?;

        let mut writer = PublicDataWriter::new();
        writer
            .push_field(owner.to_field(), params.address_bits)
            .push_uint(u128::from(self.account_id.0), params.account_bits)
            .push_uint(u128::from(nonce), params.nonce_bits)
            .push_bool(sign_bit(self.public_key_x))
            .push_zeros(SIGN_PADDING_BITS)
            .push_field(self.public_key_y, FIELD_BITS)
            .push_zeros(params.token_padding_bits())
            .push_uint(u128::from(self.fee_token_id.0), params.token_bits)
            .push_uint(u128::from(fee_float), params.float.num_bits());
        Ok(writer.into_bytes())
    }
}

/// An admissible [`PublicKeyUpdate`] with every derived value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKeyUpdateWitness {
    pub update: PublicKeyUpdate,
    pub fee_float: u32,
    pub decoded_fee: u128,
    pub sign_bit: bool,
    pub balance_s_after: u128,
    pub balance_b_after: u128,
    pub nonce_after: u64,
    pub num_conditional_transactions_after: u64,
}

fn fits(value: u128, bits: usize) -> bool {
    bits >= 128 || value >> bits == 0
}

fn require_fits(field: &'static str, value: u128, bits: usize) -> Result<(), WitnessError> {
    if fits(value, bits) {
        Ok(())
    } else {
        Err(WitnessError::ValueTooWide { field, value, bits })
    }
}

#[derive(Clone, Debug)]
pub struct PublicKeyUpdateCircuit {
    owner: BitDecomposition,
    account_id: BitDecomposition,
    nonce: BitDecomposition,
    public_key_x: FpVar<Fr>,
    public_key_y: FpVar<Fr>,
    fee_token_id: BitDecomposition,
    fee: BitDecomposition,

    point: PointOnCurve,
    is_negative_x: FieldLessThan,
    public_key_y_bits: StrictBits,

    fee_float: FloatDecode,
    fee_accuracy: AccuracyBound,
    fee_covered: RangeLeq,
    fee_payment: Transfer,

    nonce_after: RangedAdd,

    token_padding: usize,
    outputs: TransactionOutputs,
}

impl TransactionCircuit for PublicKeyUpdateCircuit {
    type Input = PublicKeyUpdate;
    type Witness = PublicKeyUpdateWitness;

    const TYPE: TransactionType = TransactionType::PublicKeyUpdate;

    fn assign_witness(
        params: &Params,
        snapshot: &TransactionSnapshot,
        update: &PublicKeyUpdate,
    ) -> Result<PublicKeyUpdateWitness, WitnessError> {
        let account = &snapshot.account_a;

        require_fits(
            "account_id",
            u128::from(update.account_id.0),
            params.account_bits,
        )?;
        require_fits(
            "fee_token_id",
            u128::from(update.fee_token_id.0),
            params.token_bits,
        )?;
        require_fits("fee", update.fee, params.amount_bits)?;
        require_fits("balance", account.balance_s, params.amount_bits)?;
        require_fits(
            "operator_balance",
            snapshot.operator_balance_b,
            params.amount_bits,
        )?;
        require_fits("nonce", u128::from(account.nonce), params.nonce_bits)?;
        if !account.owner.fits(params.address_bits) {
            return Err(WitnessError::OwnerTooWide {
                bits: params.address_bits,
            });
        }

        if !CurveParams::baby_jubjub().is_on_curve(update.public_key_x, update.public_key_y) {
            return Err(WitnessError::PublicKeyOffCurve);
        }

        let fee_float = params
            .float
            .encode(update.fee)
            .ok_or(WitnessError::FeeNotEncodable { fee: update.fee })?;
        let decoded_fee = params
            .float
            .decode(fee_float)
            .ok_or(WitnessError::FeeNotEncodable { fee: update.fee })?;
        if !params.accuracy.check(decoded_fee, update.fee) {
            return Err(WitnessError::FeeAccuracy {
                fee: update.fee,
                decoded: decoded_fee,
            });
        }

        if update.fee > account.balance_s {
            return Err(WitnessError::InsufficientBalance {
                fee: update.fee,
                balance: account.balance_s,
            });
        }
        let balance_s_after = account.balance_s - decoded_fee;
        let balance_b_after = snapshot
            .operator_balance_b
            .checked_add(decoded_fee)
            .filter(|b| fits(*b, params.amount_bits))
            .ok_or(WitnessError::BalanceOverflow {
                balance: snapshot.operator_balance_b,
                fee: decoded_fee,
                bits: params.amount_bits,
            })?;

        let nonce_after = account
            .nonce
            .checked_add(1)
            .filter(|n| fits(u128::from(*n), params.nonce_bits))
            .ok_or(WitnessError::NonceOverflow {
                nonce: account.nonce,
                bits: params.nonce_bits,
            })?;
        let num_conditional_transactions_after = snapshot
            .num_conditional_transactions
            .checked_add(1)
            .ok_or(WitnessError::CounterOverflow)?;

        Ok(PublicKeyUpdateWitness {
            update: update.clone(),
            fee_float,
            decoded_fee,
            sign_bit: sign_bit(update.public_key_x),
            balance_s_after,
            balance_b_after,
            nonce_after,
            num_conditional_transactions_after,
        })
    }

    fn build(
        cs: ConstraintSystemRef<Fr>,
        params: &Params,
        state: &TransactionState,
        witness: Option<&PublicKeyUpdateWitness>,
    ) -> Result<Self, SynthesisError> {
        let assigned = |f: fn(&PublicKeyUpdateWitness) -> Fr| {
            move || witness.map(f).ok_or(SynthesisError::AssignmentMissing)
        };
        let account = &state.account_a;

        let owner = BitDecomposition::from_packed(
            cs.clone(),
            account.owner.clone(),
            params.address_bits,
        )?;
        let account_id = BitDecomposition::new_witness(
            cs.clone(),
            params.account_bits,
            assigned(|w| Fr::from(w.update.account_id.0)),
        )?;
        let nonce = BitDecomposition::from_packed(
            cs.clone(),
            account.nonce.clone(),
            params.nonce_bits,
        )?;
        let public_key_x = FpVar::new_witness(cs.clone(), assigned(|w| w.update.public_key_x))?;
        let public_key_y = FpVar::new_witness(cs.clone(), assigned(|w| w.update.public_key_y))?;
        let fee_token_id = BitDecomposition::new_witness(
            cs.clone(),
            params.token_bits,
            assigned(|w| Fr::from(w.update.fee_token_id.0)),
        )?;
        let fee = BitDecomposition::new_witness(
            cs.clone(),
            params.amount_bits,
            assigned(|w| Fr::from(w.update.fee)),
        )?;

        // Key validity and compression
        let point = PointOnCurve::new(cs.clone(), &state.curve, &public_key_x, &public_key_y)?;
        let negative_x = &state.constants.zero - &public_key_x;
        let is_negative_x = FieldLessThan::new(cs.clone(), &negative_x, &public_key_x)?;
        let public_key_y_bits = StrictBits::new(cs.clone(), &public_key_y)?;

        // Fee
        let fee_float = FloatDecode::new(
            cs.clone(),
            &params.float,
            assigned(|w| Fr::from(w.fee_float)),
        )?;
        let fee_accuracy = AccuracyBound::new(
            cs.clone(),
            fee_float.value(),
            &fee.packed,
            &params.accuracy,
            params.amount_bits,
        )?;
        // The full precision fee, not only its rounded float, must be covered
        let fee_covered = RangeLeq::new(
            cs.clone(),
            &fee.packed,
            &account.balance_s,
            params.amount_bits,
        )?;
        let fee_payment = Transfer::new(
            cs.clone(),
            &account.balance_s,
            &state.operator_balance_b,
            fee_float.value(),
            params.amount_bits,
        )?;

        // Nonce and counter
        let nonce_after = RangedAdd::new(
            cs,
            &account.nonce,
            &state.constants.one,
            params.nonce_bits,
        )?;
        let num_conditional_transactions_after =
            &state.num_conditional_transactions + &state.constants.one;

        let outputs = TransactionOutputs {
            account_a_address: account_id.bits.clone(),
            account_a_public_key_x: public_key_x.clone(),
            account_a_public_key_y: public_key_y.clone(),
            account_a_nonce: nonce_after.result().clone(),
            balance_s_address: fee_token_id.bits.clone(),
            balance_s_balance: fee_payment.from_after().clone(),
            signature_required_a: state.constants.zero.clone(),
            signature_required_b: state.constants.zero.clone(),
            num_conditional_transactions: num_conditional_transactions_after,
        };

        Ok(Self {
            owner,
            account_id,
            nonce,
            public_key_x,
            public_key_y,
            fee_token_id,
            fee,
            point,
            is_negative_x,
            public_key_y_bits,
            fee_float,
            fee_accuracy,
            fee_covered,
            fee_payment,
            nonce_after,
            token_padding: params.token_padding_bits(),
            outputs,
        })
    }

    fn generate_constraints(&self) -> Result<(), SynthesisError> {
        self.owner.generate_constraints()?;
        self.account_id.generate_constraints()?;
        self.nonce.generate_constraints()?;
        self.fee_token_id.generate_constraints()?;
        self.fee.generate_constraints()?;

        self.point.generate_constraints()?;
        self.is_negative_x.generate_constraints()?;
        self.public_key_y_bits.generate_constraints()?;

        self.fee_float.generate_constraints()?;
        self.fee_accuracy.generate_constraints()?;
        self.fee_covered.generate_constraints()?;
        self.fee_payment.generate_constraints()?;

        self.nonce_after.generate_constraints()
    }

    fn outputs(&self) -> &TransactionOutputs {
        &self.outputs
    }

    fn public_data(&self) -> Vec<Boolean<Fr>> {
        let sign = [self.is_negative_x.lt().clone()];
        let sign_padding = vec![Boolean::FALSE; SIGN_PADDING_BITS];
        let token_padding = vec![Boolean::FALSE; self.token_padding];
        flatten_reverse(&[
            &self.owner.bits,
            &self.account_id.bits,
            &self.nonce.bits,
            &sign,
            &sign_padding,
            &self.public_key_y_bits.bits,
            &token_padding,
            &self.fee_token_id.bits,
            self.fee_float.bits(),
        ])
    }
}

impl PublicKeyUpdateCircuit {
    /// Operator balance after the fee. Not a declared output: the operator is
    /// credited by a separate settlement pass.
    pub fn operator_balance_after(&self) -> &FpVar<Fr> {
        self.fee_payment.to_after()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::state::AccountSnapshot;
    use ark_ec::AffineRepr;
    use ark_ed_on_bn254::EdwardsAffine;
    use ark_r1cs_std::R1CSVar;
    use ark_relations::r1cs::ConstraintSystem;

    fn snapshot() -> TransactionSnapshot {
        TransactionSnapshot {
            account_a: AccountSnapshot {
                owner: Address([0xab; 20]),
                public_key_x: Fr::from(0u64),
                public_key_y: Fr::from(1u64),
                nonce: 7,
                balance_s: 1_000_000,
            },
            operator_balance_b: 0,
            num_conditional_transactions: 0,
        }
    }

    fn update(fee: u128) -> PublicKeyUpdate {
        let g = EdwardsAffine::generator();
        PublicKeyUpdate {
            account_id: AccountId(12),
            fee_token_id: TokenId(0),
            fee,
            public_key_x: g.x,
            public_key_y: g.y,
        }
    }

    fn build(
        witness: &PublicKeyUpdateWitness,
    ) -> (ConstraintSystemRef<Fr>, PublicKeyUpdateCircuit) {
        let params = Params::default();
        let cs = ConstraintSystem::<Fr>::new_ref();
        let state = TransactionState::new_witness(cs.clone(), || Ok(snapshot())).unwrap();
        let circuit =
            PublicKeyUpdateCircuit::build(cs.clone(), &params, &state, Some(witness)).unwrap();
        circuit.generate_constraints().unwrap();
        (cs, circuit)
    }

    #[test]
    fn test_assign_witness() {
        let w =
            PublicKeyUpdateCircuit::assign_witness(&Params::default(), &snapshot(), &update(1000))
                .unwrap();
        assert_eq!(w.decoded_fee, 1000);
        assert_eq!(w.balance_s_after, 999_000);
        assert_eq!(w.balance_b_after, 1000);
        assert_eq!(w.nonce_after, 8);
        assert_eq!(w.num_conditional_transactions_after, 1);
    }

    #[test]
    fn test_rejections() {
        let params = Params::default();
        let reject = |u: PublicKeyUpdate| {
            PublicKeyUpdateCircuit::assign_witness(&params, &snapshot(), &u).unwrap_err()
        };

        let mut off_curve = update(1000);
        off_curve.public_key_y += Fr::from(1u64);
        assert_eq!(reject(off_curve), WitnessError::PublicKeyOffCurve);

        assert_eq!(
            reject(update(1_000_001)),
            WitnessError::InsufficientBalance {
                fee: 1_000_001,
                balance: 1_000_000
            }
        );

        let mut wide_token = update(1000);
        wide_token.fee_token_id = TokenId(1 << 12);
        assert!(matches!(
            reject(wide_token),
            WitnessError::ValueTooWide { field: "fee_token_id", .. }
        ));

        assert!(matches!(
            reject(update(1 << 96)),
            WitnessError::ValueTooWide { field: "fee", .. }
        ));
    }

    #[test]
    fn test_nonce_overflow() {
        let mut s = snapshot();
        s.account_a.nonce = u64::from(u32::MAX);
        assert_eq!(
            PublicKeyUpdateCircuit::assign_witness(&Params::default(), &s, &update(10)),
            Err(WitnessError::NonceOverflow {
                nonce: u64::from(u32::MAX),
                bits: 32
            })
        );
    }

    #[test]
    fn test_satisfied_and_outputs() {
        let w =
            PublicKeyUpdateCircuit::assign_witness(&Params::default(), &snapshot(), &update(1000))
                .unwrap();
        let (cs, circuit) = build(&w);
        assert!(cs.is_satisfied().unwrap());

        let values = circuit.outputs().values().unwrap();
        assert_eq!(values.account_id, AccountId(12));
        assert_eq!(values.nonce, 8);
        assert_eq!(values.balance, 999_000);
        assert!(!values.signature_required_a);
        assert!(!values.signature_required_b);
        assert_eq!(values.num_conditional_transactions, 1);
        assert_eq!(
            circuit.operator_balance_after().value().unwrap(),
            Fr::from(1000u64)
        );
    }

    #[test]
    fn test_public_data_matches_plaintext() {
        let params = Params::default();
        let w =
            PublicKeyUpdateCircuit::assign_witness(&params, &snapshot(), &update(123_456)).unwrap();
        let (_, circuit) = build(&w);
        let bits: Vec<bool> = circuit
            .public_data()
            .iter()
            .map(|b| b.value().unwrap())
            .collect();
        assert_eq!(bits.len(), params.public_data_bits());

        let expected = w
            .update
            .expected_public_data(&Address([0xab; 20]), 7, &params)
            .unwrap();
        assert_eq!(crate::public_data::bits_to_bytes(&bits), expected);
    }

    #[test]
    fn test_fee_above_balance_is_unsatisfiable() {
        let params = Params::default();
        let fee = 1_000_000;
        let mut w =
            PublicKeyUpdateCircuit::assign_witness(&params, &snapshot(), &update(fee)).unwrap();
        // Rounds to the same float, so only the full precision fee differs
        w.update.fee = fee + 1;
        assert_eq!(params.float.encode(w.update.fee), Some(w.fee_float));

        let (cs, _) = build(&w);
        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_negated_key_flips_sign_bit() {
        let params = Params::default();
        let sign_position = params.address_bits + params.account_bits + params.nonce_bits;
        let sign_of = |u: PublicKeyUpdate| {
            let w = PublicKeyUpdateCircuit::assign_witness(&params, &snapshot(), &u).unwrap();
            let (cs, circuit) = build(&w);
            assert!(cs.is_satisfied().unwrap());
            assert_eq!(circuit.is_negative_x.lt().value().unwrap(), w.sign_bit);
            circuit.public_data()[sign_position].value().unwrap()
        };

        let mut negated = update(1000);
        negated.public_key_x = -negated.public_key_x;
        assert_ne!(sign_of(update(1000)), sign_of(negated));
    }
}
