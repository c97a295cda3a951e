#![allow(dead_code)]

use ark_bn254::Fr;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ed_on_bn254::{EdwardsAffine, Fr as Scalar};
use ark_r1cs_std::alloc::AllocVar;
use ark_relations::r1cs::{ConstraintSystem, ConstraintSystemRef};
use ark_std::UniformRand;
use ark_std::rand::{SeedableRng, rngs::StdRng};

use keyroll_circuit::transaction::{
    PublicKeyUpdateCircuit, PublicKeyUpdateWitness, TransactionState,
};
use keyroll_circuit::{
    Account, AccountId, Address, Ledger, Params, PublicKeyUpdate, TokenId, TransactionCircuit,
    TransactionSnapshot,
};

pub const ACCOUNT: AccountId = AccountId(12);
pub const OPERATOR: AccountId = AccountId(0);
pub const TOKEN: TokenId = TokenId(0);
pub const BALANCE: u128 = 1_000_000;
pub const NONCE: u64 = 7;

pub fn owner() -> Address {
    Address::from_hex("0xabc0000000000000000000000000000000000001").unwrap()
}

pub fn key(seed: u64) -> (Fr, Fr) {
    let mut rng = StdRng::seed_from_u64(seed);
    let point = (EdwardsAffine::generator() * Scalar::rand(&mut rng)).into_affine();
    (point.x, point.y)
}

/// Account 12 holding 1_000_000 of token 0 at nonce 7.
pub fn ledger() -> Ledger {
    let mut ledger = Ledger::new(OPERATOR, Account::new(Address::default()));
    let mut account = Account::new(owner()).with_balance(TOKEN, BALANCE);
    account.nonce = NONCE;
    ledger.insert(ACCOUNT, account);
    ledger
}

pub fn snapshot() -> TransactionSnapshot {
    ledger().snapshot(ACCOUNT, TOKEN).unwrap()
}

pub fn update(fee: u128, seed: u64) -> PublicKeyUpdate {
    let (x, y) = key(seed);
    PublicKeyUpdate {
        account_id: ACCOUNT,
        fee_token_id: TOKEN,
        fee,
        public_key_x: x,
        public_key_y: y,
    }
}

/// Builds and constrains the circuit directly from a witness, skipping
/// admission.
pub fn build_with(
    snapshot: &TransactionSnapshot,
    witness: &PublicKeyUpdateWitness,
) -> (ConstraintSystemRef<Fr>, PublicKeyUpdateCircuit) {
    let params = Params::default();
    let cs = ConstraintSystem::<Fr>::new_ref();
    let state = TransactionState::new_witness(cs.clone(), || Ok(snapshot.clone())).unwrap();
    let circuit =
        PublicKeyUpdateCircuit::build(cs.clone(), &params, &state, Some(witness)).unwrap();
    circuit.generate_constraints().unwrap();
    (cs, circuit)
}

pub fn is_satisfied_with(snapshot: &TransactionSnapshot, witness: &PublicKeyUpdateWitness) -> bool {
    build_with(snapshot, witness).0.is_satisfied().unwrap()
}

/// A witness for `update` with derived values filled in as an honest prover
/// would, without any admission checks.
pub fn forced_witness(
    snapshot: &TransactionSnapshot,
    update: PublicKeyUpdate,
) -> PublicKeyUpdateWitness {
    let params = Params::default();
    let fee_float = params.float.encode(update.fee).unwrap();
    let decoded_fee = params.float.decode(fee_float).unwrap();
    PublicKeyUpdateWitness {
        fee_float,
        decoded_fee,
        sign_bit: keyroll_circuit::curve::sign_bit(update.public_key_x),
        balance_s_after: snapshot.account_a.balance_s.wrapping_sub(decoded_fee),
        balance_b_after: snapshot.operator_balance_b + decoded_fee,
        nonce_after: snapshot.account_a.nonce + 1,
        num_conditional_transactions_after: snapshot.num_conditional_transactions + 1,
        update,
    }
}
