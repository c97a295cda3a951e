mod common;

use ark_bn254::Fr;
use ark_r1cs_std::R1CSVar;
use keyroll_circuit::transaction::TransactionCircuit as _;
use keyroll_circuit::{
    CircuitError, Params, TransactionInput, TransactionType, WitnessError, check_slot,
};
use proptest::prelude::*;

use common::*;

fn check(
    update: keyroll_circuit::PublicKeyUpdate,
) -> Result<keyroll_circuit::SlotReport, CircuitError> {
    check_slot(
        &Params::default(),
        &snapshot(),
        &TransactionInput::PublicKeyUpdate(update),
    )
}

#[test]
fn example_scenario() {
    let report = check(update(1000, 1)).unwrap();
    let (x, y) = key(1);

    assert_eq!(report.transaction_type, TransactionType::PublicKeyUpdate);
    assert_eq!(report.outputs.account_id, ACCOUNT);
    assert_eq!(report.outputs.token_id, TOKEN);
    assert_eq!(report.outputs.public_key_x, x);
    assert_eq!(report.outputs.public_key_y, y);
    assert_eq!(report.outputs.nonce, 8);
    assert_eq!(report.outputs.balance, 999_000);
    assert!(!report.outputs.signature_required_a);
    assert!(!report.outputs.signature_required_b);
    assert_eq!(report.outputs.num_conditional_transactions, 1);
    assert_eq!(report.fee_paid, 1000);
}

#[test]
fn off_curve_key_is_rejected() {
    let mut bad = update(1000, 2);
    bad.public_key_y += Fr::from(1u64);

    let err = check(bad.clone()).unwrap_err();
    assert!(matches!(err, CircuitError::Witness(WitnessError::PublicKeyOffCurve)));

    let s = snapshot();
    assert!(!is_satisfied_with(&s, &forced_witness(&s, bad)));
}

#[test]
fn overdraft_is_rejected() {
    let err = check(update(BALANCE + 1, 3)).unwrap_err();
    assert!(matches!(
        err,
        CircuitError::Witness(WitnessError::InsufficientBalance { .. })
    ));

    // Exactly representable, so the decoded fee is the overdraft itself.
    let fee = 2_000_000;
    let s = snapshot();
    let witness = forced_witness(&s, update(fee, 3));
    assert_eq!(witness.decoded_fee, fee);
    assert!(!is_satisfied_with(&s, &witness));
}

#[test]
fn overdraft_hidden_by_float_rounding_is_unsatisfiable() {
    // One unit above the balance rounds down to exactly the balance.
    let s = snapshot();
    let witness = forced_witness(&s, update(BALANCE + 1, 3));
    assert_eq!(witness.decoded_fee, BALANCE);
    assert_eq!(witness.balance_s_after, 0);
    assert!(!is_satisfied_with(&s, &witness));
}

#[test]
fn entire_balance_can_be_paid() {
    let report = check(update(BALANCE, 4)).unwrap();
    assert_eq!(report.outputs.balance, 0);
    assert_eq!(report.fee_paid, BALANCE);
}

#[test]
fn zero_fee() {
    let report = check(update(0, 5)).unwrap();
    assert_eq!(report.outputs.balance, BALANCE);
    assert_eq!(report.fee_paid, 0);
    assert_eq!(report.outputs.nonce, NONCE + 1);
}

#[test]
fn nonce_at_width_limit_is_unsatisfied() {
    let s = snapshot();
    let honest = forced_witness(&s, update(1000, 6));
    assert!(is_satisfied_with(&s, &honest));

    let mut at_limit = s.clone();
    at_limit.account_a.nonce = u64::from(u32::MAX);
    let witness = forced_witness(&at_limit, update(1000, 6));
    assert!(!is_satisfied_with(&at_limit, &witness));
}

#[test]
fn inaccurate_fee_float_is_unsatisfied() {
    let s = snapshot();
    let mut witness = forced_witness(&s, update(999_999, 7));
    assert_eq!(witness.fee_float, (3 << 11) | 999);
    assert!(is_satisfied_with(&s, &witness));

    // 994_000 is more than 0.5% below the fee
    witness.fee_float = (3 << 11) | 994;
    assert!(!is_satisfied_with(&s, &witness));

    // 1_000_000 rounds up
    witness.fee_float = (3 << 11) | 1000;
    assert!(!is_satisfied_with(&s, &witness));
}

#[test]
fn fee_is_conserved_in_circuit() {
    let mut s = snapshot();
    s.operator_balance_b = 42;
    let witness = forced_witness(&s, update(123_456, 10));
    let (cs, circuit) = build_with(&s, &witness);
    assert!(cs.is_satisfied().unwrap());

    let payer = circuit.outputs().balance_s_balance.value().unwrap();
    let operator = circuit.operator_balance_after().value().unwrap();
    assert_eq!(payer + operator, Fr::from(BALANCE + 42));
    assert_eq!(operator, Fr::from(42u128 + 123_400));
}

#[test]
fn rounded_fee_is_what_moves() {
    // 123_456 needs exponent 2: decoded as 123_400
    let report = check(update(123_456, 8)).unwrap();
    assert_eq!(report.fee_paid, 123_400);
    assert_eq!(report.outputs.balance, BALANCE - 123_400);
}

#[test]
fn operator_balance_overflow_is_rejected() {
    let params = Params::default();
    let mut s = snapshot();
    s.operator_balance_b = (1u128 << params.amount_bits) - 1;
    let err = check_slot(
        &params,
        &s,
        &TransactionInput::PublicKeyUpdate(update(1000, 9)),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CircuitError::Witness(WitnessError::BalanceOverflow { .. })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn completeness_and_conservation(fee in 0u128..=BALANCE, seed in any::<u64>()) {
        let s = snapshot();
        let report = check(update(fee, seed)).unwrap();

        let decoded = report.fee_paid;
        prop_assert!(decoded <= fee);
        prop_assert!(Params::default().accuracy.check(decoded, fee));
        prop_assert_eq!(report.outputs.balance + decoded, s.account_a.balance_s);
        prop_assert_eq!(report.outputs.nonce, s.account_a.nonce + 1);
        prop_assert!(!report.outputs.signature_required_a);
        prop_assert!(!report.outputs.signature_required_b);
        prop_assert_eq!(
            report.outputs.num_conditional_transactions,
            s.num_conditional_transactions + 1
        );
    }
}
