//! Circuit inspection CLI
//!
//! Reports the size of one transaction slot for the configured parameters
//! and optionally runs a public key update through every phase.
//!
//! Usage:
//!   cargo run --package keyroll-circuit --bin circuit-info -- --config ./keyroll.toml --demo

use std::path::PathBuf;

use anyhow::{Context, Result};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ed_on_bn254::{EdwardsAffine, Fr as Scalar};
use clap::Parser;
use tracing::info;

use keyroll_circuit::{
    Account, AccountId, Address, Ledger, Params, PublicKeyUpdate, TokenId, TransactionInput,
    TransactionType, check_slot, circuit_shape,
};
use keyroll_config::KeyrollConfig;

#[derive(Parser, Debug)]
#[command(name = "circuit-info")]
#[command(about = "Inspect keyroll transaction circuits", long_about = None)]
struct Args {
    /// Config file (defaults to the usual lookup order)
    #[arg(long, env = "KR_CONFIG")]
    config: Option<PathBuf>,

    /// Run an example public key update
    #[arg(long)]
    demo: bool,

    /// Print a sample config file and exit
    #[arg(long)]
    sample_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keyroll_circuit=info,circuit_info=info".into()),
        )
        .init();

    let args = Args::parse();

    if args.sample_config {
        print!("{}", KeyrollConfig::generate_sample());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => KeyrollConfig::load_from(path)?,
        None => KeyrollConfig::load()?,
    };
    let params = Params::try_from(&config).context("invalid circuit parameters")?;
    info!(?params, "parameters loaded");

    println!("Keyroll circuit");
    println!("===============");
    println!("  Format version:       {}", params.format_version);
    println!(
        "  Public data per slot: {} bytes",
        params.public_data_bytes()
    );
    println!();

    for transaction_type in [TransactionType::Noop, TransactionType::PublicKeyUpdate] {
        let shape = circuit_shape(&params, transaction_type)?;
        println!("{:?}", transaction_type);
        println!("  Constraints:        {}", shape.num_constraints);
        println!("  Witness variables:  {}", shape.num_witness_variables);
        println!("  Public inputs:      {}", shape.num_instance_variables - 1);
    }

    if args.demo {
        run_demo(&params)?;
    }

    Ok(())
}

fn run_demo(params: &Params) -> Result<()> {
    let account_id = AccountId(12);
    let token_id = TokenId(0);
    let owner = Address::from_hex("0xabc0000000000000000000000000000000000001")?;

    let mut ledger = Ledger::new(AccountId(0), Account::new(Address::default()));
    let mut account = Account::new(owner).with_balance(token_id, 1_000_000);
    account.nonce = 7;
    ledger.insert(account_id, account);

    let key = (EdwardsAffine::generator() * Scalar::from(5u64)).into_affine();
    let update = PublicKeyUpdate {
        account_id,
        fee_token_id: token_id,
        fee: 1000,
        public_key_x: key.x,
        public_key_y: key.y,
    };

    let snapshot = ledger.snapshot(account_id, token_id)?;
    let report = check_slot(
        params,
        &snapshot,
        &TransactionInput::PublicKeyUpdate(update),
    )?;
    ledger.apply(&report)?;
    ledger.settle_operator_fee()?;

    println!();
    println!("Demo: public key update for account {}", account_id);
    println!("  Nonce:               {}", report.outputs.nonce);
    println!("  Balance:             {}", report.outputs.balance);
    println!("  Fee paid:            {}", report.fee_paid);
    println!(
        "  Signature required:  {} / {}",
        report.outputs.signature_required_a, report.outputs.signature_required_b
    );
    println!(
        "  Conditional count:   {}",
        report.outputs.num_conditional_transactions
    );
    println!(
        "  Operator balance:    {}",
        ledger
            .account(ledger.operator())
            .map(|a| a.balance(token_id))
            .unwrap_or_default()
    );
    println!(
        "  Public data:         0x{}",
        hex::encode(&report.public_data)
    );
    Ok(())
}
