pub mod constants;
pub mod curve;
pub mod errors;
pub mod float;
pub mod ledger;
pub mod params;
pub mod public_data;

pub mod gadgets;
pub mod transaction;

// Re-export key types for external usage
pub use errors::{CircuitError, LedgerError, ParamsError, WitnessError};
pub use ledger::{Account, AccountId, Address, Ledger, TokenId};
pub use params::Params;
pub use transaction::{
    PublicKeyUpdate, SlotReport, TransactionCircuit, TransactionInput, TransactionSnapshot,
    TransactionType, check_slot, circuit_shape,
};
