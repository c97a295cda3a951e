//! Off-circuit account model.
//!
//! Accounts live in an arena keyed by [`AccountId`]. Slots are built from a
//! [`TransactionSnapshot`] taken by value, and their reports are written back
//! here. Nothing holds references across slots.

use std::collections::BTreeMap;
use std::fmt;

use ark_bn254::Fr;
use ark_ff::{PrimeField, Zero};

use crate::errors::LedgerError;
use crate::transaction::{AccountSnapshot, SlotReport, TransactionSnapshot, TransactionType};

/// Owner address of an account
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(s.trim_start_matches("0x"), &mut bytes)?;
        Ok(Self(bytes))
    }

    /// The address as a big-endian integer.
    pub fn to_field(&self) -> Fr {
        Fr::from_be_bytes_mod_order(&self.0)
    }

    /// Whether the address is below `2^num_bits`.
    pub fn fits(&self, num_bits: usize) -> bool {
        let total = self.0.len() * 8;
        if num_bits >= total {
            return true;
        }
        (num_bits..total).all(|i| (self.0[self.0.len() - 1 - i / 8] >> (i % 8)) & 1 == 0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(pub u32);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenId(pub u32);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub owner: Address,
    pub public_key_x: Fr,
    pub public_key_y: Fr,
    pub nonce: u64,
    pub balances: BTreeMap<TokenId, u128>,
}

impl Account {
    /// A fresh account with the identity point `(0, 1)` as its key.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            public_key_x: Fr::zero(),
            public_key_y: Fr::from(1u64),
            nonce: 0,
            balances: BTreeMap::new(),
        }
    }

    pub fn with_balance(mut self, token_id: TokenId, balance: u128) -> Self {
        self.balances.insert(token_id, balance);
        self
    }

    pub fn balance(&self, token_id: TokenId) -> u128 {
        self.balances.get(&token_id).copied().unwrap_or(0)
    }
}

#[derive(Clone, Debug)]
pub struct Ledger {
    accounts: BTreeMap<AccountId, Account>,
    operator: AccountId,
    num_conditional_transactions: u64,
    /// Fees collected by applied slots and not yet credited to the operator
    pending_fees: BTreeMap<TokenId, u128>,
}

impl Ledger {
    pub fn new(operator: AccountId, operator_account: Account) -> Self {
        let mut accounts = BTreeMap::new();
        accounts.insert(operator, operator_account);
        Self {
            accounts,
            operator,
            num_conditional_transactions: 0,
            pending_fees: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, id: AccountId, account: Account) -> Option<Account> {
        self.accounts.insert(id, account)
    }

    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    pub fn operator(&self) -> AccountId {
        self.operator
    }

    pub fn num_conditional_transactions(&self) -> u64 {
        self.num_conditional_transactions
    }

    pub fn pending_fees(&self, token_id: TokenId) -> u128 {
        self.pending_fees.get(&token_id).copied().unwrap_or(0)
    }

    /// State read by a slot acting on `account_id` with `token_id` selected.
    pub fn snapshot(
        &self,
        account_id: AccountId,
        token_id: TokenId,
    ) -> Result<TransactionSnapshot, LedgerError> {
        let account = self
            .account(account_id)
            .ok_or(LedgerError::UnknownAccount(account_id))?;
        let operator = self
            .account(self.operator)
            .ok_or(LedgerError::UnknownAccount(self.operator))?;

        Ok(TransactionSnapshot {
            account_a: AccountSnapshot {
                owner: account.owner,
                public_key_x: account.public_key_x,
                public_key_y: account.public_key_y,
                nonce: account.nonce,
                balance_s: account.balance(token_id),
            },
            operator_balance_b: operator.balance(token_id),
            num_conditional_transactions: self.num_conditional_transactions,
        })
    }

    /// Writes the declared outputs of a checked slot back. The fee is queued
    /// for [`settle_operator_fee`](Self::settle_operator_fee).
    pub fn apply(&mut self, report: &SlotReport) -> Result<(), LedgerError> {
        if report.transaction_type == TransactionType::Noop {
            return Err(LedgerError::NotApplicable(report.transaction_type));
        }
        let outputs = &report.outputs;
        let pending = self
            .pending_fees(outputs.token_id)
            .checked_add(report.fee_paid)
            .ok_or(LedgerError::FeeSettlementOverflow)?;
        let account = self
            .accounts
            .get_mut(&outputs.account_id)
            .ok_or(LedgerError::UnknownAccount(outputs.account_id))?;

        account.public_key_x = outputs.public_key_x;
        account.public_key_y = outputs.public_key_y;
        account.nonce = outputs.nonce;
        account.balances.insert(outputs.token_id, outputs.balance);
        self.num_conditional_transactions = outputs.num_conditional_transactions;
        self.pending_fees.insert(outputs.token_id, pending);
        Ok(())
    }

    /// Credits every queued fee to the operator.
    pub fn settle_operator_fee(&mut self) -> Result<(), LedgerError> {
        let operator = self
            .accounts
            .get_mut(&self.operator)
            .ok_or(LedgerError::UnknownAccount(self.operator))?;

        let mut settled = operator.balances.clone();
        for (token_id, fee) in &self.pending_fees {
            let balance = settled.entry(*token_id).or_default();
            *balance = balance
                .checked_add(*fee)
                .ok_or(LedgerError::FeeSettlementOverflow)?;
        }
        operator.balances = settled;
        self.pending_fees.clear();
        Ok(())
    }
}
