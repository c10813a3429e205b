use std::collections::HashMap;

use log::debug;

use crate::errors::SuretyError;
use crate::types::AccountId;

/// Value-transfer primitive backing the protocol.
///
/// Accounts and balances are host concerns; the protocol only needs atomic
/// debit into the contract pool and payment back out of it. Hosts plug in
/// their own implementation; [`MemoryLedger`] backs tests and simulations.
pub trait Ledger {
    /// Move `amount` from `from` into the contract pool.
    fn debit(&mut self, from: &AccountId, amount: u64) -> Result<(), SuretyError>;

    /// Credit `amount` to `to` from outside the pool (host deposit).
    fn credit(&mut self, to: &AccountId, amount: u64);

    /// Pay `amount` out of the contract pool to `to`.
    fn pay(&mut self, to: &AccountId, amount: u64) -> Result<(), SuretyError>;

    /// Current spendable balance of `account`.
    fn balance_of(&self, account: &AccountId) -> u64;

    /// Total value held by the contract pool.
    fn pool(&self) -> u64;
}

/// In-memory ledger with a single contract pool.
pub struct MemoryLedger {
    balances: HashMap<AccountId, u64>,
    pool: u64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        MemoryLedger {
            balances: HashMap::new(),
            pool: 0,
        }
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger for MemoryLedger {
    fn debit(&mut self, from: &AccountId, amount: u64) -> Result<(), SuretyError> {
        let balance = self.balances.entry(from.clone()).or_insert(0);
        if *balance < amount {
            return Err(SuretyError::InsufficientValue {
                required: amount,
                provided: *balance,
            });
        }
        *balance -= amount;
        self.pool += amount;
        debug!(
            "ledger: debited {} from {}, pool now {}",
            amount,
            hex::encode(from),
            self.pool
        );
        Ok(())
    }

    fn credit(&mut self, to: &AccountId, amount: u64) {
        *self.balances.entry(to.clone()).or_insert(0) += amount;
    }

    fn pay(&mut self, to: &AccountId, amount: u64) -> Result<(), SuretyError> {
        if self.pool < amount {
            return Err(SuretyError::InsufficientValue {
                required: amount,
                provided: self.pool,
            });
        }
        self.pool -= amount;
        *self.balances.entry(to.clone()).or_insert(0) += amount;
        debug!(
            "ledger: paid {} to {}, pool now {}",
            amount,
            hex::encode(to),
            self.pool
        );
        Ok(())
    }

    fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn pool(&self) -> u64 {
        self.pool
    }
}
