use std::collections::HashMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::SuretyError;
use crate::types::{AccountId, Hash32};

/// Payout multiplier: a credited passenger is owed
/// `insured * PAYOUT_NUMERATOR / PAYOUT_DENOMINATOR`, floor-divided.
pub const PAYOUT_NUMERATOR: u64 = 3;
pub const PAYOUT_DENOMINATOR: u64 = 2;

/// A coverage purchase on a flight. Records are append-only; `claimed`
/// flips once on payout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub account: AccountId,
    pub insured_amount: u64,
    pub claimed: bool,
}

/// Per-passenger coverage and the pending-withdrawal ledger.
pub struct InsuranceEscrow {
    /// Flight fingerprint -> ordered coverage records.
    coverage: HashMap<Hash32, Vec<Passenger>>,
    /// Passenger -> pending payout. Overwritten on credit, zeroed on payout.
    payouts: HashMap<AccountId, u64>,
}

impl InsuranceEscrow {
    pub fn new() -> Self {
        InsuranceEscrow {
            coverage: HashMap::new(),
            payouts: HashMap::new(),
        }
    }

    /// Append a coverage record for `passenger` on the flight.
    pub fn buy(&mut self, flight_key: Hash32, passenger: &AccountId, amount: u64) {
        self.coverage.entry(flight_key).or_default().push(Passenger {
            account: passenger.clone(),
            insured_amount: amount,
            claimed: false,
        });
        debug!(
            "coverage of {} bought by {} on flight {}",
            amount,
            hex::encode(passenger),
            hex::encode(&flight_key[..8])
        );
    }

    /// Credit every passenger on the flight at 3/2 of the insured amount.
    ///
    /// The pending payout is overwritten, not accumulated: a prior unclaimed
    /// balance for the same passenger is discarded. Returns the number of
    /// coverage records credited.
    pub fn credit_all(&mut self, flight_key: &Hash32) -> usize {
        let Some(passengers) = self.coverage.get(flight_key) else {
            return 0;
        };
        for passenger in passengers {
            let owed = passenger.insured_amount * PAYOUT_NUMERATOR / PAYOUT_DENOMINATOR;
            self.payouts.insert(passenger.account.clone(), owed);
        }
        info!(
            "credited {} coverage records on flight {}",
            passengers.len(),
            hex::encode(&flight_key[..8])
        );
        passengers.len()
    }

    pub fn pending_payout(&self, passenger: &AccountId) -> u64 {
        self.payouts.get(passenger).copied().unwrap_or(0)
    }

    /// Zero the passenger's pending balance and hand back the amount.
    ///
    /// The balance is cleared before the caller performs the transfer; a
    /// failed transfer does not restore it. That ordering blocks
    /// double-withdrawal reentrancy at the cost of the requester bearing
    /// transfer-failure risk.
    pub fn take_payout(&mut self, passenger: &AccountId) -> Result<u64, SuretyError> {
        let amount = self.pending_payout(passenger);
        if amount == 0 {
            return Err(SuretyError::InsufficientValue {
                required: 1,
                provided: 0,
            });
        }
        self.payouts.insert(passenger.clone(), 0);
        Ok(amount)
    }

    /// Mark the most recent unclaimed coverage record for `passenger` on the
    /// flight as claimed.
    pub fn mark_claimed(&mut self, flight_key: &Hash32, passenger: &AccountId) {
        if let Some(passengers) = self.coverage.get_mut(flight_key) {
            if let Some(record) = passengers
                .iter_mut()
                .rev()
                .find(|p| &p.account == passenger && !p.claimed)
            {
                record.claimed = true;
            }
        }
    }

    pub fn passengers(&self, flight_key: &Hash32) -> &[Passenger] {
        self.coverage
            .get(flight_key)
            .map(|p| p.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for InsuranceEscrow {
    fn default() -> Self {
        Self::new()
    }
}
