use std::collections::HashMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::types::AccountId;

/// Minimum contribution (in host ledger units) a funding call must carry.
/// Enforced at the application boundary, not inside the registry.
pub const AIRLINE_MIN_FUNDING: u64 = 10;

/// A governing member of the insurance scheme.
///
/// Created registered-and-inactive on admission, activated through funding,
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airline {
    pub account: AccountId,
    pub is_registered: bool,
    pub is_active: bool,
    /// Monotonically accumulated contribution amount.
    pub funds: u64,
}

/// Outcome of a funding call.
pub struct FundOutcome {
    /// True when this call flipped the airline from inactive to active.
    pub activated: bool,
    pub total_funds: u64,
}

/// Registry of airline identity, status and funding.
///
/// Leaf component: it performs no precondition checks of its own. The
/// admission engine gates who gets registered and the application boundary
/// gates funding amounts; the registry trusts its callers.
pub struct AirlineRegistry {
    airlines: HashMap<AccountId, Airline>,
    active_count: usize,
}

impl AirlineRegistry {
    pub fn new() -> Self {
        AirlineRegistry {
            airlines: HashMap::new(),
            active_count: 0,
        }
    }

    /// Record `candidate` as registered and inactive.
    ///
    /// Idempotency is not enforced here; callers check `is_registered` first.
    pub fn register(&mut self, candidate: &AccountId) {
        self.airlines.insert(
            candidate.clone(),
            Airline {
                account: candidate.clone(),
                is_registered: true,
                is_active: false,
                funds: 0,
            },
        );
        debug!("airline {} registered", hex::encode(candidate));
    }

    /// Accumulate `amount` and mark the airline active.
    ///
    /// The minimum-funding check lives at the application boundary, so any
    /// amount that reaches this call activates the airline. Activation counts
    /// toward the quorum size exactly once.
    pub fn fund(&mut self, candidate: &AccountId, amount: u64) -> FundOutcome {
        let airline = self
            .airlines
            .entry(candidate.clone())
            .or_insert_with(|| Airline {
                account: candidate.clone(),
                is_registered: false,
                is_active: false,
                funds: 0,
            });
        airline.funds += amount;
        let activated = !airline.is_active;
        airline.is_active = true;
        if activated {
            self.active_count += 1;
            info!(
                "airline {} active with {} funds ({} active total)",
                hex::encode(candidate),
                airline.funds,
                self.active_count
            );
        }
        FundOutcome {
            activated,
            total_funds: airline.funds,
        }
    }

    pub fn is_registered(&self, candidate: &AccountId) -> bool {
        self.airlines
            .get(candidate)
            .map(|a| a.is_registered)
            .unwrap_or(false)
    }

    pub fn is_active(&self, candidate: &AccountId) -> bool {
        self.airlines
            .get(candidate)
            .map(|a| a.is_active)
            .unwrap_or(false)
    }

    /// Number of airlines that have reached active status.
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn get(&self, candidate: &AccountId) -> Option<&Airline> {
        self.airlines.get(candidate)
    }
}

impl Default for AirlineRegistry {
    fn default() -> Self {
        Self::new()
    }
}
