use serde::{Deserialize, Serialize};

use crate::flights::FlightStatus;
use crate::types::{AccountId, Hash32, Timestamp};

/// Notifications emitted by the application contract.
///
/// Events are appended in emission order to the contract's event log; hosts
/// drain them after each transaction and forward them to subscribers. Every
/// externally observable side effect has a corresponding event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A candidate airline entered the registry (registered, not yet active).
    AirlineRegistered { airline: AccountId },
    /// An airline reached active status through funding.
    AirlineActive { airline: AccountId, funds: u64 },
    /// A new flight was recorded, identified by its fingerprint.
    FlightRegistered { airline: AccountId, key: Hash32 },
    /// An oracle registered and was assigned its response indices.
    OracleRegistered { oracle: AccountId, indices: [u8; 3] },
    /// A status-fetch request was opened; only oracles holding `index` may
    /// respond.
    OracleRequest {
        index: u8,
        airline: AccountId,
        designator: String,
        timestamp: Timestamp,
    },
    /// An oracle response was recorded. Fires for every accepted submission,
    /// including late ones after finalization.
    OracleReport {
        airline: AccountId,
        designator: String,
        timestamp: Timestamp,
        status: FlightStatus,
    },
    /// A status value crossed the response threshold for a request.
    FlightStatusFinalized { key: Hash32, status: FlightStatus },
    /// The flight registry recorded an actual status transition.
    FlightStatusChanged { key: Hash32, status: FlightStatus },
    /// A passenger bought coverage on a flight.
    InsuranceBought {
        passenger: AccountId,
        key: Hash32,
        amount: u64,
    },
    /// All passengers on a flight were credited after a qualifying delay.
    InsuranceCredited { key: Hash32, passengers: usize },
    /// A passenger withdrew a pending payout.
    InsurancePaid { passenger: AccountId, amount: u64 },
}
