use std::collections::HashMap;

use log::info;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::SuretyError;
use crate::types::{AccountId, Hash32, Timestamp};

/// Flight status codes as reported by oracles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightStatus {
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl FlightStatus {
    /// Wire code of the status value.
    pub fn code(&self) -> u8 {
        match self {
            FlightStatus::Unknown => 0,
            FlightStatus::OnTime => 10,
            FlightStatus::LateAirline => 20,
            FlightStatus::LateWeather => 30,
            FlightStatus::LateTechnical => 40,
            FlightStatus::LateOther => 50,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FlightStatus::Unknown),
            10 => Some(FlightStatus::OnTime),
            20 => Some(FlightStatus::LateAirline),
            30 => Some(FlightStatus::LateWeather),
            40 => Some(FlightStatus::LateTechnical),
            50 => Some(FlightStatus::LateOther),
            _ => None,
        }
    }

    /// Only delays attributed to the airline settle insurance.
    pub fn is_payout_qualifying(&self) -> bool {
        matches!(self, FlightStatus::LateAirline | FlightStatus::LateTechnical)
    }
}

/// A tracked flight, keyed by its fingerprint in the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub airline: AccountId,
    pub designator: String,
    pub is_registered: bool,
    pub status: FlightStatus,
    pub departure_timestamp: Timestamp,
    pub updated_timestamp: Timestamp,
}

/// Whether applying a status actually changed the flight record.
///
/// `Unchanged` is the single signal that suppresses downstream settlement:
/// insurance credit runs only on an actual transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusApplied {
    Changed,
    Unchanged,
}

/// Collision-resistant fingerprint identifying a flight.
pub fn flight_key(airline: &AccountId, designator: &str, timestamp: Timestamp) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(airline);
    hasher.update(designator.as_bytes());
    hasher.update(timestamp.to_le_bytes());
    let mut key = [0u8; 32];
    key.copy_from_slice(&hasher.finalize());
    key
}

/// Registry of flight identity and current status.
pub struct FlightRegistry {
    flights: HashMap<Hash32, Flight>,
}

impl FlightRegistry {
    pub fn new() -> Self {
        FlightRegistry {
            flights: HashMap::new(),
        }
    }

    /// Record a new flight under `key` with status fixed to on-time.
    pub fn register(
        &mut self,
        key: Hash32,
        airline: &AccountId,
        designator: &str,
        timestamp: Timestamp,
    ) -> Result<(), SuretyError> {
        if self.flights.contains_key(&key) {
            return Err(SuretyError::StateConflict(
                "flight is already registered".into(),
            ));
        }
        self.flights.insert(
            key,
            Flight {
                airline: airline.clone(),
                designator: designator.to_string(),
                is_registered: true,
                status: FlightStatus::OnTime,
                departure_timestamp: timestamp,
                updated_timestamp: timestamp,
            },
        );
        info!(
            "flight {} ({}) registered by {}",
            hex::encode(&key[..8]),
            designator,
            hex::encode(airline)
        );
        Ok(())
    }

    /// Apply a finalized status to a flight.
    ///
    /// Re-applying the current status is a no-op and reports `Unchanged`.
    pub fn apply_status(
        &mut self,
        key: &Hash32,
        new_status: FlightStatus,
        at: Timestamp,
    ) -> Result<StatusApplied, SuretyError> {
        let flight = self
            .flights
            .get_mut(key)
            .ok_or_else(|| SuretyError::NotFound("flight is not registered".into()))?;
        if flight.status == new_status {
            return Ok(StatusApplied::Unchanged);
        }
        flight.status = new_status;
        flight.updated_timestamp = at;
        info!(
            "flight {} status -> {:?}",
            hex::encode(&key[..8]),
            new_status
        );
        Ok(StatusApplied::Changed)
    }

    pub fn is_registered(&self, key: &Hash32) -> bool {
        self.flights.contains_key(key)
    }

    pub fn get(&self, key: &Hash32) -> Option<&Flight> {
        self.flights.get(key)
    }

    pub fn status_of(&self, key: &Hash32) -> Result<FlightStatus, SuretyError> {
        self.flights
            .get(key)
            .map(|f| f.status)
            .ok_or_else(|| SuretyError::NotFound("flight is not registered".into()))
    }
}

impl Default for FlightRegistry {
    fn default() -> Self {
        Self::new()
    }
}
