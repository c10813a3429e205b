use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::SuretyError;
use crate::flights::FlightStatus;
use crate::types::{AccountId, Hash32, Timestamp};

pub mod sampler;

pub use sampler::{
    BlockHashSource, IndexSampler, RecentBlockHashes, ORACLE_INDEX_COUNT, ORACLE_INDEX_RANGE,
    SAMPLER_NONCE_WINDOW,
};

/// Fee (in host ledger units) required to register as an oracle.
pub const ORACLE_REGISTRATION_FEE: u64 = 1;
/// Matching responses required before a status value is finalized.
pub const MIN_ORACLE_RESPONSES: usize = 3;

/// A registered external reporter. Immutable after registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Oracle {
    pub account: AccountId,
    pub is_registered: bool,
    /// Pairwise-distinct response indices; only requests carrying one of
    /// these may be answered by this oracle.
    pub indices: [u8; ORACLE_INDEX_COUNT],
}

/// Per-request response bookkeeping.
///
/// `is_open` is never cleared after finalization: late responses keep being
/// absorbed as dead writes. Response lists are also not deduplicated per
/// oracle. Both behaviors are part of the protocol contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRequest {
    pub requester: AccountId,
    pub is_open: bool,
    /// Status value -> responding oracle identities.
    pub responses: HashMap<FlightStatus, Vec<AccountId>>,
}

/// Fingerprint identifying a status request from its constituent fields.
pub fn request_key(
    index: u8,
    airline: &AccountId,
    designator: &str,
    timestamp: Timestamp,
) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update([index]);
    hasher.update(airline);
    hasher.update(designator.as_bytes());
    hasher.update(timestamp.to_le_bytes());
    let mut key = [0u8; 32];
    key.copy_from_slice(&hasher.finalize());
    key
}

/// Oracle identities and open status requests.
///
/// Threshold detection lives at the application layer: `record_response`
/// returns the bucket size so the caller can spot the crossing.
pub struct OracleRegistry {
    oracles: HashMap<AccountId, Oracle>,
    requests: HashMap<Hash32, ResponseRequest>,
}

impl OracleRegistry {
    pub fn new() -> Self {
        OracleRegistry {
            oracles: HashMap::new(),
            requests: HashMap::new(),
        }
    }

    /// Record a new oracle with its assigned indices.
    pub fn register(
        &mut self,
        account: &AccountId,
        indices: [u8; ORACLE_INDEX_COUNT],
    ) -> Result<(), SuretyError> {
        if self.oracles.contains_key(account) {
            return Err(SuretyError::StateConflict(
                "oracle is already registered".into(),
            ));
        }
        self.oracles.insert(
            account.clone(),
            Oracle {
                account: account.clone(),
                is_registered: true,
                indices,
            },
        );
        debug!(
            "oracle {} registered with indices {:?}",
            hex::encode(account),
            indices
        );
        Ok(())
    }

    pub fn is_registered(&self, account: &AccountId) -> bool {
        self.oracles.contains_key(account)
    }

    pub fn indices_of(&self, account: &AccountId) -> Result<[u8; ORACLE_INDEX_COUNT], SuretyError> {
        self.oracles
            .get(account)
            .map(|o| o.indices)
            .ok_or_else(|| SuretyError::NotFound("oracle is not registered".into()))
    }

    /// Open (or re-open, overwriting) the request under `key`.
    ///
    /// Idempotent per key: a second caller drawing the same index for the
    /// same flight and timestamp simply resets the request.
    pub fn open_request(&mut self, key: Hash32, requester: &AccountId) {
        self.requests.insert(
            key,
            ResponseRequest {
                requester: requester.clone(),
                is_open: true,
                responses: HashMap::new(),
            },
        );
        debug!("request {} opened", hex::encode(&key[..8]));
    }

    /// Record `oracle`'s response under `status` and return the bucket size.
    pub fn record_response(
        &mut self,
        key: &Hash32,
        oracle: &AccountId,
        status: FlightStatus,
    ) -> Result<usize, SuretyError> {
        let request = self.requests.get_mut(key).ok_or_else(|| {
            SuretyError::NotFound("no open request matches index, flight and timestamp".into())
        })?;
        if !request.is_open {
            return Err(SuretyError::NotFound(
                "no open request matches index, flight and timestamp".into(),
            ));
        }
        let bucket = request.responses.entry(status).or_default();
        bucket.push(oracle.clone());
        Ok(bucket.len())
    }

    pub fn request(&self, key: &Hash32) -> Option<&ResponseRequest> {
        self.requests.get(key)
    }
}

impl Default for OracleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
