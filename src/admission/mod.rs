use std::collections::{HashMap, HashSet};

use log::{debug, info};

use crate::errors::SuretyError;
use crate::membership::AirlineRegistry;
use crate::types::AccountId;

/// Below this many active airlines any single active airline may admit a
/// candidate unilaterally; at or above it, admission requires a vote.
pub const VOTE_FREE_AIRLINE_LIMIT: usize = 4;

/// Result of an admission call that passed its preconditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// The candidate entered the registry (registered, not yet active).
    Admitted { votes: usize },
    /// The caller's vote was recorded; quorum not yet reached.
    Pending { votes: usize, needed: usize },
}

/// Decides whether a candidate airline may be admitted.
///
/// Three rules apply in order: a one-shot bootstrap admission reserved for
/// the deploying identity, unilateral admission while the active set is
/// small, and majority voting once the active set reaches
/// [`VOTE_FREE_AIRLINE_LIMIT`]. The quorum is `active_count / 2` with integer
/// division, deliberately looser than a true majority for odd counts.
pub struct AdmissionEngine {
    deployer: AccountId,
    bootstrap_used: bool,
    /// Candidate -> distinct voter identities. Cleared on admission.
    votes: HashMap<AccountId, HashSet<AccountId>>,
}

impl AdmissionEngine {
    pub fn new(deployer: AccountId) -> Self {
        AdmissionEngine {
            deployer,
            bootstrap_used: false,
            votes: HashMap::new(),
        }
    }

    /// Evaluate an admission call from `caller` for `candidate`, updating the
    /// registry on success.
    ///
    /// All precondition checks happen before any mutation; an error means
    /// neither the vote set nor the registry changed.
    pub fn decide(
        &mut self,
        registry: &mut AirlineRegistry,
        caller: &AccountId,
        candidate: &AccountId,
    ) -> Result<AdmissionOutcome, SuretyError> {
        if registry.is_registered(candidate) && registry.is_active(candidate) {
            return Err(SuretyError::StateConflict(
                "candidate airline is already registered and active".into(),
            ));
        }

        // Bootstrap: the very first admission, deployer only, fires once.
        if !self.bootstrap_used && caller == &self.deployer {
            self.bootstrap_used = true;
            registry.register(candidate);
            info!(
                "bootstrap admission of airline {}",
                hex::encode(candidate)
            );
            return Ok(AdmissionOutcome::Admitted { votes: 0 });
        }

        if !(registry.is_registered(caller) && registry.is_active(caller)) {
            return Err(SuretyError::Authorization(
                "caller is not a registered, active airline".into(),
            ));
        }

        if registry.active_count() < VOTE_FREE_AIRLINE_LIMIT {
            registry.register(candidate);
            info!(
                "airline {} admitted unilaterally by {}",
                hex::encode(candidate),
                hex::encode(caller)
            );
            return Ok(AdmissionOutcome::Admitted { votes: 0 });
        }

        let voters = self.votes.entry(candidate.clone()).or_default();
        if !voters.insert(caller.clone()) {
            return Err(SuretyError::StateConflict(
                "caller has already voted for this candidate".into(),
            ));
        }
        let votes = voters.len();
        let needed = registry.active_count() / 2;
        debug!(
            "vote {}/{} for airline {} from {}",
            votes,
            needed,
            hex::encode(candidate),
            hex::encode(caller)
        );

        if votes >= needed {
            self.votes.remove(candidate);
            registry.register(candidate);
            info!(
                "airline {} admitted with {} votes",
                hex::encode(candidate),
                votes
            );
            Ok(AdmissionOutcome::Admitted { votes })
        } else {
            Ok(AdmissionOutcome::Pending { votes, needed })
        }
    }

    /// Whether the one-shot bootstrap admission has fired.
    pub fn bootstrap_used(&self) -> bool {
        self.bootstrap_used
    }

    /// Current distinct-voter count for a candidate.
    pub fn vote_count(&self, candidate: &AccountId) -> usize {
        self.votes.get(candidate).map(|v| v.len()).unwrap_or(0)
    }
}
