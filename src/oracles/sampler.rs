use std::collections::VecDeque;

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::types::{AccountId, Hash32};

/// Number of response indices assigned to each oracle.
pub const ORACLE_INDEX_COUNT: usize = 3;
/// Indices are drawn from `0..ORACLE_INDEX_RANGE`.
pub const ORACLE_INDEX_RANGE: u8 = 10;
/// The sampling nonce wraps here so lookups stay inside the window of block
/// hashes the host can still retrieve.
pub const SAMPLER_NONCE_WINDOW: u8 = 250;

/// Provider of recent block hashes, the entropy input for index sampling.
///
/// Hosts feed each newly sealed block hash through [`observe`]; the sampler
/// reads hashes back by depth behind the newest one.
///
/// [`observe`]: BlockHashSource::observe
pub trait BlockHashSource {
    /// Hash of the block `depth` blocks behind the newest observed one.
    /// An unknown depth yields the zero hash.
    fn block_hash(&self, depth: u8) -> Hash32;

    /// Record a newly sealed block hash.
    fn observe(&mut self, hash: Hash32);
}

/// Rolling window of recent block hashes.
pub struct RecentBlockHashes {
    hashes: VecDeque<Hash32>,
}

impl RecentBlockHashes {
    pub fn new() -> Self {
        RecentBlockHashes {
            hashes: VecDeque::new(),
        }
    }

    /// Window pre-seeded with one random hash; useful for simulations that
    /// never feed real block hashes.
    pub fn with_random_seed() -> Self {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        let mut source = Self::new();
        source.observe(seed);
        source
    }
}

impl Default for RecentBlockHashes {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockHashSource for RecentBlockHashes {
    fn block_hash(&self, depth: u8) -> Hash32 {
        self.hashes.get(depth as usize).copied().unwrap_or([0u8; 32])
    }

    fn observe(&mut self, hash: Hash32) {
        self.hashes.push_front(hash);
        self.hashes.truncate(SAMPLER_NONCE_WINDOW as usize + 1);
    }
}

/// Pseudo-random index assignment for oracles and status requests.
///
/// Not cryptographically secure: anyone who can predict block hashes can
/// predict the draw. Indices only spread response load across oracles, so
/// predictability is an accepted property of the protocol, not a bug.
pub struct IndexSampler {
    nonce: u8,
}

impl IndexSampler {
    pub fn new() -> Self {
        IndexSampler { nonce: 0 }
    }

    /// Draw one index in `0..ORACLE_INDEX_RANGE` for `account`.
    ///
    /// The nonce is mixed into the digest directly so consecutive draws
    /// differ even when the source window is stale.
    pub fn sample(&mut self, source: &dyn BlockHashSource, account: &AccountId) -> u8 {
        let mut hasher = Sha256::new();
        hasher.update(source.block_hash(self.nonce));
        hasher.update([self.nonce]);
        hasher.update(account);
        let digest = hasher.finalize();

        self.nonce = self.nonce.wrapping_add(1);
        if self.nonce > SAMPLER_NONCE_WINDOW {
            self.nonce = 0;
        }

        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(word) % ORACLE_INDEX_RANGE as u64) as u8
    }

    /// Draw three pairwise-distinct indices by reject-and-resample.
    pub fn sample_distinct3(
        &mut self,
        source: &dyn BlockHashSource,
        account: &AccountId,
    ) -> [u8; ORACLE_INDEX_COUNT] {
        let first = self.sample(source, account);
        let mut second = self.sample(source, account);
        while second == first {
            second = self.sample(source, account);
        }
        let mut third = self.sample(source, account);
        while third == first || third == second {
            third = self.sample(source, account);
        }
        [first, second, third]
    }
}

impl Default for IndexSampler {
    fn default() -> Self {
        Self::new()
    }
}
