/// Opaque account identity as handed out by the host ledger.
///
/// The protocol never inspects these bytes; it only compares and hashes them.
pub type AccountId = Vec<u8>;

/// 32-byte SHA-256 fingerprint used for flight and oracle-request keys.
pub type Hash32 = [u8; 32];

/// Seconds since the Unix epoch.
pub type Timestamp = u64;
