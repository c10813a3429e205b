pub mod admission;
pub mod app;
pub mod errors;
pub mod escrow;
pub mod events;
pub mod flights;
pub mod ledger;
pub mod membership;
pub mod oracles;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use admission::{AdmissionEngine, AdmissionOutcome};
pub use app::SuretyApp;
pub use errors::SuretyError;
pub use events::Event;
pub use flights::{flight_key, FlightRegistry, FlightStatus, StatusApplied};
pub use ledger::{Ledger, MemoryLedger};
pub use membership::AirlineRegistry;
pub use oracles::{BlockHashSource, IndexSampler, OracleRegistry, RecentBlockHashes};
pub use types::{AccountId, Hash32, Timestamp};
