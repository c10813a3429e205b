#![allow(dead_code)]

use aerosure::ledger::Ledger;
use aerosure::{AccountId, BlockHashSource, MemoryLedger, RecentBlockHashes, SuretyApp};

pub fn account(tag: &str) -> AccountId {
    tag.as_bytes().to_vec()
}

/// Fresh app with an empty in-memory ledger and a deterministic block-hash
/// window.
pub fn new_app(deployer: &AccountId) -> SuretyApp {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut blocks = RecentBlockHashes::new();
    blocks.observe([42u8; 32]);
    SuretyApp::new(
        deployer.clone(),
        Box::new(MemoryLedger::new()),
        Box::new(blocks),
    )
}

/// Deposit spendable balance for `holder`.
pub fn seed(app: &mut SuretyApp, holder: &AccountId, amount: u64) {
    app.ledger_mut().credit(holder, amount);
}

/// Bootstrap-admit and fund one airline so flights can be registered.
pub fn bootstrap_airline(app: &mut SuretyApp, deployer: &AccountId, airline: &AccountId) {
    seed(app, airline, 1_000);
    app.register_airline(deployer, airline).unwrap();
    app.fund_airline(airline, airline, 10).unwrap();
}
