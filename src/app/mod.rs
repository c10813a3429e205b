use log::{info, warn};

use crate::admission::{AdmissionEngine, AdmissionOutcome};
use crate::errors::SuretyError;
use crate::escrow::InsuranceEscrow;
use crate::events::Event;
use crate::flights::{flight_key, FlightRegistry, FlightStatus, StatusApplied};
use crate::ledger::Ledger;
use crate::membership::{AirlineRegistry, AIRLINE_MIN_FUNDING};
use crate::oracles::{
    request_key, BlockHashSource, IndexSampler, OracleRegistry, MIN_ORACLE_RESPONSES,
    ORACLE_INDEX_COUNT, ORACLE_REGISTRATION_FEE,
};
use crate::types::{AccountId, Hash32, Timestamp};
use crate::utils::current_time;

/// The application contract governing the insurance scheme.
///
/// `SuretyApp` is the sole owner and sole mutator of every registry; all
/// state-changing operations take `&mut self` and run to completion as one
/// atomic unit. In a concurrent host, wrap one instance behind a single lock
/// or a single-writer actor to preserve the serialized execution model.
pub struct SuretyApp {
    deployer: AccountId,
    operational: bool,
    airlines: AirlineRegistry,
    admission: AdmissionEngine,
    flights: FlightRegistry,
    oracles: OracleRegistry,
    sampler: IndexSampler,
    escrow: InsuranceEscrow,
    ledger: Box<dyn Ledger>,
    block_source: Box<dyn BlockHashSource>,
    events: Vec<Event>,
}

impl SuretyApp {
    pub fn new(
        deployer: AccountId,
        ledger: Box<dyn Ledger>,
        block_source: Box<dyn BlockHashSource>,
    ) -> Self {
        SuretyApp {
            admission: AdmissionEngine::new(deployer.clone()),
            deployer,
            operational: true,
            airlines: AirlineRegistry::new(),
            flights: FlightRegistry::new(),
            oracles: OracleRegistry::new(),
            sampler: IndexSampler::new(),
            escrow: InsuranceEscrow::new(),
            ledger,
            block_source,
            events: Vec::new(),
        }
    }

    fn ensure_operational(&self) -> Result<(), SuretyError> {
        if self.operational {
            Ok(())
        } else {
            Err(SuretyError::OperationalHalt)
        }
    }

    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    // ---- governance ----------------------------------------------------

    /// Request admission of `candidate` into the airline set.
    ///
    /// Depending on the size of the active set this either admits directly
    /// (bootstrap or unilateral rule) or records `caller`'s vote.
    pub fn register_airline(
        &mut self,
        caller: &AccountId,
        candidate: &AccountId,
    ) -> Result<AdmissionOutcome, SuretyError> {
        self.ensure_operational()?;
        let outcome = self.admission.decide(&mut self.airlines, caller, candidate)?;
        if matches!(outcome, AdmissionOutcome::Admitted { .. }) {
            self.emit(Event::AirlineRegistered {
                airline: candidate.clone(),
            });
        }
        Ok(outcome)
    }

    /// Contribute funding for a registered airline.
    ///
    /// `amount` must meet [`AIRLINE_MIN_FUNDING`]; the minimum is enforced
    /// here at the boundary, never inside the membership registry.
    pub fn fund_airline(
        &mut self,
        caller: &AccountId,
        candidate: &AccountId,
        amount: u64,
    ) -> Result<(), SuretyError> {
        self.ensure_operational()?;
        if amount < AIRLINE_MIN_FUNDING {
            return Err(SuretyError::InsufficientValue {
                required: AIRLINE_MIN_FUNDING,
                provided: amount,
            });
        }
        if !self.airlines.is_registered(candidate) {
            return Err(SuretyError::NotFound(
                "candidate airline is not registered".into(),
            ));
        }
        self.ledger.debit(caller, amount)?;
        let outcome = self.airlines.fund(candidate, amount);
        if outcome.activated {
            self.emit(Event::AirlineActive {
                airline: candidate.clone(),
                funds: outcome.total_funds,
            });
        }
        Ok(())
    }

    /// Toggle the global operational flag. Deployer only; the one operation
    /// permitted while the contract is halted.
    pub fn set_operational(&mut self, caller: &AccountId, mode: bool) -> Result<(), SuretyError> {
        if caller != &self.deployer {
            return Err(SuretyError::Authorization(
                "only the deployer may change operational status".into(),
            ));
        }
        if mode == self.operational {
            return Err(SuretyError::StateConflict(
                "contract is already in the requested operational state".into(),
            ));
        }
        self.operational = mode;
        info!("operational status set to {}", mode);
        Ok(())
    }

    // ---- flights -------------------------------------------------------

    /// Register a flight for tracking. The caller must be an active airline.
    pub fn register_flight(
        &mut self,
        caller: &AccountId,
        designator: &str,
        timestamp: Timestamp,
        airline: &AccountId,
    ) -> Result<Hash32, SuretyError> {
        self.ensure_operational()?;
        if !(self.airlines.is_registered(caller) && self.airlines.is_active(caller)) {
            return Err(SuretyError::Authorization(
                "caller is not a registered, active airline".into(),
            ));
        }
        let key = flight_key(airline, designator, timestamp);
        self.flights.register(key, airline, designator, timestamp)?;
        self.emit(Event::FlightRegistered {
            airline: airline.clone(),
            key,
        });
        Ok(key)
    }

    // ---- oracle protocol -----------------------------------------------

    /// Open a status-fetch request for a flight and return the index drawn
    /// for the caller. Only oracles holding that index may respond.
    pub fn fetch_flight_status(
        &mut self,
        caller: &AccountId,
        airline: &AccountId,
        designator: &str,
        timestamp: Timestamp,
    ) -> Result<u8, SuretyError> {
        self.ensure_operational()?;
        let index = self.sampler.sample(self.block_source.as_ref(), caller);
        let key = request_key(index, airline, designator, timestamp);
        self.oracles.open_request(key, caller);
        self.emit(Event::OracleRequest {
            index,
            airline: airline.clone(),
            designator: designator.to_string(),
            timestamp,
        });
        Ok(index)
    }

    /// Register the caller as an oracle against the fixed fee.
    pub fn register_oracle(&mut self, caller: &AccountId, fee: u64) -> Result<(), SuretyError> {
        self.ensure_operational()?;
        if fee < ORACLE_REGISTRATION_FEE {
            return Err(SuretyError::InsufficientValue {
                required: ORACLE_REGISTRATION_FEE,
                provided: fee,
            });
        }
        if self.oracles.is_registered(caller) {
            return Err(SuretyError::StateConflict(
                "oracle is already registered".into(),
            ));
        }
        self.ledger.debit(caller, fee)?;
        let indices = self
            .sampler
            .sample_distinct3(self.block_source.as_ref(), caller);
        self.oracles.register(caller, indices)?;
        self.emit(Event::OracleRegistered {
            oracle: caller.clone(),
            indices,
        });
        Ok(())
    }

    /// The caller's three assigned response indices.
    pub fn my_indices(&self, caller: &AccountId) -> Result<[u8; ORACLE_INDEX_COUNT], SuretyError> {
        self.oracles.indices_of(caller)
    }

    /// Submit an oracle response for an open request.
    ///
    /// Always emits a report event. When the status bucket reaches
    /// [`MIN_ORACLE_RESPONSES`] the status is finalized: it is pushed into
    /// the flight registry and, on an actual transition to a qualifying
    /// delay code, insurance is credited. The request stays open afterwards,
    /// so later responses are absorbed with no further effect.
    pub fn submit_oracle_response(
        &mut self,
        caller: &AccountId,
        index: u8,
        airline: &AccountId,
        designator: &str,
        timestamp: Timestamp,
        status: FlightStatus,
    ) -> Result<(), SuretyError> {
        self.ensure_operational()?;
        let indices = self.oracles.indices_of(caller)?;
        if !indices.contains(&index) {
            return Err(SuretyError::Authorization(
                "index is not assigned to this oracle".into(),
            ));
        }
        let key = request_key(index, airline, designator, timestamp);
        let responses = self.oracles.record_response(&key, caller, status)?;
        self.emit(Event::OracleReport {
            airline: airline.clone(),
            designator: designator.to_string(),
            timestamp,
            status,
        });

        if responses >= MIN_ORACLE_RESPONSES {
            self.finalize_status(airline, designator, timestamp, status);
        }
        Ok(())
    }

    /// Push a finalized status into the flight registry and settle insurance
    /// on an actual transition to a qualifying delay code.
    fn finalize_status(
        &mut self,
        airline: &AccountId,
        designator: &str,
        timestamp: Timestamp,
        status: FlightStatus,
    ) {
        let key = flight_key(airline, designator, timestamp);
        self.emit(Event::FlightStatusFinalized { key, status });
        info!(
            "status {:?} finalized for flight {}",
            status,
            hex::encode(&key[..8])
        );

        let applied = match self.flights.apply_status(&key, status, current_time()) {
            Ok(applied) => applied,
            Err(_) => {
                // Requests can be opened for flights that were never
                // registered; their consensus outcome has nowhere to land.
                warn!(
                    "finalized status for unregistered flight {}",
                    hex::encode(&key[..8])
                );
                return;
            }
        };
        if applied == StatusApplied::Unchanged {
            return;
        }
        self.emit(Event::FlightStatusChanged { key, status });
        if status.is_payout_qualifying() {
            let passengers = self.escrow.credit_all(&key);
            self.emit(Event::InsuranceCredited { key, passengers });
        }
    }

    // ---- insurance -----------------------------------------------------

    /// Buy coverage on a registered flight.
    pub fn buy_insurance(
        &mut self,
        caller: &AccountId,
        designator: &str,
        timestamp: Timestamp,
        airline: &AccountId,
        amount: u64,
    ) -> Result<(), SuretyError> {
        self.ensure_operational()?;
        let key = flight_key(airline, designator, timestamp);
        if !self.flights.is_registered(&key) {
            return Err(SuretyError::NotFound("flight is not registered".into()));
        }
        self.ledger.debit(caller, amount)?;
        self.escrow.buy(key, caller, amount);
        self.emit(Event::InsuranceBought {
            passenger: caller.clone(),
            key,
            amount,
        });
        Ok(())
    }

    /// Withdraw the caller's pending payout for a flight.
    ///
    /// The balance is zeroed before the transfer; if the ledger rejects the
    /// payment the balance stays zeroed. Zero-then-transfer blocks
    /// double-withdrawal, at the documented cost of transfer-failure risk.
    pub fn withdraw(
        &mut self,
        caller: &AccountId,
        designator: &str,
        timestamp: Timestamp,
        airline: &AccountId,
    ) -> Result<u64, SuretyError> {
        self.ensure_operational()?;
        let key = flight_key(airline, designator, timestamp);
        let amount = self.escrow.take_payout(caller)?;
        self.ledger.pay(caller, amount)?;
        self.escrow.mark_claimed(&key, caller);
        self.emit(Event::InsurancePaid {
            passenger: caller.clone(),
            amount,
        });
        Ok(amount)
    }

    // ---- host integration and reads ------------------------------------

    /// Feed a newly sealed block hash into the sampling entropy window.
    pub fn observe_block(&mut self, hash: Hash32) {
        self.block_source.observe(hash);
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    pub fn is_airline_active(&self, airline: &AccountId) -> bool {
        self.airlines.is_active(airline)
    }

    pub fn active_airline_count(&self) -> usize {
        self.airlines.active_count()
    }

    pub fn flight_status(
        &self,
        airline: &AccountId,
        designator: &str,
        timestamp: Timestamp,
    ) -> Result<FlightStatus, SuretyError> {
        self.flights
            .status_of(&flight_key(airline, designator, timestamp))
    }

    pub fn pending_payout(&self, passenger: &AccountId) -> u64 {
        self.escrow.pending_payout(passenger)
    }

    /// Events emitted so far, in emission order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Drain the event log, handing ownership to the host.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Host access to the backing ledger (deposits, balance queries).
    pub fn ledger_mut(&mut self) -> &mut dyn Ledger {
        self.ledger.as_mut()
    }

    pub fn ledger(&self) -> &dyn Ledger {
        self.ledger.as_ref()
    }
}
