use aerosure::ledger::Ledger;
use aerosure::{AccountId, Event, FlightStatus, SuretyApp, SuretyError};

mod common;
use common::{account, bootstrap_airline, new_app, seed};

const DEPARTURE: u64 = 1_700_000_000;

/// Register `count` oracles with funded fee balances.
fn register_oracles(app: &mut SuretyApp, count: usize) -> Vec<AccountId> {
    (0..count)
        .map(|i| {
            let oracle = account(&format!("oracle-{}", i));
            seed(app, &oracle, 10);
            app.register_oracle(&oracle, 1).unwrap();
            oracle
        })
        .collect()
}

/// Fetch status requests until the drawn index is held by at least `want`
/// oracles, returning that index and the holders.
fn gather_responders(
    app: &mut SuretyApp,
    oracles: &[AccountId],
    airline: &AccountId,
    designator: &str,
    want: usize,
) -> (u8, Vec<AccountId>) {
    let requester = account("requester");
    for _ in 0..100 {
        let index = app
            .fetch_flight_status(&requester, airline, designator, DEPARTURE)
            .unwrap();
        let holders: Vec<AccountId> = oracles
            .iter()
            .filter(|o| app.my_indices(o).unwrap().contains(&index))
            .cloned()
            .collect();
        if holders.len() >= want {
            return (index, holders.into_iter().take(want).collect());
        }
    }
    panic!("no drawn index was held by {} oracles", want);
}

fn settled_app() -> (SuretyApp, AccountId, AccountId, Vec<AccountId>) {
    let deployer = account("deployer");
    let mut app = new_app(&deployer);
    let airline = account("airline-a");
    bootstrap_airline(&mut app, &deployer, &airline);
    app.register_flight(&airline, "AS-117", DEPARTURE, &airline)
        .unwrap();
    let oracles = register_oracles(&mut app, 30);
    (app, deployer, airline, oracles)
}

#[test]
fn oracle_registration_enforces_fee_and_uniqueness() {
    let deployer = account("deployer");
    let mut app = new_app(&deployer);
    let oracle = account("oracle-1");
    seed(&mut app, &oracle, 10);

    let err = app.register_oracle(&oracle, 0).unwrap_err();
    assert_eq!(
        err,
        SuretyError::InsufficientValue {
            required: 1,
            provided: 0
        }
    );

    app.register_oracle(&oracle, 1).unwrap();
    let indices = app.my_indices(&oracle).unwrap();
    assert!(indices.iter().all(|i| *i < 10));

    let err = app.register_oracle(&oracle, 1).unwrap_err();
    assert!(matches!(err, SuretyError::StateConflict(_)));
}

#[test]
fn responses_outside_assigned_indices_are_rejected() {
    let (mut app, _, airline, oracles) = settled_app();
    let (index, _) = gather_responders(&mut app, &oracles, &airline, "AS-117", 3);

    // An oracle that does not hold the drawn index may not answer
    let outsider = oracles
        .iter()
        .find(|o| !app.my_indices(o).unwrap().contains(&index))
        .cloned()
        .expect("some oracle without the index");
    let err = app
        .submit_oracle_response(
            &outsider,
            index,
            &airline,
            "AS-117",
            DEPARTURE,
            FlightStatus::OnTime,
        )
        .unwrap_err();
    assert!(matches!(err, SuretyError::Authorization(_)));

    // An unregistered identity is not an oracle at all
    let stranger = account("stranger");
    let err = app
        .submit_oracle_response(
            &stranger,
            index,
            &airline,
            "AS-117",
            DEPARTURE,
            FlightStatus::OnTime,
        )
        .unwrap_err();
    assert!(matches!(err, SuretyError::NotFound(_)));
}

#[test]
fn threshold_finalizes_status_and_credits_coverage() {
    let (mut app, _, airline, oracles) = settled_app();

    let passenger = account("passenger-1");
    seed(&mut app, &passenger, 100);
    app.buy_insurance(&passenger, "AS-117", DEPARTURE, &airline, 10)
        .unwrap();

    let (index, responders) = gather_responders(&mut app, &oracles, &airline, "AS-117", 3);
    for (i, responder) in responders.iter().enumerate() {
        app.submit_oracle_response(
            responder,
            index,
            &airline,
            "AS-117",
            DEPARTURE,
            FlightStatus::LateAirline,
        )
        .unwrap();
        // Nothing settles until the third matching response
        if i < 2 {
            assert_eq!(
                app.flight_status(&airline, "AS-117", DEPARTURE).unwrap(),
                FlightStatus::OnTime
            );
            assert_eq!(app.pending_payout(&passenger), 0);
        }
    }

    assert_eq!(
        app.flight_status(&airline, "AS-117", DEPARTURE).unwrap(),
        FlightStatus::LateAirline
    );
    // floor(10 * 3 / 2) = 15
    assert_eq!(app.pending_payout(&passenger), 15);
    assert!(app
        .events()
        .iter()
        .any(|e| matches!(e, Event::InsuranceCredited { passengers: 1, .. })));

    let paid = app.withdraw(&passenger, "AS-117", DEPARTURE, &airline).unwrap();
    assert_eq!(paid, 15);
    assert_eq!(app.pending_payout(&passenger), 0);
    // Started with 100, paid 10 premium, got 15 back
    assert_eq!(app.ledger().balance_of(&passenger), 105);

    let err = app
        .withdraw(&passenger, "AS-117", DEPARTURE, &airline)
        .unwrap_err();
    assert!(matches!(err, SuretyError::InsufficientValue { .. }));
}

#[test]
fn non_qualifying_status_changes_without_credit() {
    let (mut app, _, airline, oracles) = settled_app();
    let passenger = account("passenger-1");
    seed(&mut app, &passenger, 100);
    app.buy_insurance(&passenger, "AS-117", DEPARTURE, &airline, 10)
        .unwrap();

    let (index, responders) = gather_responders(&mut app, &oracles, &airline, "AS-117", 3);
    for responder in &responders {
        app.submit_oracle_response(
            responder,
            index,
            &airline,
            "AS-117",
            DEPARTURE,
            FlightStatus::LateWeather,
        )
        .unwrap();
    }

    assert_eq!(
        app.flight_status(&airline, "AS-117", DEPARTURE).unwrap(),
        FlightStatus::LateWeather
    );
    assert_eq!(app.pending_payout(&passenger), 0);
    assert!(!app
        .events()
        .iter()
        .any(|e| matches!(e, Event::InsuranceCredited { .. })));
}

#[test]
fn late_responses_are_absorbed_with_no_further_effect() {
    let (mut app, _, airline, oracles) = settled_app();
    let passenger = account("passenger-1");
    seed(&mut app, &passenger, 100);
    app.buy_insurance(&passenger, "AS-117", DEPARTURE, &airline, 10)
        .unwrap();

    let (index, responders) = gather_responders(&mut app, &oracles, &airline, "AS-117", 4);
    for responder in responders.iter().take(3) {
        app.submit_oracle_response(
            responder,
            index,
            &airline,
            "AS-117",
            DEPARTURE,
            FlightStatus::LateAirline,
        )
        .unwrap();
    }
    assert_eq!(app.pending_payout(&passenger), 15);

    // The request never closes; a fourth matching response is a dead write
    app.submit_oracle_response(
        &responders[3],
        index,
        &airline,
        "AS-117",
        DEPARTURE,
        FlightStatus::LateAirline,
    )
    .unwrap();

    assert_eq!(app.pending_payout(&passenger), 15);
    let changes = app
        .events()
        .iter()
        .filter(|e| matches!(e, Event::FlightStatusChanged { .. }))
        .count();
    assert_eq!(changes, 1);
    let credits = app
        .events()
        .iter()
        .filter(|e| matches!(e, Event::InsuranceCredited { .. }))
        .count();
    assert_eq!(credits, 1);
    // Each accepted submission still reports
    let reports = app
        .events()
        .iter()
        .filter(|e| matches!(e, Event::OracleReport { .. }))
        .count();
    assert_eq!(reports, 4);
}

#[test]
fn buying_insurance_requires_a_registered_flight() {
    let deployer = account("deployer");
    let mut app = new_app(&deployer);
    let passenger = account("passenger-1");
    seed(&mut app, &passenger, 100);

    let err = app
        .buy_insurance(&passenger, "AS-404", DEPARTURE, &account("airline-x"), 10)
        .unwrap_err();
    assert!(matches!(err, SuretyError::NotFound(_)));
}

#[test]
fn responses_without_an_open_request_are_rejected() {
    let (mut app, _, airline, oracles) = settled_app();

    // No fetch has been issued: whatever index the first oracle holds, the
    // matching request key does not exist.
    let oracle = &oracles[0];
    let index = app.my_indices(oracle).unwrap()[0];
    let err = app
        .submit_oracle_response(
            oracle,
            index,
            &airline,
            "AS-117",
            DEPARTURE,
            FlightStatus::OnTime,
        )
        .unwrap_err();
    assert!(matches!(err, SuretyError::NotFound(_)));
}
