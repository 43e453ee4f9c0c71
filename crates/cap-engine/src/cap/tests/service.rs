use std::sync::Arc;

use super::common::*;
use crate::cap::allocation::{OverrideIntent, PoolKind};
use crate::cap::domain::CapDesignation;
use crate::cap::rules::{CapRules, RuleSetError};
use crate::cap::service::{CapComplianceService, CapServiceError};
use crate::cap::session::{SessionError, SessionId, SessionRepository};
use crate::cap::signing::{RosterSlotStatus, SigningCandidate};

fn switch_to_pool_b() -> OverrideIntent {
    OverrideIntent {
        player_id: id("std-1"),
        pool: PoolKind::PoolB,
        amount: 400_000,
    }
}

#[test]
fn open_session_stores_planned_state() {
    let (service, sessions) = build_service();

    let session = service
        .open_session(sample_roster(), pools(2_800_000, 1_725_000))
        .expect("session opens");

    assert!(session.id.0.starts_with("cap-"));
    assert!(session.state.compliant());
    let stored = sessions
        .fetch(&session.id)
        .expect("store reachable")
        .expect("session stored");
    assert_eq!(stored.state, session.state);
    assert_eq!(stored.roster.len(), 6);
}

#[test]
fn session_ids_are_unique() {
    let (service, _) = build_service();
    let first = service
        .open_session(sample_roster(), pools(0, 0))
        .expect("first session");
    let second = service
        .open_session(sample_roster(), pools(0, 0))
        .expect("second session");
    assert_ne!(first.id, second.id);
}

#[test]
fn applied_override_replaces_session_state() {
    let (service, _) = build_service();
    let session = service
        .open_session(sample_roster(), pools(2_800_000, 1_725_000))
        .expect("session opens");

    let outcome = service
        .override_allocation(&session.id, &switch_to_pool_b())
        .expect("override runs");
    assert!(outcome.is_applied());

    let current = service.session(&session.id).expect("session exists");
    assert_eq!(*current.state, outcome.state);
    let allocation = current.state.allocation(&id("std-1")).expect("rostered");
    assert_eq!((allocation.pool_a, allocation.pool_b), (0, 400_000));
    assert!(!Arc::ptr_eq(&current.state, &session.state));
}

#[test]
fn rejected_override_leaves_session_alone() {
    let (service, _) = build_service();
    let session = service
        .open_session(sample_roster(), pools(2_800_000, 1_725_000))
        .expect("session opens");

    let outcome = service
        .override_allocation(
            &session.id,
            &OverrideIntent {
                player_id: id("u22-1"),
                pool: PoolKind::PoolA,
                amount: 10_000,
            },
        )
        .expect("override runs");

    assert!(!outcome.is_applied());
    let current = service.session(&session.id).expect("session exists");
    assert!(Arc::ptr_eq(&current.state, &session.state));
}

#[test]
fn reset_discards_manual_overrides() {
    let (service, _) = build_service();
    let session = service
        .open_session(sample_roster(), pools(2_800_000, 1_725_000))
        .expect("session opens");
    service
        .override_allocation(&session.id, &switch_to_pool_b())
        .expect("override runs");

    let reset = service.reset(&session.id).expect("reset runs");

    assert_eq!(*reset, *session.state);
    let current = service.session(&session.id).expect("session exists");
    assert_eq!(*current.state, *session.state);
}

#[test]
fn missing_session_is_not_found() {
    let (service, _) = build_service();
    let missing = SessionId("cap-missing".to_string());

    assert!(matches!(
        service.session(&missing),
        Err(CapServiceError::Session(SessionError::NotFound))
    ));
    assert!(matches!(
        service.override_allocation(&missing, &switch_to_pool_b()),
        Err(CapServiceError::Session(SessionError::NotFound))
    ));
    assert!(matches!(
        service.reset(&missing),
        Err(CapServiceError::Session(SessionError::NotFound))
    ));
}

#[test]
fn unavailable_store_surfaces_errors() {
    let service = CapComplianceService::new(Arc::new(UnavailableSessions), rules())
        .expect("rules are coherent");

    assert!(matches!(
        service.open_session(sample_roster(), pools(0, 0)),
        Err(CapServiceError::Session(SessionError::Unavailable(_)))
    ));
}

#[test]
fn incoherent_rules_are_refused() {
    let rules = CapRules {
        max_budget_charge: 6_000_000,
        ..rules()
    };
    let result = CapComplianceService::new(Arc::new(MemorySessions::default()), rules);

    assert!(matches!(
        result,
        Err(CapServiceError::Rules(RuleSetError::MaximumExceedsBudget { .. }))
    ));
}

#[test]
fn signing_assessment_uses_current_snapshot() {
    let (service, _) = build_service();
    let session = service
        .open_session(sample_roster(), pools(500_000, 300_000))
        .expect("session opens");
    let candidate = SigningCandidate {
        salary: 1_000_000,
        designation: CapDesignation::Standard,
        international: false,
        age: 26,
    };

    let before = service
        .assess_signing(&session.id, &candidate, &RosterSlotStatus::default())
        .expect("assessment runs");
    assert!(!before.feasible);

    // Clearing std-1 frees all of Pool A for the candidate.
    service
        .override_allocation(
            &session.id,
            &OverrideIntent {
                player_id: id("std-1"),
                pool: PoolKind::PoolA,
                amount: 0,
            },
        )
        .expect("override runs");

    let after = service
        .assess_signing(&session.id, &candidate, &RosterSlotStatus::default())
        .expect("assessment runs");
    assert!(after.feasible);
    assert_eq!(after.effective_charge, MAX_CHARGE);
}

#[test]
fn charges_do_not_touch_sessions() {
    let (service, sessions) = build_service();
    let charges = service.charges(&sample_roster());

    assert_eq!(charges.len(), 6);
    assert!(sessions.sessions.lock().expect("mutex").is_empty());
}
