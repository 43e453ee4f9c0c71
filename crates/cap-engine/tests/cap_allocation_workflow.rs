use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cap_engine::cap::{
    AllocationState, CapComplianceService, CapRules, CapSession, ClampReason, OverrideIntent,
    OverrideStatus, PlayerId, PoolKind, PoolTotals, Roster, RosterImporter, SessionError,
    SessionId, SessionRepository,
};
use chrono::NaiveDate;

#[derive(Default)]
struct Sessions {
    inner: Mutex<HashMap<SessionId, CapSession>>,
}

impl SessionRepository for Sessions {
    fn insert(&self, session: CapSession) -> Result<CapSession, SessionError> {
        let mut guard = self.inner.lock().expect("session mutex poisoned");
        guard.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<CapSession>, SessionError> {
        Ok(self
            .inner
            .lock()
            .expect("session mutex poisoned")
            .get(id)
            .cloned())
    }

    fn replace_state(
        &self,
        id: &SessionId,
        state: Arc<AllocationState>,
    ) -> Result<(), SessionError> {
        let mut guard = self.inner.lock().expect("session mutex poisoned");
        let session = guard.get_mut(id).ok_or(SessionError::NotFound)?;
        session.state = state;
        Ok(())
    }
}

fn sample_roster() -> Roster {
    let data = include_bytes!("../sample_roster.csv");
    RosterImporter::from_reader(&data[..]).expect("sample roster imports")
}

fn service() -> CapComplianceService<Sessions> {
    CapComplianceService::new(Arc::new(Sessions::default()), CapRules::default())
        .expect("league defaults are coherent")
}

fn player(raw: &str) -> PlayerId {
    PlayerId(raw.to_string())
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

#[test]
fn default_pools_cover_the_sample_roster() {
    let state = service().plan(&sample_roster(), &PoolTotals::default());

    assert!(state.compliant());
    assert_eq!(state.total_required(), 898_750);
    assert_eq!(state.pool_a().used(), 898_750);
    assert_eq!(state.pool_b().used(), 0);

    let budget = state.budget_position();
    assert_eq!(budget.true_total, 5_614_638);
    assert_eq!(budget.effective_total, 4_715_888);
    assert_eq!(budget.headroom, 754_112);

    let young_dp = state.charge(&player("dp-02")).expect("rostered");
    assert_eq!(young_dp.true_charge, 200_000);
    let floor = state.charge(&player("sup-01")).expect("rostered");
    assert_eq!(floor.true_charge, 85_444);
}

#[test]
fn tight_pools_leave_a_small_gap() {
    let pools = PoolTotals {
        pool_a_total: 600_000,
        pool_b_total: 300_000,
        pool_a_forfeits_on: None,
    };
    let state = service().plan(&sample_roster(), &pools);

    assert!(!state.compliant());
    assert_eq!(state.total_applied(), 896_250);
    assert_eq!(state.unmet(), 2_500);
    assert_eq!(state.uncovered(), vec![(player("std-03"), 2_500)]);

    let report = state.report(date(2025, 9, 1));
    assert_eq!(report.headline, "$2500 short of cap compliance");
    let std_03 = report
        .players
        .iter()
        .find(|row| row.player_id == player("std-03"))
        .expect("row present");
    assert_eq!(std_03.shortfall, 2_500);
}

#[test]
fn report_warns_about_pool_a_forfeiture() {
    let pools = PoolTotals {
        pool_a_forfeits_on: Some(date(2025, 9, 12)),
        ..PoolTotals::default()
    };
    let state = service().plan(&sample_roster(), &pools);

    let before = state.report(date(2025, 9, 1));
    assert_eq!(
        before.notices,
        vec!["1901250 of Pool A is unused and will be forfeited after 2025-09-12".to_string()]
    );

    let after = state.report(date(2025, 9, 13));
    assert!(after.notices.is_empty());
}

#[test]
fn session_overrides_and_reset_round_trip() {
    let service = service();
    let pools = PoolTotals {
        pool_a_total: 600_000,
        pool_b_total: 300_000,
        pool_a_forfeits_on: None,
    };
    let session = service
        .open_session(sample_roster(), pools)
        .expect("session opens");

    // Pool B only has 3,750 left after the automatic pass.
    let outcome = service
        .override_allocation(
            &session.id,
            &OverrideIntent {
                player_id: player("std-03"),
                pool: PoolKind::PoolB,
                amount: 36_250,
            },
        )
        .expect("override runs");
    assert_eq!(
        outcome.status,
        OverrideStatus::Applied {
            requested: 36_250,
            granted: 3_750,
            clamped_by: Some(ClampReason::PoolBalance),
            refunded: 33_750,
        }
    );
    assert_eq!(outcome.state.unmet(), 32_500);

    let stored = service.session(&session.id).expect("session exists");
    assert_eq!(stored.state.unmet(), 32_500);

    let reset = service.reset(&session.id).expect("reset runs");
    assert_eq!(reset.unmet(), 2_500);
    assert_eq!(*reset, *session.state);
}
