use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::cap::allocation::{AllocationPlanner, AllocationState, PoolKind};
use crate::cap::domain::{Amount, CapDesignation, Player, PlayerId, Roster};
use crate::cap::rules::{CapRules, PoolTotals};
use crate::cap::service::CapComplianceService;
use crate::cap::session::{CapSession, SessionError, SessionId, SessionRepository};

pub(super) const MAX_CHARGE: Amount = 683_750;

pub(super) fn rules() -> CapRules {
    CapRules {
        salary_budget: 5_270_000,
        max_budget_charge: MAX_CHARGE,
        designated_player_charge: 683_750,
        young_designated_player_charge: 200_000,
        young_designated_player_max_age: 23,
        youth_charge: 150_000,
        youth_max_salary: 612_500,
        youth_age_limit: 23,
        supplemental_floor: 85_444,
        supplemental_discount_eligible: false,
    }
}

pub(super) fn pools(pool_a_total: Amount, pool_b_total: Amount) -> PoolTotals {
    PoolTotals {
        pool_a_total,
        pool_b_total,
        pool_a_forfeits_on: None,
    }
}

pub(super) fn id(raw: &str) -> PlayerId {
    PlayerId(raw.to_string())
}

pub(super) fn player(raw_id: &str, designation: CapDesignation, salary: Amount, age: u8) -> Player {
    Player {
        id: id(raw_id),
        name: format!("Player {raw_id}"),
        salary,
        designation,
        age,
        international: false,
        homegrown: false,
    }
}

pub(super) fn standard(raw_id: &str, salary: Amount) -> Player {
    player(raw_id, CapDesignation::Standard, salary, 27)
}

/// Standard player whose salary sits `need` above the per-player maximum.
pub(super) fn needing(raw_id: &str, need: Amount) -> Player {
    standard(raw_id, MAX_CHARGE + need)
}

pub(super) fn roster(players: Vec<Player>) -> Roster {
    Roster::new(players)
}

pub(super) fn planner() -> AllocationPlanner {
    AllocationPlanner::new(rules())
}

pub(super) fn plan(players: Vec<Player>, pool_a: Amount, pool_b: Amount) -> AllocationState {
    planner().plan(&roster(players), &pools(pool_a, pool_b))
}

/// Pools are never over-committed and no player draws from both.
pub(super) fn assert_invariants(state: &AllocationState) {
    let mut sums = [0, 0];
    for allocation in state.allocations() {
        assert!(
            !(allocation.pool_a > 0 && allocation.pool_b > 0),
            "player {} draws from both pools",
            allocation.player_id
        );
        let need = state
            .charge(&allocation.player_id)
            .expect("allocated player is rostered")
            .discount_need;
        assert!(allocation.total() <= need, "allocation exceeds need");
        sums[0] += allocation.pool_a;
        sums[1] += allocation.pool_b;
    }
    assert!(sums[0] <= state.pool(PoolKind::PoolA).total());
    assert!(sums[1] <= state.pool(PoolKind::PoolB).total());
    assert_eq!(sums[0], state.pool(PoolKind::PoolA).used());
    assert_eq!(sums[1], state.pool(PoolKind::PoolB).used());
    assert_eq!(state.total_applied(), sums[0] + sums[1]);
}

#[derive(Default, Clone)]
pub(super) struct MemorySessions {
    pub(super) sessions: Arc<Mutex<HashMap<SessionId, CapSession>>>,
}

impl SessionRepository for MemorySessions {
    fn insert(&self, session: CapSession) -> Result<CapSession, SessionError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        if guard.contains_key(&session.id) {
            return Err(SessionError::Conflict);
        }
        guard.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<CapSession>, SessionError> {
        let guard = self.sessions.lock().expect("session mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn replace_state(
        &self,
        id: &SessionId,
        state: Arc<AllocationState>,
    ) -> Result<(), SessionError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        let session = guard.get_mut(id).ok_or(SessionError::NotFound)?;
        session.state = state;
        Ok(())
    }
}

pub(super) struct UnavailableSessions;

impl SessionRepository for UnavailableSessions {
    fn insert(&self, _session: CapSession) -> Result<CapSession, SessionError> {
        Err(SessionError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<CapSession>, SessionError> {
        Err(SessionError::Unavailable("store offline".to_string()))
    }

    fn replace_state(
        &self,
        _id: &SessionId,
        _state: Arc<AllocationState>,
    ) -> Result<(), SessionError> {
        Err(SessionError::Unavailable("store offline".to_string()))
    }
}

pub(super) fn build_service() -> (CapComplianceService<MemorySessions>, Arc<MemorySessions>) {
    let sessions = Arc::new(MemorySessions::default());
    let service =
        CapComplianceService::new(sessions.clone(), rules()).expect("test rules are coherent");
    (service, sessions)
}

pub(super) fn sample_roster() -> Roster {
    roster(vec![
        player("dp-1", CapDesignation::DesignatedPlayer, 12_000_000, 31),
        player("u22-1", CapDesignation::YouthSlot, 450_000, 20),
        needing("std-1", 400_000),
        needing("std-2", 250_000),
        standard("std-3", 500_000),
        player("sup-1", CapDesignation::Supplemental, 70_000, 19),
    ])
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
