use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use super::allocation::{AllocationPlanner, AllocationState, OverrideIntent, OverrideOutcome};
use super::charge::{resolve_roster, PlayerCharge};
use super::domain::Roster;
use super::rules::{CapRules, PoolTotals, RuleSetError};
use super::session::{CapSession, SessionError, SessionId, SessionRepository};
use super::signing::{assess_signing, RosterSlotStatus, SigningAssessment, SigningCandidate};

/// Service composing the rules, planner and session store.
pub struct CapComplianceService<S> {
    planner: Arc<AllocationPlanner>,
    sessions: Arc<S>,
    default_pools: PoolTotals,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("cap-{id:06}"))
}

impl<S> CapComplianceService<S>
where
    S: SessionRepository + 'static,
{
    /// Build the service, refusing incoherent rule sets up front.
    pub fn new(sessions: Arc<S>, rules: CapRules) -> Result<Self, CapServiceError> {
        rules.validate()?;
        Ok(Self {
            planner: Arc::new(AllocationPlanner::new(rules)),
            sessions,
            default_pools: PoolTotals::default(),
        })
    }

    /// Pool totals used when a session is opened without explicit balances.
    pub fn with_default_pools(mut self, pools: PoolTotals) -> Self {
        self.default_pools = pools;
        self
    }

    pub fn rules(&self) -> &CapRules {
        self.planner.rules()
    }

    pub fn default_pools(&self) -> &PoolTotals {
        &self.default_pools
    }

    /// True charges for a roster without touching any session.
    pub fn charges(&self, roster: &Roster) -> Vec<PlayerCharge> {
        resolve_roster(roster, self.planner.rules())
    }

    /// Run the automatic planner without opening a session.
    pub fn plan(&self, roster: &Roster, pools: &PoolTotals) -> AllocationState {
        let state = self.planner.plan(roster, pools);
        if !state.compliant() {
            warn!(
                required = state.total_required(),
                applied = state.total_applied(),
                unmet = state.unmet(),
                "roster cannot reach cap compliance with available pools"
            );
        }
        state
    }

    /// Plan a roster and keep the result as a new session.
    pub fn open_session(
        &self,
        roster: Roster,
        pools: PoolTotals,
    ) -> Result<CapSession, CapServiceError> {
        let state = self.plan(&roster, &pools);
        let session = CapSession {
            id: next_session_id(),
            roster,
            pools,
            state: Arc::new(state),
        };

        let stored = self.sessions.insert(session)?;
        info!(
            session = %stored.id.0,
            players = stored.roster.len(),
            compliant = stored.state.compliant(),
            "allocation session opened"
        );
        Ok(stored)
    }

    pub fn session(&self, id: &SessionId) -> Result<CapSession, CapServiceError> {
        let session = self.sessions.fetch(id)?.ok_or(SessionError::NotFound)?;
        Ok(session)
    }

    /// Discard manual overrides and rerun the automatic planner for a session.
    pub fn reset(&self, id: &SessionId) -> Result<Arc<AllocationState>, CapServiceError> {
        let session = self.session(id)?;
        let state = Arc::new(self.plan(&session.roster, &session.pools));
        self.sessions.replace_state(id, state.clone())?;
        Ok(state)
    }

    /// Apply a manual override on top of the session's current snapshot.
    pub fn override_allocation(
        &self,
        id: &SessionId,
        intent: &OverrideIntent,
    ) -> Result<OverrideOutcome, CapServiceError> {
        let session = self.session(id)?;
        let outcome = session.state.apply_override(intent);

        if outcome.is_applied() {
            self.sessions
                .replace_state(id, Arc::new(outcome.state.clone()))?;
        }

        Ok(outcome)
    }

    /// Evaluate a hypothetical signing against the session's current allocation.
    pub fn assess_signing(
        &self,
        id: &SessionId,
        candidate: &SigningCandidate,
        slots: &RosterSlotStatus,
    ) -> Result<SigningAssessment, CapServiceError> {
        let session = self.session(id)?;
        Ok(assess_signing(
            candidate,
            self.planner.rules(),
            &session.state,
            slots,
        ))
    }
}

/// Error raised by the cap compliance service.
#[derive(Debug, thiserror::Error)]
pub enum CapServiceError {
    #[error(transparent)]
    Rules(#[from] RuleSetError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
