use cap_engine::cap::{
    AllocationState, CapDesignation, CapSession, SessionError, SessionId, SessionRepository,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local session store; sessions live until the service restarts.
#[derive(Default, Clone)]
pub(crate) struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<SessionId, CapSession>>>,
}

impl InMemorySessionRepository {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<SessionId, CapSession>>, SessionError> {
        self.sessions
            .lock()
            .map_err(|_| SessionError::Unavailable("session store lock poisoned".to_string()))
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn insert(&self, session: CapSession) -> Result<CapSession, SessionError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&session.id) {
            return Err(SessionError::Conflict);
        }
        guard.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<CapSession>, SessionError> {
        let guard = self.lock()?;
        Ok(guard.get(id).cloned())
    }

    fn replace_state(
        &self,
        id: &SessionId,
        state: Arc<AllocationState>,
    ) -> Result<(), SessionError> {
        let mut guard = self.lock()?;
        let session = guard.get_mut(id).ok_or(SessionError::NotFound)?;
        session.state = state;
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_designation(raw: &str) -> Result<CapDesignation, String> {
    raw.parse::<CapDesignation>().map_err(|err| err.to_string())
}
