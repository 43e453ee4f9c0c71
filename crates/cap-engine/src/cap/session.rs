use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::allocation::AllocationState;
use super::domain::Roster;
use super::rules::PoolTotals;

/// Identifier wrapper for allocation sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Roster snapshot, pool totals and the current allocation for one session.
///
/// The state sits behind an `Arc` so readers hold an immutable snapshot while a
/// writer swaps in its replacement.
#[derive(Debug, Clone)]
pub struct CapSession {
    pub id: SessionId,
    pub roster: Roster,
    pub pools: PoolTotals,
    pub state: Arc<AllocationState>,
}

/// Storage abstraction for session-scoped allocation state.
///
/// `replace_state` must swap the stored snapshot in one step; the most recent
/// writer wins.
pub trait SessionRepository: Send + Sync {
    fn insert(&self, session: CapSession) -> Result<CapSession, SessionError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<CapSession>, SessionError>;
    fn replace_state(&self, id: &SessionId, state: Arc<AllocationState>)
        -> Result<(), SessionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}
