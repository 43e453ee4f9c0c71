//! Salary-cap compliance: per-player budget charges, discount pool allocation,
//! manual overrides and signing feasibility.

pub mod allocation;
pub mod charge;
pub mod domain;
pub mod import;
pub mod report;
pub mod router;
pub mod rules;
pub mod service;
pub mod session;
pub mod signing;

#[cfg(test)]
mod tests;

pub use allocation::{
    AllocationPlanner, AllocationPool, AllocationState, BudgetPosition, ClampReason,
    OverrideIntent, OverrideOutcome, OverrideRejection, OverrideStatus, PlayerAllocation,
    PoolError, PoolKind,
};
pub use charge::{discount_need, is_discount_eligible, resolve_roster, true_charge, PlayerCharge};
pub use domain::{Amount, CapDesignation, Player, PlayerId, Roster, UnknownDesignation};
pub use import::{RosterImportError, RosterImporter};
pub use report::CapReport;
pub use router::cap_router;
pub use rules::{CapRules, PoolTotals, RuleSetError};
pub use service::{CapComplianceService, CapServiceError};
pub use session::{CapSession, SessionError, SessionId, SessionRepository};
pub use signing::{
    assess_signing, RosterSlotStatus, SigningAssessment, SigningBlocker, SigningCandidate,
    SlotUsage,
};
