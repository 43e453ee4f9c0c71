use serde::{Deserialize, Serialize};

use super::allocation::AllocationState;
use super::charge::PlayerCharge;
use super::domain::{signed, Amount, CapDesignation, Player, PlayerId};
use super::rules::CapRules;

/// Hypothetical signing the front office wants to evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningCandidate {
    pub salary: Amount,
    pub designation: CapDesignation,
    #[serde(default)]
    pub international: bool,
    pub age: u8,
}

impl SigningCandidate {
    fn as_player(&self) -> Player {
        Player {
            id: PlayerId("signing-candidate".to_string()),
            name: "Signing candidate".to_string(),
            salary: self.salary,
            designation: self.designation,
            age: self.age,
            international: self.international,
            homegrown: false,
        }
    }
}

/// Occupancy of one slot family, tracked outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotUsage {
    pub used: u8,
    pub limit: u8,
}

impl SlotUsage {
    pub const fn new(used: u8, limit: u8) -> Self {
        Self { used, limit }
    }

    pub const fn has_opening(self) -> bool {
        self.used < self.limit
    }
}

/// Roster spot and slot counts supplied by the compliance-status collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSlotStatus {
    pub senior_roster: SlotUsage,
    pub supplemental_roster: SlotUsage,
    pub international: SlotUsage,
    pub designated_player: SlotUsage,
    pub youth: SlotUsage,
}

impl Default for RosterSlotStatus {
    fn default() -> Self {
        Self {
            senior_roster: SlotUsage::new(0, 20),
            supplemental_roster: SlotUsage::new(0, 10),
            international: SlotUsage::new(0, 8),
            designated_player: SlotUsage::new(0, 3),
            youth: SlotUsage::new(0, 3),
        }
    }
}

/// Reasons a signing cannot be registered as proposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SigningBlocker {
    SeniorRosterFull,
    SupplementalRosterFull,
    NoInternationalSlot,
    NoDesignatedPlayerSlot,
    NoYouthSlot,
    YouthAgeIneligible { age: u8, age_limit: u8 },
    YouthSalaryTooHigh { salary: Amount, max_salary: Amount },
    InsufficientPoolBalance { needed: Amount, available: Amount },
    OverBudget { effective_charge: Amount, headroom: i64 },
}

impl SigningBlocker {
    pub fn summary(&self) -> String {
        match self {
            SigningBlocker::SeniorRosterFull => "no senior roster spot available".to_string(),
            SigningBlocker::SupplementalRosterFull => {
                "no supplemental roster spot available".to_string()
            }
            SigningBlocker::NoInternationalSlot => "no international slot available".to_string(),
            SigningBlocker::NoDesignatedPlayerSlot => {
                "all designated player slots are filled".to_string()
            }
            SigningBlocker::NoYouthSlot => "all youth slots are filled".to_string(),
            SigningBlocker::YouthAgeIneligible { age, age_limit } => {
                format!("age {age} is not under the youth limit of {age_limit}")
            }
            SigningBlocker::YouthSalaryTooHigh { salary, max_salary } => {
                format!("salary {salary} exceeds the youth maximum {max_salary}")
            }
            SigningBlocker::InsufficientPoolBalance { needed, available } => format!(
                "needs a {needed} discount but a single pool can cover at most {available}"
            ),
            SigningBlocker::OverBudget {
                effective_charge,
                headroom,
            } => format!("charge {effective_charge} exceeds remaining budget room {headroom}"),
        }
    }
}

/// Feasibility verdict for a hypothetical signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningAssessment {
    pub feasible: bool,
    pub budget_charge: Amount,
    pub discount_required: Amount,
    pub effective_charge: Amount,
    pub blocking_reasons: Vec<SigningBlocker>,
    pub suggested_remediation: Vec<String>,
}

/// Check a hypothetical signing against slots, pools and budget room.
pub fn assess_signing(
    candidate: &SigningCandidate,
    rules: &CapRules,
    state: &AllocationState,
    slots: &RosterSlotStatus,
) -> SigningAssessment {
    let charge = PlayerCharge::resolve(&candidate.as_player(), rules);
    let mut blockers = Vec::new();

    if candidate.designation.occupies_senior_roster() {
        if !slots.senior_roster.has_opening() {
            blockers.push(SigningBlocker::SeniorRosterFull);
        }
    } else if !slots.supplemental_roster.has_opening() {
        blockers.push(SigningBlocker::SupplementalRosterFull);
    }

    if candidate.international && !slots.international.has_opening() {
        blockers.push(SigningBlocker::NoInternationalSlot);
    }

    match candidate.designation {
        CapDesignation::DesignatedPlayer if !slots.designated_player.has_opening() => {
            blockers.push(SigningBlocker::NoDesignatedPlayerSlot);
        }
        CapDesignation::YouthSlot => {
            if !slots.youth.has_opening() {
                blockers.push(SigningBlocker::NoYouthSlot);
            }
            if candidate.age >= rules.youth_age_limit {
                blockers.push(SigningBlocker::YouthAgeIneligible {
                    age: candidate.age,
                    age_limit: rules.youth_age_limit,
                });
            }
            if candidate.salary > rules.youth_max_salary {
                blockers.push(SigningBlocker::YouthSalaryTooHigh {
                    salary: candidate.salary,
                    max_salary: rules.youth_max_salary,
                });
            }
        }
        _ => {}
    }

    // A signing draws from one pool only, like every rostered player.
    let single_pool = state.pool_a().remaining().max(state.pool_b().remaining());
    let covered = charge.discount_need.min(single_pool);
    if covered < charge.discount_need {
        blockers.push(SigningBlocker::InsufficientPoolBalance {
            needed: charge.discount_need,
            available: single_pool,
        });
    }

    let effective_charge = charge.true_charge - covered;
    let headroom = state.budget_position().headroom;
    if signed(effective_charge) > headroom {
        blockers.push(SigningBlocker::OverBudget {
            effective_charge,
            headroom,
        });
    }

    let suggested_remediation = blockers
        .iter()
        .map(|blocker| remediation_for(blocker, candidate, slots))
        .collect();

    SigningAssessment {
        feasible: blockers.is_empty(),
        budget_charge: charge.true_charge,
        discount_required: charge.discount_need,
        effective_charge,
        blocking_reasons: blockers,
        suggested_remediation,
    }
}

fn remediation_for(
    blocker: &SigningBlocker,
    candidate: &SigningCandidate,
    slots: &RosterSlotStatus,
) -> String {
    match blocker {
        SigningBlocker::SeniorRosterFull => {
            "Waive, trade or loan a senior roster player to open a spot".to_string()
        }
        SigningBlocker::SupplementalRosterFull => {
            "Move a supplemental player to the senior roster or release one".to_string()
        }
        SigningBlocker::NoInternationalSlot => {
            "Acquire an international slot by trade or obtain a green card for a current player"
                .to_string()
        }
        SigningBlocker::NoDesignatedPlayerSlot => {
            "Buy an existing Designated Player down with pool money to free a slot".to_string()
        }
        SigningBlocker::NoYouthSlot => {
            "Register the player as Standard or free a youth slot".to_string()
        }
        SigningBlocker::YouthAgeIneligible { .. } => {
            "Register the player as Standard or Designated Player".to_string()
        }
        SigningBlocker::YouthSalaryTooHigh { max_salary, .. } => {
            format!("Restructure the salary to at most {max_salary} or register as Designated Player")
        }
        SigningBlocker::InsufficientPoolBalance { needed, available } => {
            if candidate.designation == CapDesignation::Standard
                && slots.designated_player.has_opening()
            {
                "Register the player as a Designated Player".to_string()
            } else {
                format!(
                    "Acquire {} of Pool B money by trade",
                    needed.saturating_sub(*available)
                )
            }
        }
        SigningBlocker::OverBudget {
            effective_charge,
            headroom,
        } => format!(
            "Clear {} of budget room before signing",
            signed(*effective_charge).saturating_sub(*headroom)
        ),
    }
}
