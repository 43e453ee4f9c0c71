use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::Amount;

/// League constants governing how each player counts against the salary budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapRules {
    pub salary_budget: Amount,
    /// Ceiling for a standard player's charge; anything above needs pool money.
    pub max_budget_charge: Amount,
    pub designated_player_charge: Amount,
    pub young_designated_player_charge: Amount,
    pub young_designated_player_max_age: u8,
    pub youth_charge: Amount,
    pub youth_max_salary: Amount,
    /// Youth slots are open to players strictly younger than this age.
    pub youth_age_limit: u8,
    pub supplemental_floor: Amount,
    #[serde(default)]
    pub supplemental_discount_eligible: bool,
}

impl Default for CapRules {
    fn default() -> Self {
        Self {
            salary_budget: 5_470_000,
            max_budget_charge: 683_750,
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
}

impl CapRules {
    /// Reject rule sets that would make the charge model incoherent.
    pub fn validate(&self) -> Result<(), RuleSetError> {
        if self.salary_budget == 0 {
            return Err(RuleSetError::ZeroConstant {
                field: "salary_budget",
            });
        }
        if self.max_budget_charge == 0 {
            return Err(RuleSetError::ZeroConstant {
                field: "max_budget_charge",
            });
        }
        if self.max_budget_charge > self.salary_budget {
            return Err(RuleSetError::MaximumExceedsBudget {
                maximum: self.max_budget_charge,
                budget: self.salary_budget,
            });
        }
        if self.young_designated_player_charge > self.designated_player_charge {
            return Err(RuleSetError::YoungChargeExceedsFull {
                young: self.young_designated_player_charge,
                full: self.designated_player_charge,
            });
        }
        if self.youth_charge > self.max_budget_charge {
            return Err(RuleSetError::ExceedsMaximumCharge {
                field: "youth_charge",
                value: self.youth_charge,
                maximum: self.max_budget_charge,
            });
        }
        if self.supplemental_floor > self.max_budget_charge {
            return Err(RuleSetError::ExceedsMaximumCharge {
                field: "supplemental_floor",
                value: self.supplemental_floor,
                maximum: self.max_budget_charge,
            });
        }
        Ok(())
    }
}

/// Team-specific discount pool balances for the current window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTotals {
    pub pool_a_total: Amount,
    pub pool_b_total: Amount,
    /// Unused Pool A balance is forfeited after this date.
    #[serde(default)]
    pub pool_a_forfeits_on: Option<NaiveDate>,
}

impl Default for PoolTotals {
    fn default() -> Self {
        Self {
            pool_a_total: 2_800_000,
            pool_b_total: 1_725_000,
            pool_a_forfeits_on: None,
        }
    }
}

/// Configuration defects that halt start-up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleSetError {
    #[error("{field} must be greater than zero")]
    ZeroConstant { field: &'static str },
    #[error("{field} must not be negative (found {value})")]
    NegativeConstant { field: &'static str, value: i64 },
    #[error("max_budget_charge {maximum} exceeds salary_budget {budget}")]
    MaximumExceedsBudget { maximum: Amount, budget: Amount },
    #[error("young designated player charge {young} exceeds full charge {full}")]
    YoungChargeExceedsFull { young: Amount, full: Amount },
    #[error("{field} {value} exceeds max_budget_charge {maximum}")]
    ExceedsMaximumCharge {
        field: &'static str,
        value: Amount,
        maximum: Amount,
    },
}
