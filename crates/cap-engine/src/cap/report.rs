use chrono::NaiveDate;
use serde::Serialize;

use super::allocation::{AllocationState, BudgetPosition, PoolKind};
use super::domain::{total_of, Amount, CapDesignation, PlayerId};

#[derive(Debug, Clone, Serialize)]
pub struct PlayerCapRow {
    pub player_id: PlayerId,
    pub designation: CapDesignation,
    pub designation_label: &'static str,
    pub salary: Amount,
    pub true_charge: Amount,
    pub pool_a: Amount,
    pub pool_b: Amount,
    pub effective_charge: Amount,
    #[serde(skip_serializing_if = "is_zero")]
    pub shortfall: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct DesignationTotalEntry {
    pub designation: CapDesignation,
    pub designation_label: &'static str,
    pub players: usize,
    pub true_charge: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoolSummaryEntry {
    pub pool: PoolKind,
    pub pool_label: &'static str,
    pub total: Amount,
    pub used: Amount,
    pub remaining: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forfeits_on: Option<NaiveDate>,
}

/// Presentation view of an allocation state.
#[derive(Debug, Clone, Serialize)]
pub struct CapReport {
    pub compliant: bool,
    pub headline: String,
    pub total_required: Amount,
    pub total_applied: Amount,
    pub unmet: Amount,
    pub budget: BudgetPosition,
    pub pools: Vec<PoolSummaryEntry>,
    pub designation_totals: Vec<DesignationTotalEntry>,
    pub players: Vec<PlayerCapRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

fn is_zero(value: &Amount) -> bool {
    *value == 0
}

impl AllocationState {
    pub fn report(&self, today: NaiveDate) -> CapReport {
        let mut players: Vec<PlayerCapRow> = self
            .charges()
            .map(|charge| {
                let allocation = self
                    .allocation(&charge.player_id)
                    .map(|allocation| (allocation.pool_a, allocation.pool_b))
                    .unwrap_or((0, 0));
                let discount = allocation.0.saturating_add(allocation.1);
                PlayerCapRow {
                    player_id: charge.player_id.clone(),
                    designation: charge.designation,
                    designation_label: charge.designation.label(),
                    salary: charge.salary,
                    true_charge: charge.true_charge,
                    pool_a: allocation.0,
                    pool_b: allocation.1,
                    effective_charge: charge.true_charge - discount,
                    shortfall: charge.discount_need.saturating_sub(discount),
                }
            })
            .collect();
        players.sort_by(|a, b| {
            b.true_charge
                .cmp(&a.true_charge)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });

        let designation_totals = CapDesignation::ordered()
            .into_iter()
            .filter_map(|designation| {
                let matching: Vec<&PlayerCapRow> = players
                    .iter()
                    .filter(|row| row.designation == designation)
                    .collect();
                (!matching.is_empty()).then(|| DesignationTotalEntry {
                    designation,
                    designation_label: designation.label(),
                    players: matching.len(),
                    true_charge: total_of(matching.iter().map(|row| row.true_charge)),
                })
            })
            .collect();

        let pools = [PoolKind::PoolA, PoolKind::PoolB]
            .into_iter()
            .map(|kind| {
                let pool = self.pool(kind);
                PoolSummaryEntry {
                    pool: kind,
                    pool_label: kind.label(),
                    total: pool.total(),
                    used: pool.used(),
                    remaining: pool.remaining(),
                    forfeits_on: pool.forfeits_on(),
                }
            })
            .collect();

        let budget = self.budget_position();
        let headline = if self.compliant() {
            "roster is cap compliant".to_string()
        } else {
            format!("${} short of cap compliance", self.unmet())
        };

        let mut notices = Vec::new();
        if let (Some(at_risk), Some(deadline)) = (
            self.pool_a().forfeiture_at_risk(today),
            self.pool_a().forfeits_on(),
        ) {
            notices.push(format!(
                "{at_risk} of {} is unused and will be forfeited after {deadline}",
                PoolKind::PoolA.label()
            ));
        }
        if !budget.within_budget() {
            notices.push(format!(
                "effective total {} exceeds the salary budget {} by {}",
                budget.effective_total, budget.salary_budget, -budget.headroom
            ));
        }

        CapReport {
            compliant: self.compliant(),
            headline,
            total_required: self.total_required(),
            total_applied: self.total_applied(),
            unmet: self.unmet(),
            budget,
            pools,
            designation_totals,
            players,
            notices,
        }
    }
}
