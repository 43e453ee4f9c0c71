//! Discount pool accounting and the allocation state shared by the automatic
//! planner and the manual override path.
//!
//! Every state handed out is a complete, settled value. Mutations go through
//! [`AllocationState::apply_override`], which returns a fresh state rather than
//! editing the one it was called on.

mod overrides;
mod planner;

pub use overrides::{ClampReason, OverrideIntent, OverrideOutcome, OverrideRejection, OverrideStatus};
pub use planner::AllocationPlanner;

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::charge::PlayerCharge;
use super::domain::{signed, total_of, Amount, PlayerId};

/// The two discretionary discount pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    /// Non-tradeable, forfeited when unused by the deadline.
    PoolA,
    /// Tradeable between teams, carries over.
    PoolB,
}

impl PoolKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PoolA => "Pool A",
            Self::PoolB => "Pool B",
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Self::PoolA => Self::PoolB,
            Self::PoolB => Self::PoolA,
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Balance tracking for one discount pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPool {
    kind: PoolKind,
    total: Amount,
    used: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    forfeits_on: Option<NaiveDate>,
}

impl AllocationPool {
    pub fn new(kind: PoolKind, total: Amount) -> Self {
        Self {
            kind,
            total,
            used: 0,
            forfeits_on: None,
        }
    }

    pub fn with_forfeiture(mut self, forfeits_on: Option<NaiveDate>) -> Self {
        self.forfeits_on = forfeits_on;
        self
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn used(&self) -> Amount {
        self.used
    }

    pub fn remaining(&self) -> Amount {
        self.total - self.used
    }

    pub fn forfeits_on(&self) -> Option<NaiveDate> {
        self.forfeits_on
    }

    /// Commit an exact amount, refusing anything the balance cannot cover.
    pub fn commit(&mut self, amount: Amount) -> Result<(), PoolError> {
        if amount > self.remaining() {
            return Err(PoolError::Overcommitted {
                pool: self.kind,
                requested: amount,
                remaining: self.remaining(),
            });
        }
        self.used += amount;
        Ok(())
    }

    /// Return previously committed money to the pool.
    pub fn release(&mut self, amount: Amount) -> Result<(), PoolError> {
        if amount > self.used {
            return Err(PoolError::ReleaseExceedsUsed {
                pool: self.kind,
                requested: amount,
                used: self.used,
            });
        }
        self.used -= amount;
        Ok(())
    }

    /// Commit as much of `requested` as the balance allows and report what was drawn.
    pub(crate) fn draw(&mut self, requested: Amount) -> Amount {
        let drawn = requested.min(self.remaining());
        self.used += drawn;
        drawn
    }

    /// Unused balance that will be lost if nothing changes before the deadline.
    pub fn forfeiture_at_risk(&self, today: NaiveDate) -> Option<Amount> {
        match self.forfeits_on {
            Some(deadline) if today <= deadline && self.remaining() > 0 => Some(self.remaining()),
            _ => None,
        }
    }

    fn emptied(&self) -> Self {
        Self {
            used: 0,
            ..self.clone()
        }
    }
}

/// Errors raised by strict pool commits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("{pool} cannot cover {requested} (remaining {remaining})")]
    Overcommitted {
        pool: PoolKind,
        requested: Amount,
        remaining: Amount,
    },
    #[error("{pool} cannot release {requested} (used {used})")]
    ReleaseExceedsUsed {
        pool: PoolKind,
        requested: Amount,
        used: Amount,
    },
}

/// Discount assigned to one player. At most one side is ever nonzero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAllocation {
    pub player_id: PlayerId,
    pub pool_a: Amount,
    pub pool_b: Amount,
}

impl PlayerAllocation {
    pub fn empty(player_id: PlayerId) -> Self {
        Self {
            player_id,
            pool_a: 0,
            pool_b: 0,
        }
    }

    pub fn from_pool(player_id: PlayerId, pool: PoolKind, amount: Amount) -> Self {
        let mut allocation = Self::empty(player_id);
        match pool {
            PoolKind::PoolA => allocation.pool_a = amount,
            PoolKind::PoolB => allocation.pool_b = amount,
        }
        allocation
    }

    pub fn amount(&self, pool: PoolKind) -> Amount {
        match pool {
            PoolKind::PoolA => self.pool_a,
            PoolKind::PoolB => self.pool_b,
        }
    }

    pub fn total(&self) -> Amount {
        self.pool_a.saturating_add(self.pool_b)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Pool the player currently draws from, if any.
    pub fn source(&self) -> Option<PoolKind> {
        if self.pool_a > 0 {
            Some(PoolKind::PoolA)
        } else if self.pool_b > 0 {
            Some(PoolKind::PoolB)
        } else {
            None
        }
    }
}

/// Aggregate salary budget position after discounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetPosition {
    pub salary_budget: Amount,
    pub true_total: Amount,
    pub discount_applied: Amount,
    pub effective_total: Amount,
    /// Negative when the effective total is over budget.
    pub headroom: i64,
}

impl BudgetPosition {
    pub fn within_budget(&self) -> bool {
        self.headroom >= 0
    }
}

/// Result of an allocation run or of a manual override applied to one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationState {
    charges: BTreeMap<PlayerId, PlayerCharge>,
    allocations: BTreeMap<PlayerId, PlayerAllocation>,
    pool_a: AllocationPool,
    pool_b: AllocationPool,
    salary_budget: Amount,
    total_required: Amount,
    total_applied: Amount,
    compliant: bool,
}

impl AllocationState {
    pub(crate) fn new(
        charges: BTreeMap<PlayerId, PlayerCharge>,
        allocations: BTreeMap<PlayerId, PlayerAllocation>,
        pool_a: AllocationPool,
        pool_b: AllocationPool,
        salary_budget: Amount,
    ) -> Self {
        let mut state = Self {
            charges,
            allocations,
            pool_a,
            pool_b,
            salary_budget,
            total_required: 0,
            total_applied: 0,
            compliant: false,
        };
        state.settle();
        state
    }

    pub fn pool(&self, kind: PoolKind) -> &AllocationPool {
        match kind {
            PoolKind::PoolA => &self.pool_a,
            PoolKind::PoolB => &self.pool_b,
        }
    }

    pub fn pool_a(&self) -> &AllocationPool {
        &self.pool_a
    }

    pub fn pool_b(&self) -> &AllocationPool {
        &self.pool_b
    }

    pub fn charges(&self) -> impl Iterator<Item = &PlayerCharge> {
        self.charges.values()
    }

    pub fn charge(&self, player_id: &PlayerId) -> Option<&PlayerCharge> {
        self.charges.get(player_id)
    }

    /// Players holding a nonzero discount, ordered by id.
    pub fn allocations(&self) -> impl Iterator<Item = &PlayerAllocation> {
        self.allocations.values()
    }

    /// Allocation for a rostered player; uncovered players read as 0/0.
    pub fn allocation(&self, player_id: &PlayerId) -> Option<PlayerAllocation> {
        if !self.charges.contains_key(player_id) {
            return None;
        }
        Some(
            self.allocations
                .get(player_id)
                .cloned()
                .unwrap_or_else(|| PlayerAllocation::empty(player_id.clone())),
        )
    }

    pub fn total_required(&self) -> Amount {
        self.total_required
    }

    pub fn total_applied(&self) -> Amount {
        self.total_applied
    }

    pub fn compliant(&self) -> bool {
        self.compliant
    }

    /// Discount still missing for full compliance.
    pub fn unmet(&self) -> Amount {
        self.total_required.saturating_sub(self.total_applied)
    }

    /// Players whose need is not fully covered, largest shortfall first.
    pub fn uncovered(&self) -> Vec<(PlayerId, Amount)> {
        let mut shortfalls: Vec<(PlayerId, Amount)> = self
            .charges
            .values()
            .filter_map(|charge| {
                let covered = self
                    .allocations
                    .get(&charge.player_id)
                    .map(PlayerAllocation::total)
                    .unwrap_or(0);
                let short = charge.discount_need.saturating_sub(covered);
                (short > 0).then(|| (charge.player_id.clone(), short))
            })
            .collect();
        shortfalls.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        shortfalls
    }

    pub fn budget_position(&self) -> BudgetPosition {
        let true_total = total_of(self.charges.values().map(|charge| charge.true_charge));
        let effective_total = true_total.saturating_sub(self.total_applied);
        BudgetPosition {
            salary_budget: self.salary_budget,
            true_total,
            discount_applied: self.total_applied,
            effective_total,
            headroom: signed(self.salary_budget).saturating_sub(signed(effective_total)),
        }
    }

    /// Rebuild pool balances from the per-player allocations alone.
    fn recount_pools(&mut self) -> Result<(), PoolError> {
        let mut pool_a = self.pool_a.emptied();
        let mut pool_b = self.pool_b.emptied();
        for allocation in self.allocations.values() {
            pool_a.commit(allocation.pool_a)?;
            pool_b.commit(allocation.pool_b)?;
        }
        self.pool_a = pool_a;
        self.pool_b = pool_b;
        Ok(())
    }

    fn settle(&mut self) {
        self.allocations.retain(|_, allocation| !allocation.is_empty());
        self.total_required = total_of(self.charges.values().map(|charge| charge.discount_need));
        self.total_applied = total_of(self.allocations.values().map(PlayerAllocation::total));
        self.compliant = self.total_applied >= self.total_required;
    }
}
