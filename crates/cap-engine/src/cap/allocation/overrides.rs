use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{AllocationState, PlayerAllocation, PoolError, PoolKind};
use crate::cap::domain::{Amount, CapDesignation, PlayerId};

/// Request to set one player's discount from a specific pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideIntent {
    pub player_id: PlayerId,
    pub pool: PoolKind,
    pub amount: Amount,
}

/// Which limit reduced the requested amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClampReason {
    /// Discounting below the per-player maximum is never allowed.
    DiscountNeed,
    PoolBalance,
}

/// Reasons a manual override leaves the prior state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum OverrideRejection {
    #[error("player {player_id} is not on the roster")]
    UnknownPlayer { player_id: PlayerId },
    #[error("player {player_id} ({designation}) is not eligible for pool discounts")]
    NotEligible {
        player_id: PlayerId,
        designation: CapDesignation,
    },
    #[error("pool balances could not be reconciled: {message}")]
    PoolUnavailable { message: String },
}

impl From<PoolError> for OverrideRejection {
    fn from(value: PoolError) -> Self {
        Self::PoolUnavailable {
            message: value.to_string(),
        }
    }
}

/// Whether the override took effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OverrideStatus {
    Applied {
        requested: Amount,
        granted: Amount,
        #[serde(skip_serializing_if = "Option::is_none")]
        clamped_by: Option<ClampReason>,
        /// Amount returned to the other pool to keep the player on one source.
        refunded: Amount,
    },
    Rejected(OverrideRejection),
}

impl OverrideStatus {
    pub fn summary(&self) -> String {
        match self {
            OverrideStatus::Applied {
                requested,
                granted,
                clamped_by,
                ..
            } => match clamped_by {
                Some(ClampReason::DiscountNeed) => {
                    format!("requested {requested}, limited to discount need {granted}")
                }
                Some(ClampReason::PoolBalance) => {
                    format!("requested {requested}, limited to pool balance {granted}")
                }
                None => format!("allocated {granted}"),
            },
            OverrideStatus::Rejected(reason) => format!("override rejected: {reason}"),
        }
    }
}

/// New state plus the verdict on the requested mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideOutcome {
    pub state: AllocationState,
    pub status: OverrideStatus,
}

impl OverrideOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self.status, OverrideStatus::Applied { .. })
    }

    fn rejected(state: &AllocationState, reason: OverrideRejection) -> Self {
        debug!(%reason, "manual override rejected");
        Self {
            state: state.clone(),
            status: OverrideStatus::Rejected(reason),
        }
    }
}

impl AllocationState {
    /// Apply a manual allocation change, producing a new state.
    ///
    /// The receiver is never modified. Invalid requests come back as
    /// [`OverrideStatus::Rejected`] with a copy of the current state; oversized
    /// amounts are clamped to the pool balance and the player's discount need.
    pub fn apply_override(&self, intent: &OverrideIntent) -> OverrideOutcome {
        let Some(charge) = self.charges.get(&intent.player_id) else {
            return OverrideOutcome::rejected(
                self,
                OverrideRejection::UnknownPlayer {
                    player_id: intent.player_id.clone(),
                },
            );
        };

        if !charge.discount_eligible {
            return OverrideOutcome::rejected(
                self,
                OverrideRejection::NotEligible {
                    player_id: intent.player_id.clone(),
                    designation: charge.designation,
                },
            );
        }

        let current = self
            .allocations
            .get(&intent.player_id)
            .cloned()
            .unwrap_or_else(|| PlayerAllocation::empty(intent.player_id.clone()));

        let available = self.pool(intent.pool).remaining() + current.amount(intent.pool);
        let need = charge.discount_need;
        let granted = intent.amount.min(available).min(need);
        let clamped_by = if granted == intent.amount {
            None
        } else if need <= available {
            Some(ClampReason::DiscountNeed)
        } else {
            Some(ClampReason::PoolBalance)
        };

        let (updated, refunded) = if granted > 0 {
            let refunded = current.amount(intent.pool.other());
            (
                PlayerAllocation::from_pool(intent.player_id.clone(), intent.pool, granted),
                refunded,
            )
        } else {
            let mut cleared = current;
            match intent.pool {
                PoolKind::PoolA => cleared.pool_a = 0,
                PoolKind::PoolB => cleared.pool_b = 0,
            }
            (cleared, 0)
        };

        let mut next = self.clone();
        next.allocations.insert(intent.player_id.clone(), updated);
        if let Err(err) = next.recount_pools() {
            return OverrideOutcome::rejected(self, err.into());
        }
        next.settle();

        info!(
            player = %intent.player_id,
            pool = %intent.pool,
            requested = intent.amount,
            granted,
            refunded,
            compliant = next.compliant,
            "manual override applied"
        );

        OverrideOutcome {
            state: next,
            status: OverrideStatus::Applied {
                requested: intent.amount,
                granted,
                clamped_by,
                refunded,
            },
        }
    }
}
