use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::{AllocationPool, AllocationState, PlayerAllocation, PoolKind};
use crate::cap::charge::PlayerCharge;
use crate::cap::domain::{Amount, PlayerId, Roster};
use crate::cap::rules::{CapRules, PoolTotals};

/// Stateless planner that spreads the discount pools over over-maximum players.
#[derive(Debug, Clone)]
pub struct AllocationPlanner {
    rules: CapRules,
}

impl AllocationPlanner {
    pub fn new(rules: CapRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &CapRules {
        &self.rules
    }

    /// Build a fresh allocation for the roster snapshot.
    pub fn plan(&self, roster: &Roster, pools: &PoolTotals) -> AllocationState {
        let charges = self.collect(roster);
        let queue = sorted_needs(&charges);

        let mut pool_a = AllocationPool::new(PoolKind::PoolA, pools.pool_a_total)
            .with_forfeiture(pools.pool_a_forfeits_on);
        let mut pool_b = AllocationPool::new(PoolKind::PoolB, pools.pool_b_total);
        let mut allocations = BTreeMap::new();

        for (player_id, need) in queue {
            let Some((pool, drawn)) = draw_for(need, &mut pool_a, &mut pool_b) else {
                debug!(player = %player_id, need, "no pool balance left, player uncovered");
                continue;
            };
            debug!(player = %player_id, need, %pool, drawn, "discount allocated");
            allocations.insert(
                player_id.clone(),
                PlayerAllocation::from_pool(player_id, pool, drawn),
            );
        }

        AllocationState::new(
            charges,
            allocations,
            pool_a,
            pool_b,
            self.rules.salary_budget,
        )
    }

    fn collect(&self, roster: &Roster) -> BTreeMap<PlayerId, PlayerCharge> {
        let mut charges = BTreeMap::new();
        for player in roster.players() {
            match charges.entry(player.id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(PlayerCharge::resolve(player, &self.rules));
                }
                Entry::Occupied(_) => {
                    warn!(player = %player.id, "duplicate roster entry ignored");
                }
            }
        }
        charges
    }
}

/// Eligible players with a positive need, largest need first, ties by id.
fn sorted_needs(charges: &BTreeMap<PlayerId, PlayerCharge>) -> Vec<(PlayerId, Amount)> {
    let mut queue: Vec<(PlayerId, Amount)> = charges
        .values()
        .filter(|charge| charge.discount_need > 0)
        .map(|charge| (charge.player_id.clone(), charge.discount_need))
        .collect();
    queue.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    queue
}

/// Serve one player from a single pool: Pool A when it covers the whole need,
/// otherwise Pool B when it does, otherwise a partial draw from the fuller pool.
/// The other pool is never touched for this player, so a need larger than either
/// pool stays partly unmet even when the two balances together would cover it.
fn draw_for(
    need: Amount,
    pool_a: &mut AllocationPool,
    pool_b: &mut AllocationPool,
) -> Option<(PoolKind, Amount)> {
    let pool = if pool_a.remaining() >= need {
        pool_a
    } else if pool_b.remaining() >= need {
        pool_b
    } else if pool_a.remaining() >= pool_b.remaining() {
        pool_a
    } else {
        pool_b
    };

    let drawn = pool.draw(need);
    (drawn > 0).then(|| (pool.kind(), drawn))
}
