use serde::{Deserialize, Serialize};

use super::domain::{Amount, CapDesignation, Player, PlayerId, Roster};
use super::rules::CapRules;

/// Pre-discount budget charge for a single player.
pub fn true_charge(player: &Player, rules: &CapRules) -> Amount {
    match player.designation {
        CapDesignation::DesignatedPlayer => {
            if player.age <= rules.young_designated_player_max_age {
                rules.young_designated_player_charge
            } else {
                rules.designated_player_charge
            }
        }
        CapDesignation::YouthSlot => rules.youth_charge,
        CapDesignation::Supplemental => player.salary.max(rules.supplemental_floor),
        CapDesignation::Standard => player.salary,
    }
}

/// Whether the player may receive Pool A or Pool B money at all.
pub fn is_discount_eligible(player: &Player, rules: &CapRules) -> bool {
    let designation_allows = match player.designation {
        designation if designation.is_fixed_charge() => false,
        CapDesignation::Supplemental => rules.supplemental_discount_eligible,
        _ => true,
    };
    designation_allows && true_charge(player, rules) > rules.max_budget_charge
}

/// Discount required to bring an eligible player down to the per-player maximum.
pub fn discount_need(player: &Player, rules: &CapRules) -> Amount {
    if is_discount_eligible(player, rules) {
        true_charge(player, rules) - rules.max_budget_charge
    } else {
        0
    }
}

/// Resolved charge details exposed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCharge {
    pub player_id: PlayerId,
    pub designation: CapDesignation,
    pub salary: Amount,
    pub true_charge: Amount,
    pub discount_eligible: bool,
    pub discount_need: Amount,
}

impl PlayerCharge {
    pub fn resolve(player: &Player, rules: &CapRules) -> Self {
        let true_charge = true_charge(player, rules);
        let discount_eligible = is_discount_eligible(player, rules);
        let discount_need = if discount_eligible {
            true_charge - rules.max_budget_charge
        } else {
            0
        };

        Self {
            player_id: player.id.clone(),
            designation: player.designation,
            salary: player.salary,
            true_charge,
            discount_eligible,
            discount_need,
        }
    }
}

/// Resolve every rostered player, preserving roster order.
pub fn resolve_roster(roster: &Roster, rules: &CapRules) -> Vec<PlayerCharge> {
    roster
        .players()
        .iter()
        .map(|player| PlayerCharge::resolve(player, rules))
        .collect()
}
