use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for rostered players.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dollar amount in whole US dollars.
pub type Amount = u64;

/// Sum of amounts, pinned at `Amount::MAX` instead of wrapping.
pub(crate) fn total_of<I>(amounts: I) -> Amount
where
    I: IntoIterator<Item = Amount>,
{
    amounts.into_iter().fold(0, Amount::saturating_add)
}

/// Amount as a signed value for headroom arithmetic, pinned at `i64::MAX`.
pub(crate) fn signed(amount: Amount) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}

/// Cap mechanism a player is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapDesignation {
    DesignatedPlayer,
    YouthSlot,
    Standard,
    Supplemental,
}

impl CapDesignation {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::DesignatedPlayer,
            Self::YouthSlot,
            Self::Standard,
            Self::Supplemental,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::DesignatedPlayer => "Designated Player",
            Self::YouthSlot => "Youth Slot",
            Self::Standard => "Standard",
            Self::Supplemental => "Supplemental",
        }
    }

    /// Fixed-charge mechanisms bypass the per-player maximum and never take pool money.
    pub const fn is_fixed_charge(self) -> bool {
        matches!(self, Self::DesignatedPlayer | Self::YouthSlot)
    }

    /// Supplemental players occupy the supplemental roster; everyone else is senior.
    pub const fn occupies_senior_roster(self) -> bool {
        !matches!(self, Self::Supplemental)
    }
}

impl fmt::Display for CapDesignation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised when an external tag does not name a known designation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized cap designation '{0}'")]
pub struct UnknownDesignation(pub String);

impl FromStr for CapDesignation {
    type Err = UnknownDesignation;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value
            .trim()
            .to_ascii_lowercase()
            .replace([' ', '-'], "_");
        match normalized.as_str() {
            "dp" | "designated_player" => Ok(Self::DesignatedPlayer),
            "u22" | "youth" | "youth_slot" => Ok(Self::YouthSlot),
            "standard" | "senior" => Ok(Self::Standard),
            "supplemental" => Ok(Self::Supplemental),
            _ => Err(UnknownDesignation(value.to_string())),
        }
    }
}

/// Read-only roster entry supplied by the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub salary: Amount,
    pub designation: CapDesignation,
    pub age: u8,
    #[serde(default)]
    pub international: bool,
    #[serde(default)]
    pub homegrown: bool,
}

/// Ordered roster snapshot the engine recomputes from on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    pub fn new(players: Vec<Player>) -> Self {
        Self { players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn find(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| &player.id == id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn count_designation(&self, designation: CapDesignation) -> usize {
        self.players
            .iter()
            .filter(|player| player.designation == designation)
            .count()
    }
}

impl FromIterator<Player> for Roster {
    fn from_iter<I: IntoIterator<Item = Player>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
