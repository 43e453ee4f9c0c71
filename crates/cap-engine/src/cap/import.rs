use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{Amount, CapDesignation, Player, PlayerId, Roster, UnknownDesignation};

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Designation { line: u64, source: UnknownDesignation },
    Salary { line: u64, value: String },
    DuplicatePlayer { line: u64, player_id: PlayerId },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster file: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::Designation { line, source } => {
                write!(f, "line {}: {}", line, source)
            }
            RosterImportError::Salary { line, value } => {
                write!(f, "line {}: salary '{}' is not a dollar amount", line, value)
            }
            RosterImportError::DuplicatePlayer { line, player_id } => {
                write!(f, "line {}: player '{}' appears twice", line, player_id)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::Designation { source, .. } => Some(source),
            RosterImportError::Salary { .. } | RosterImportError::DuplicatePlayer { .. } => None,
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads roster snapshots exported as CSV (`id,name,salary,designation,age,international,homegrown`).
pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Roster, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Roster, RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut seen = HashSet::new();
        let mut players = Vec::new();

        for (index, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
            let row = record?;
            // Header occupies line 1.
            let line = index as u64 + 2;

            let designation = row
                .designation
                .parse::<CapDesignation>()
                .map_err(|source| RosterImportError::Designation { line, source })?;
            let salary = parse_salary(&row.salary).ok_or_else(|| RosterImportError::Salary {
                line,
                value: row.salary.clone(),
            })?;

            let id = PlayerId(row.id);
            if !seen.insert(id.clone()) {
                return Err(RosterImportError::DuplicatePlayer {
                    line,
                    player_id: id,
                });
            }

            players.push(Player {
                id,
                name: row.name,
                salary,
                designation,
                age: row.age,
                international: row.international,
                homegrown: row.homegrown,
            });
        }

        Ok(Roster::new(players))
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    id: String,
    name: String,
    salary: String,
    designation: String,
    age: u8,
    #[serde(default, deserialize_with = "flag")]
    international: bool,
    #[serde(default, deserialize_with = "flag")]
    homegrown: bool,
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let value = raw.unwrap_or_default();
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "n" | "no" | "false" => Ok(false),
        "1" | "y" | "yes" | "true" => Ok(true),
        other => Err(serde::de::Error::custom(format!(
            "expected a yes/no flag, found '{other}'"
        ))),
    }
}

/// Accepts `1000000`, `1,000,000` and `$1,000,000.00`.
fn parse_salary(raw: &str) -> Option<Amount> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|ch| *ch != ',')
        .collect();
    let whole = match cleaned.split_once('.') {
        Some((whole, cents)) if cents.chars().all(|ch| ch == '0') => whole.to_string(),
        Some(_) => return None,
        None => cleaned,
    };
    whole.parse::<Amount>().ok()
}
