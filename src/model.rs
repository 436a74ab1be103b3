//! The intermediate record (§3, visitor output) and the final `Team`/
//! `Player` records, plus the four enumerations.
//!
//! Grounded in the original `models.py` for field shape, and in `enum.py`'s
//! `StrEnumCaseInsensitive` for the normalization rule (strip en-dash,
//! hyphen, and spaces; lowercase) and the enum-or-raw-string fallback.

use serde_derive::{Deserialize, Serialize};

/// `roster_designation` and `current_status` are enum-or-raw-string (§9):
/// an unrecognized value is preserved rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Enumerated<T> {
    Known(T),
    Unknown(String),
}

impl<T: KnownEnum> Enumerated<T> {
    /// Parses `raw`, falling back to `Unknown(raw)` (and the caller logging
    /// an `EnumMiss` warning) when no variant matches.
    pub fn parse(raw: &str) -> Self {
        match T::from_normalized(raw) {
            Some(v) => Enumerated::Known(v),
            None => Enumerated::Unknown(raw.to_string()),
        }
    }

    pub fn is_known(&self, variant: &T) -> bool
    where
        T: PartialEq,
    {
        matches!(self, Enumerated::Known(v) if v == variant)
    }
}

/// Shared by every enumeration in §3: case-insensitive match after
/// normalizing unicode en-dash to hyphen-minus and stripping spaces.
pub trait KnownEnum: Sized + Copy {
    const VARIANTS: &'static [(&'static str, Self)];

    fn from_normalized(raw: &str) -> Option<Self> {
        let needle = normalize(raw);
        Self::VARIANTS.iter().find(|(s, _)| normalize(s) == needle).map(|(_, v)| *v)
    }

    const FIELD_NAME: &'static str;
}

/// Lowercases, replaces U+2013 (en dash) with hyphen-minus, strips spaces.
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '\u{2013}' { '-' } else { c })
        .collect::<String>()
        .to_lowercase()
}

macro_rules! known_enum {
    ($name:ident, $field:literal, [$($variant:ident => $lit:literal),+ $(,)?]) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl KnownEnum for $name {
            const VARIANTS: &'static [(&'static str, Self)] = &[
                $(($lit, $name::$variant)),+
            ];
            const FIELD_NAME: &'static str = $field;
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $lit),+
                }
            }
        }
    };
}

known_enum!(RosterSlot, "roster_slot", [
    SeniorRoster => "Senior Roster",
    SupplementalRoster => "Supplemental Roster",
    SupplementalSpot31 => "Supplemental Spot 31",
    OffRosterUnavailable => "Off-Roster (Unavailable)",
]);

known_enum!(RosterDesignation, "roster_designation", [
    YoungDesignatedPlayer => "Young Designated Player",
    TamPlayer => "TAM Player",
    DesignatedPlayer => "Designated Player",
    U22Initiative => "U22 Initiative",
    HomegrownPlayer => "Homegrown Player",
    GenerationAdidas => "Generation adidas",
    ProfessionalPlayerDevelopmentRole => "Professional Player Development Role",
    SpecialDiscoveryPlayer => "Special Discovery Player",
]);

known_enum!(CurrentStatus, "current_status", [
    UnavailableOnLoan => "Unavailable - On Loan",
    UnavailableSei => "Unavailable - SEI",
    UnavailableP1Itc => "Unavailable - P1/ITC",
    UnavailableOther => "Unavailable - Other",
    Unavailable => "Unavailable",
    OffBudget => "Off-Budget",
    LoanPlayer => "Loan Player",
    UnavailableInjuredList => "Unavailable - Injured List",
]);

known_enum!(RosterConstructionModel, "roster_construction_model", [
    DesignatedPlayerModel => "Designated Player Model",
    U22InitiativePlayerModel => "U22 Initiative Player Model",
]);

/// One row of a small table: `{player_name?}` (§3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmallTableRow {
    pub player_name: Option<String>,
}

/// A small table: `{title, rows: [SmallTableRow]}` (§3). Serialized field
/// names follow the original's aliases (see test scenario 6, §8).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmallTable {
    #[serde(rename = "table_title")]
    pub title: String,
    #[serde(rename = "small_table_row", default)]
    pub rows: Vec<SmallTableRow>,
}

/// One row of a large (roster) table (§3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LargeTableRow {
    pub player_name: String,
    pub roster_designation: Option<String>,
    pub current_status: Option<String>,
    pub contract_through: Option<String>,
    pub option_years: Option<String>,
}

/// A large table: `{title, rows: [LargeTableRow]}` (§3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LargeTable {
    #[serde(rename = "table_title")]
    pub title: String,
    #[serde(rename = "large_table_row", default)]
    pub rows: Vec<LargeTableRow>,
}

/// The visitor's output, before roster assembly (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterProfile {
    pub team_name: String,
    pub release_date: time::Date,
    pub roster_construction_model: Option<String>,
    pub gam_available: Option<i64>,
    #[serde(default)]
    pub small_tables: Vec<SmallTable>,
    #[serde(default)]
    pub large_tables: Vec<LargeTable>,
}

/// The final player record (§3). Three-valued booleans distinguish "not
/// applicable" (`None`) from `false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: Option<String>,
    pub name: String,
    pub roster_slot: RosterSlot,
    pub roster_designation: Option<Enumerated<RosterDesignation>>,
    pub current_status: Option<Enumerated<CurrentStatus>>,
    pub contract_through: Option<String>,
    pub option_years: Option<String>,
    pub permanent_transfer_option: Option<bool>,
    pub international_slot: bool,
    pub convertible_with_tam: Option<bool>,
    pub unavailable: bool,
    pub canadian_international_slot_exemption: Option<bool>,
}

/// The final team record (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: Option<String>,
    pub name: String,
    pub roster_construction_model: Option<Enumerated<RosterConstructionModel>>,
    pub players: Vec<Player>,
    pub international_slots: Option<i64>,
    pub gam_available: Option<i64>,
}

/// `{release_date, teams}` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterProfileRelease {
    pub release_date: time::Date,
    pub teams: Vec<Team>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_matches_case_insensitively_and_ignores_en_dash_and_spaces() {
        assert_eq!(RosterSlot::from_normalized("senior roster"), Some(RosterSlot::SeniorRoster));
        assert_eq!(
            CurrentStatus::from_normalized("unavailable\u{2013}onloan"),
            Some(CurrentStatus::UnavailableOnLoan)
        );
        assert_eq!(
            CurrentStatus::from_normalized("UNAVAILABLE - ON LOAN"),
            Some(CurrentStatus::UnavailableOnLoan)
        );
    }

    #[test]
    fn unrecognized_value_falls_back_to_unknown() {
        let e: Enumerated<CurrentStatus> = Enumerated::parse("Injured Reserve");
        assert_eq!(e, Enumerated::Unknown("Injured Reserve".to_string()));
    }
}
