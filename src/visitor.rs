//! Folds the `pest` parse tree into the intermediate record (§4.4).
//!
//! The original visitor was synthesized at runtime by reflecting over the
//! target pydantic schema. This port keeps the same two-layer shape —
//! a uniform fold over a tagged-value tree, then a hand-written
//! constructor from that tree into typed records (§9, option b) — but the
//! per-rule dispatch (`fold_one`) and the final construction
//! (`RosterProfile::from_value`) are both written out explicitly rather
//! than generated, since Rust has no runtime reflection to generate them
//! from.

use std::collections::BTreeMap;

use pest::iterators::{Pair, Pairs};

use crate::date_parse::parse_natural_date;
use crate::delimiters::ATTRIBUTES_OPEN;
use crate::error::{warn, ParseError, SchemaError, Warning};
use crate::grammar::Rule;
use crate::model::{LargeTable, LargeTableRow, RosterProfile, SmallTable, SmallTableRow};

/// A uniform tagged-value tree, folded bottom-up from the parse tree
/// (§4.4 "Folding rule").
#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Int(i64),
    Map(BTreeMap<String, Value>),
    List(Vec<Value>),
}

/// The text of a rule up to (but not including) its attribute envelope
/// (§4.2's `ATTRIBUTES_OPEN`), trimmed.
fn leaf_text(pair: &Pair<Rule>) -> String {
    let full = pair.as_str();
    match full.find(ATTRIBUTES_OPEN) {
        Some(idx) => full[..idx].trim().to_string(),
        None => full.trim().to_string(),
    }
}

fn parse_int(text: &str) -> Option<i64> {
    text.replace(',', "").parse().ok()
}

/// Dispatches a single rule to its `{field: value}` contribution, or
/// `None` for rules with no visit method (attribute envelopes,
/// delimiters, character classes — consumed via `leaf_text` by their
/// parent instead of folded directly).
fn fold_one(pair: Pair<Rule>, warnings: &mut Vec<Warning>) -> Option<(&'static str, Value)> {
    match pair.as_rule() {
        Rule::team_name => Some(("team_name", Value::Str(leaf_text(&pair)))),
        Rule::release_date => Some(("release_date", Value::Str(leaf_text(&pair)))),
        Rule::roster_construction_model => {
            Some(("roster_construction_model", Value::Str(leaf_text(&pair))))
        }
        Rule::gam_available => {
            let text = leaf_text(&pair);
            match parse_int(&text) {
                Some(n) => Some(("gam_available", Value::Int(n))),
                None => {
                    warn(Warning::EnumMiss { field: "gam_available", value: text });
                    None
                }
            }
        }
        Rule::large_table_title | Rule::small_table_title => {
            Some(("table_title", Value::Str(leaf_text(&pair))))
        }
        Rule::player_name => Some(("player_name", Value::Str(leaf_text(&pair)))),
        Rule::roster_designation => Some(("roster_designation", Value::Str(leaf_text(&pair)))),
        Rule::current_status => Some(("current_status", Value::Str(leaf_text(&pair)))),
        Rule::contract_through => Some(("contract_through", Value::Str(leaf_text(&pair)))),
        Rule::option_years => Some(("option_years", Value::Str(leaf_text(&pair)))),
        Rule::small_table_row => {
            Some(("small_table_row", fold_map(pair.into_inner(), &[], warnings)))
        }
        Rule::large_table_row => {
            Some(("large_table_row", fold_map(pair.into_inner(), &[], warnings)))
        }
        Rule::small_table => {
            Some(("small_table", fold_map(pair.into_inner(), &["small_table_row"], warnings)))
        }
        Rule::large_table => {
            Some(("large_table", fold_map(pair.into_inner(), &["large_table_row"], warnings)))
        }
        _ => None,
    }
}

/// Folds a rule's children (§4.4 "Folding rule"):
/// 1. list-typed fields start as empty lists;
/// 2. each child's single-key contribution extends a list field, or
///    concatenates with a space if the key is already a string, or is
///    inserted otherwise;
/// 3. non-map child values that aren't folded are silently skipped (they
///    were never dispatched by `fold_one` in the first place, so there is
///    nothing to discard a warning about beyond what `fold_one` already
///    emitted).
fn fold_map(pairs: Pairs<Rule>, list_fields: &[&str], warnings: &mut Vec<Warning>) -> Value {
    let mut map: BTreeMap<String, Value> =
        list_fields.iter().map(|f| (f.to_string(), Value::List(Vec::new()))).collect();

    for inner in pairs {
        let Some((key, value)) = fold_one(inner, warnings) else { continue };

        if list_fields.contains(&key) {
            if let Some(Value::List(list)) = map.get_mut(key) {
                list.push(value);
            }
        } else if let Some(Value::Str(existing)) = map.get(key) {
            if let Value::Str(new_text) = &value {
                let combined = format!("{existing} {new_text}");
                map.insert(key.to_string(), Value::Str(combined));
            } else {
                map.insert(key.to_string(), value);
            }
        } else {
            map.insert(key.to_string(), value);
        }
    }

    Value::Map(map)
}

fn get_str(map: &BTreeMap<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::Str(s)) => Some(s.clone()),
        _ => None,
    }
}

fn get_int(map: &BTreeMap<String, Value>, key: &str) -> Option<i64> {
    match map.get(key) {
        Some(Value::Int(n)) => Some(*n),
        _ => None,
    }
}

fn get_list<'a>(map: &'a BTreeMap<String, Value>, key: &str) -> &'a [Value] {
    match map.get(key) {
        Some(Value::List(items)) => items,
        _ => &[],
    }
}

fn as_map(value: &Value) -> Option<&BTreeMap<String, Value>> {
    match value {
        Value::Map(m) => Some(m),
        _ => None,
    }
}

/// Parses `root` from the annotated page text and folds it into a
/// [`RosterProfile`].
///
/// A page known to carry roster text that the grammar can't parse is a
/// [`ParseError`] (rule 2, §7); a parse that succeeds but folds into a
/// record missing required fields is a [`SchemaError`] (rule 3, §7) —
/// these are distinct failure modes and kept as distinct error types.
pub fn visit_page(
    page: usize,
    text: &str,
    warnings: &mut Vec<Warning>,
) -> Result<RosterProfile, crate::error::RosterProfileError> {
    use pest::Parser;

    let mut parsed = crate::grammar::RosterGrammar::parse(Rule::root, text)
        .map_err(|e| ParseError { page, message: e.to_string() })?;
    let root = parsed
        .next()
        .ok_or_else(|| ParseError { page, message: "empty parse tree".into() })?;

    let folded = fold_map(root.into_inner(), &["small_table", "large_table"], warnings);
    let Value::Map(map) = folded else { unreachable!("fold_map always returns Value::Map") };

    Ok(build_roster_profile(page, &map)?)
}

fn build_roster_profile(
    page: usize,
    map: &BTreeMap<String, Value>,
) -> Result<RosterProfile, SchemaError> {
    let team_name = get_str(map, "team_name")
        .ok_or_else(|| SchemaError { page, message: "missing team_name".into() })?;
    let release_date_text = get_str(map, "release_date")
        .ok_or_else(|| SchemaError { page, message: "missing release_date".into() })?;
    let release_date = parse_natural_date(page, &release_date_text)?;

    let small_tables = get_list(map, "small_table")
        .iter()
        .filter_map(as_map)
        .map(|t| SmallTable {
            title: get_str(t, "table_title").unwrap_or_default(),
            rows: get_list(t, "small_table_row")
                .iter()
                .filter_map(as_map)
                .map(|r| SmallTableRow { player_name: get_str(r, "player_name") })
                .collect(),
        })
        .collect();

    let large_tables = get_list(map, "large_table")
        .iter()
        .filter_map(as_map)
        .map(|t| LargeTable {
            title: get_str(t, "table_title").unwrap_or_default(),
            rows: get_list(t, "large_table_row")
                .iter()
                .filter_map(as_map)
                .map(|r| LargeTableRow {
                    player_name: get_str(r, "player_name").unwrap_or_default(),
                    roster_designation: get_str(r, "roster_designation"),
                    current_status: get_str(r, "current_status"),
                    contract_through: get_str(r, "contract_through"),
                    option_years: get_str(r, "option_years"),
                })
                .collect(),
        })
        .collect();

    Ok(RosterProfile {
        team_name,
        release_date,
        roster_construction_model: get_str(map, "roster_construction_model"),
        gam_available: get_int(map, "gam_available"),
        small_tables,
        large_tables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_scenario_six_shaped_record() {
        // Scenario 6 (§8), built directly from a Value tree rather than
        // the grammar, to exercise build_roster_profile in isolation.
        let mut small_row = BTreeMap::new();
        small_row.insert("player_name".to_string(), Value::Str("Luis Suárez".into()));
        let mut small_table = BTreeMap::new();
        small_table.insert("table_title".to_string(), Value::Str("Unavailable Players".into()));
        small_table.insert("small_table_row".to_string(), Value::List(vec![Value::Map(small_row)]));

        let mut large_row = BTreeMap::new();
        large_row.insert("player_name".to_string(), Value::Str("Luis Suárez".into()));
        large_row.insert(
            "current_status".to_string(),
            Value::Str("Unavailable - Injured List".into()),
        );
        let mut large_table = BTreeMap::new();
        large_table.insert("table_title".to_string(), Value::Str("Senior Roster".into()));
        large_table.insert("large_table_row".to_string(), Value::List(vec![Value::Map(large_row)]));

        let mut root = BTreeMap::new();
        root.insert("team_name".to_string(), Value::Str("Inter Miami CF".into()));
        root.insert("release_date".to_string(), Value::Str("2025-07-07".into()));
        root.insert("small_table".to_string(), Value::List(vec![Value::Map(small_table)]));
        root.insert("large_table".to_string(), Value::List(vec![Value::Map(large_table)]));

        let profile = build_roster_profile(0, &root).unwrap();
        assert_eq!(profile.team_name, "Inter Miami CF");
        assert_eq!(profile.small_tables.len(), 1);
        assert_eq!(profile.large_tables[0].rows[0].current_status.as_deref(), Some("Unavailable - Injured List"));
    }

    #[test]
    fn duplicate_string_keys_concatenate_with_a_space() {
        let mut map: BTreeMap<String, Value> = BTreeMap::new();
        map.insert("player_name".to_string(), Value::Str("Jane".into()));
        // Simulate a second child contributing the same key, as fold_map would.
        if let Some(Value::Str(existing)) = map.get("player_name") {
            let combined = format!("{existing} Doe");
            map.insert("player_name".to_string(), Value::Str(combined));
        }
        assert_eq!(get_str(&map, "player_name"), Some("Jane Doe".to_string()));
    }
}
