//! End-to-end exercise of the grammar → visitor → assembler chain
//! (§8), feeding hand-built annotated text directly rather than a real
//! PDF, since only the extractor (covered by its own unit tests) needs
//! an actual content stream.

use mls_roster_profiles::{assembler, visitor, CurrentStatus, Enumerated, RosterDesignation};

fn envelope(text: &str, weight: &str) -> String {
    format!("{text}\u{300A}10|20|30|{weight}\u{300B}\n")
}

#[test]
fn full_page_parses_and_enriches_a_designated_player() {
    let mut text = String::new();
    text.push_str(&envelope("Inter Miami CF", "bold"));
    text.push_str(&envelope("July 7, 2025", "regular"));

    // Large table: Senior Roster, one Designated Player row.
    text.push_str(&envelope("Senior Roster", "bold"));
    text.push_str(&envelope("Lionel Messi", "regular"));
    text.push_str(&envelope("Designated Player", "regular"));
    text.push_str(&envelope("Off-Budget", "regular"));
    text.push_str(&envelope("2026", "regular"));

    // Small table: Designated Players, caret override on the same player.
    text.push_str(&envelope("Designated Players", "bold"));
    text.push_str(&envelope("Lionel Messi ^", "regular"));

    let mut warnings = Vec::new();
    let profile = visitor::visit_page(0, &text, &mut warnings).expect("page should parse");

    assert_eq!(profile.team_name, "Inter Miami CF");
    assert_eq!(profile.large_tables.len(), 1);
    assert_eq!(profile.small_tables.len(), 1);

    let team = assembler::assemble_team(0, &profile, &mut warnings).expect("team should assemble");
    assert_eq!(team.name, "Inter Miami CF");
    assert_eq!(team.players.len(), 1);

    let messi = &team.players[0];
    assert_eq!(messi.name, "Lionel Messi");
    assert_eq!(
        messi.roster_designation,
        Some(Enumerated::Known(RosterDesignation::DesignatedPlayer))
    );
    assert_eq!(messi.current_status, Some(Enumerated::Known(CurrentStatus::OffBudget)));
    assert_eq!(messi.contract_through.as_deref(), Some("2026"));
    // Designated Player defaults to TAM-convertible, then the small
    // table's caret suffix overrides it back to false.
    assert_eq!(messi.convertible_with_tam, Some(false));
    assert!(!messi.international_slot);
    assert!(!messi.unavailable);
}

#[test]
fn unrecognized_current_status_falls_back_to_unknown_with_a_warning() {
    let mut text = String::new();
    text.push_str(&envelope("LA Galaxy", "bold"));
    text.push_str(&envelope("2025-03-01", "regular"));
    text.push_str(&envelope("Senior Roster", "bold"));
    text.push_str(&envelope("Jane Doe", "regular"));
    text.push_str(&envelope("Homegrown Player", "regular"));
    text.push_str(&envelope("Injured Reserve", "regular"));

    let mut warnings = Vec::new();
    let profile = visitor::visit_page(0, &text, &mut warnings).expect("page should parse");
    let team = assembler::assemble_team(0, &profile, &mut warnings).expect("team should assemble");

    let jane = &team.players[0];
    assert_eq!(
        jane.current_status,
        Some(Enumerated::Unknown("Injured Reserve".to_string()))
    );
    assert!(warnings.iter().any(|w| matches!(
        w,
        mls_roster_profiles::Warning::EnumMiss { field, value }
            if *field == "current_status" && value == "Injured Reserve"
    )));
}
