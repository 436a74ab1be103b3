//! Error kinds for the roster-profile pipeline (§7).
//!
//! Mirrors the teacher's preference for plain enums over a generic error
//! framework, expressed with `thiserror` the way the rest of the pack does.

use thiserror::Error;

/// Font dictionaries, `Tf` operands, and PDF container structure.
#[derive(Debug, Error, Clone)]
pub enum ExtractionError {
    #[error("page {page}: font resource {key:?} not found in page resources")]
    FontNotFound { page: usize, key: String },

    #[error("page {page}: font dictionary missing required entry {entry:?}")]
    MalformedFontDictionary { page: usize, entry: &'static str },

    #[error("page {page}: decoded glyph for code {code} collides with a reserved delimiter")]
    ReservedGlyphCollision { page: usize, code: u8 },

    #[error("page {page}: Tf operator expected 2 operands, got {got}")]
    InvalidTfOperands { page: usize, got: usize },

    #[error("malformed PDF container: {0}")]
    MalformedContainer(String),

    #[error("page {page}: could not decompress content stream: {source}")]
    ContentStreamDecode { page: usize, source: String },
}

/// The PEG failed to parse a page known to contain a roster table.
#[derive(Debug, Error, Clone)]
#[error("page {page}: grammar parse failed: {message}")]
pub struct ParseError {
    pub page: usize,
    pub message: String,
}

/// The folded intermediate record did not satisfy the expected schema.
#[derive(Debug, Error, Clone)]
#[error("page {page}: {message}")]
pub struct SchemaError {
    pub page: usize,
    pub message: String,
}

/// No roster pages were found, or pages disagreed on `release_date`.
#[derive(Debug, Error, Clone)]
pub enum ReleaseError {
    #[error("document contains no pages with \"SENIOR ROSTER\" text")]
    NoRosterPages,

    #[error("release_date disagreement: page {first_page} says {first_date}, page {other_page} says {other_date}")]
    DateMismatch {
        first_page: usize,
        first_date: String,
        other_page: usize,
        other_date: String,
    },
}

/// Top-level error returned by [`crate::release::from_pdf_bytes`].
#[derive(Debug, Error, Clone)]
pub enum RosterProfileError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Release(#[from] ReleaseError),
}

/// A non-fatal condition surfaced alongside a successful result (§6).
///
/// Every warning is also emitted via `log::warn!` at the point it is
/// discovered; this type exists so a caller can additionally collect a
/// structured summary without installing a log subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A page's extracted text lacked `"SENIOR ROSTER"` and was skipped.
    NonRosterPageSkipped { page: usize },
    /// A page parsed and produced a team.
    PageParsed { page: usize, team_name: String },
    /// `roster_designation`, `current_status`, or `roster_construction_model`
    /// held a value outside the known enumeration.
    EnumMiss { field: &'static str, value: String },
    /// Zero or multiple small-table rows matched a player during enrichment.
    EnrichmentAmbiguity { player_name: String, table_title: String, matches: usize },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::NonRosterPageSkipped { page } => {
                write!(f, "page {page}: skipped, no \"SENIOR ROSTER\" text")
            }
            Warning::PageParsed { page, team_name } => {
                write!(f, "page {page}: parsed team {team_name:?}")
            }
            Warning::EnumMiss { field, value } => {
                write!(f, "unrecognized value {value:?} for field {field}")
            }
            Warning::EnrichmentAmbiguity { player_name, table_title, matches } => write!(
                f,
                "{matches} rows in table {table_title:?} matched player {player_name:?}"
            ),
        }
    }
}

/// Emits `w` through the `log` facade at the appropriate level and returns it,
/// so call sites can both push to a `Vec<Warning>` and log in one line.
pub fn warn(w: Warning) -> Warning {
    log::warn!("{w}");
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_display_is_human_readable() {
        let w = Warning::EnumMiss { field: "current_status", value: "Injured Reserve".into() };
        assert_eq!(
            w.to_string(),
            "unrecognized value \"Injured Reserve\" for field current_status"
        );
    }

    #[test]
    fn extraction_error_converts_into_top_level_error() {
        let e = ExtractionError::FontNotFound { page: 3, key: "F1".into() };
        let top: RosterProfileError = e.into();
        assert!(matches!(top, RosterProfileError::Extraction(_)));
    }
}
