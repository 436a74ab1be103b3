//! Top-level entry point (§4.6 "Release assembly"): wires the PDF
//! container, extractor, visitor, and assembler together into one
//! document-level result.
//!
//! Grounded in the original's `from_pdf` classmethod: filter pages by
//! `"SENIOR ROSTER"`, extract + parse + assemble each, then cross-check
//! that every roster page agrees on `release_date`.

use crate::assembler::assemble_team;
use crate::error::{warn, ReleaseError, RosterProfileError, SchemaError, Warning};
use crate::extractor::{strip_hyphen_continuations, PageExtractor};
use crate::model::RosterProfileRelease;
use crate::pdf;
use crate::visitor::visit_page;

const ROSTER_MARKER: &str = "SENIOR ROSTER";

/// Runtime knobs for extraction (§7.1).
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// When set, an `EnumMiss` warning on a page is promoted to a hard
    /// `SchemaError` instead of falling back to `Enumerated::Unknown`.
    pub fail_on_unknown_enum: bool,
}

/// Parses every roster page of `bytes` into a [`RosterProfileRelease`],
/// along with the non-fatal warnings collected along the way (§6).
pub fn from_pdf_bytes(
    bytes: &[u8],
    options: ExtractOptions,
) -> Result<(RosterProfileRelease, Vec<Warning>), RosterProfileError> {
    let (doc, pages) = pdf::load(bytes)?;

    let mut warnings = Vec::new();
    let mut release_date: Option<(usize, time::Date)> = None;
    let mut teams = Vec::new();

    for page in &pages {
        let extractor = PageExtractor::new(page, &doc);
        let raw_text = extractor.extract()?;
        let text = strip_hyphen_continuations(&raw_text);

        if !text.contains(ROSTER_MARKER) {
            warnings.push(warn(Warning::NonRosterPageSkipped { page: page.index }));
            continue;
        }

        let before = warnings.len();
        let profile = visit_page(page.index, &text, &mut warnings)?;

        if options.fail_on_unknown_enum {
            reject_unknown_enums(page.index, &warnings[before..])?;
        }

        match &release_date {
            None => release_date = Some((page.index, profile.release_date)),
            Some((first_page, first_date)) if *first_date != profile.release_date => {
                return Err(ReleaseError::DateMismatch {
                    first_page: *first_page,
                    first_date: first_date.to_string(),
                    other_page: page.index,
                    other_date: profile.release_date.to_string(),
                }
                .into());
            }
            Some(_) => {}
        }

        let team = assemble_team(page.index, &profile, &mut warnings)?;
        warnings.push(warn(Warning::PageParsed { page: page.index, team_name: team.name.clone() }));
        teams.push(team);
    }

    let Some((_, release_date)) = release_date else {
        return Err(ReleaseError::NoRosterPages.into());
    };

    Ok((RosterProfileRelease { release_date, teams }, warnings))
}

fn reject_unknown_enums(page: usize, new_warnings: &[Warning]) -> Result<(), RosterProfileError> {
    if let Some(Warning::EnumMiss { field, value }) =
        new_warnings.iter().find(|w| matches!(w, Warning::EnumMiss { .. }))
    {
        return Err(SchemaError {
            page,
            message: format!("unrecognized value {value:?} for field {field}"),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_reports_no_roster_pages() {
        // A minimal, single-blank-page PDF with no "SENIOR ROSTER" text
        // anywhere in its content stream.
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(lopdf::Stream::new(lopdf::Dictionary::new(), Vec::new()));

        let mut page_dict = lopdf::Dictionary::new();
        page_dict.set("Type", lopdf::Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", lopdf::Object::Reference(pages_id));
        page_dict.set("Resources", lopdf::Object::Dictionary(lopdf::Dictionary::new()));
        page_dict.set("Contents", lopdf::Object::Reference(content_id));
        let page_id = doc.add_object(lopdf::Object::Dictionary(page_dict));

        let mut pages_dict = lopdf::Dictionary::new();
        pages_dict.set("Type", lopdf::Object::Name(b"Pages".to_vec()));
        pages_dict.set("Kids", lopdf::Object::Array(vec![lopdf::Object::Reference(page_id)]));
        pages_dict.set("Count", lopdf::Object::Integer(1));
        doc.objects.insert(pages_id, lopdf::Object::Dictionary(pages_dict));

        let mut catalog_dict = lopdf::Dictionary::new();
        catalog_dict.set("Type", lopdf::Object::Name(b"Catalog".to_vec()));
        catalog_dict.set("Pages", lopdf::Object::Reference(pages_id));
        let catalog_id = doc.add_object(lopdf::Object::Dictionary(catalog_dict));

        doc.trailer.set("Root", lopdf::Object::Reference(catalog_id));

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let result = from_pdf_bytes(&bytes, ExtractOptions::default());
        assert!(matches!(result, Err(RosterProfileError::Release(ReleaseError::NoRosterPages))));
    }
}
