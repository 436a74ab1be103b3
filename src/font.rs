//! Font resolution and byte-string decoding (§3 "Font", §4.1).
//!
//! Grounded in the original `pypdf/models.py` `Font`/`Type1FontDictionary`
//! classes for the field shape and decode contract, and in the teacher's
//! `deserialize.rs` for how a `Tf` operand resolves against a page's
//! `/Resources /Font` dictionary via `lopdf`. None of the teacher's
//! TrueType/OpenType glyph-outline machinery (`ParsedFont`, `OwnedGlyph`,
//! `GlyphOutline*`, `FontMetrics`) survives here: this pipeline only ever
//! reads already-rendered glyph codes out of a font resource, it never
//! rasterizes or measures outlines.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object};

use crate::cmap::get_to_unicode_cmap_from_font;
use crate::delimiters;
use crate::error::ExtractionError;

/// Inferred from a case-insensitive substring match of `"bold"`/`"light"`
/// in the font name; defaults to `Regular` (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Light,
    Regular,
    Bold,
}

impl FontWeight {
    pub fn from_font_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("bold") {
            FontWeight::Bold
        } else if lower.contains("light") {
            FontWeight::Light
        } else {
            FontWeight::Regular
        }
    }

    /// The literal used in the serialized attribute suffix (§4.2).
    pub fn as_attr_str(&self) -> &'static str {
        match self {
            FontWeight::Light => "light",
            FontWeight::Regular => "regular",
            FontWeight::Bold => "bold",
        }
    }
}

/// `{font_name, size, weight, characters: code→glyph, widths: code→width}` (§3).
#[derive(Debug, Clone)]
pub struct Font {
    pub font_name: String,
    pub size: f64,
    pub weight: FontWeight,
    pub characters: HashMap<u8, String>,
    pub widths: HashMap<u8, i64>,
}

impl Font {
    /// Builds a `Font` from the operands of a `Tf` operator (`[font_key, size]`),
    /// resolving the font resource against the page's resource dictionary.
    pub fn from_tf_operands(
        page: usize,
        operands: &[Object],
        resources: &Dictionary,
        doc: &Document,
    ) -> Result<Font, ExtractionError> {
        if operands.len() != 2 {
            return Err(ExtractionError::InvalidTfOperands { page, got: operands.len() });
        }

        let font_key = operands[0]
            .as_name_str()
            .map_err(|_| ExtractionError::InvalidTfOperands { page, got: operands.len() })?;
        let size = operands[1]
            .as_float()
            .or_else(|_| operands[1].as_i64().map(|i| i as f32))
            .map_err(|_| ExtractionError::InvalidTfOperands { page, got: operands.len() })?
            as f64;

        let font_dict_ref = resources
            .get(b"Font")
            .and_then(Object::as_dict)
            .map_err(|_| ExtractionError::MalformedFontDictionary { page, entry: "Font" })?
            .get(font_key.as_bytes())
            .map_err(|_| ExtractionError::FontNotFound { page, key: font_key.to_string() })?;

        let font_dict = doc
            .get_object(
                font_dict_ref
                    .as_reference()
                    .map_err(|_| ExtractionError::MalformedFontDictionary { page, entry: "Font" })?,
            )
            .and_then(Object::as_dict)
            .map_err(|_| ExtractionError::MalformedFontDictionary { page, entry: "Font" })?;

        Self::from_dictionary(page, font_key, size, font_dict, doc)
    }

    fn from_dictionary(
        page: usize,
        font_key: &str,
        size: f64,
        font_dict: &Dictionary,
        doc: &Document,
    ) -> Result<Font, ExtractionError> {
        let base_font = font_dict
            .get(b"BaseFont")
            .and_then(Object::as_name_str)
            .unwrap_or(font_key)
            .to_string();
        let weight = FontWeight::from_font_name(&base_font);

        let first_char = font_dict
            .get(b"FirstChar")
            .and_then(Object::as_i64)
            .unwrap_or(0) as u8;
        let last_char = font_dict
            .get(b"LastChar")
            .and_then(Object::as_i64)
            .unwrap_or(255) as u8;
        let widths_array: Vec<i64> = font_dict
            .get(b"Widths")
            .and_then(Object::as_array)
            .map(|arr| {
                arr.iter()
                    .map(|o| o.as_i64().or_else(|_| o.as_float().map(|f| f as i64)).unwrap_or(0))
                    .collect()
            })
            .unwrap_or_default();

        let mut widths = HashMap::new();
        for (offset, w) in widths_array.iter().enumerate() {
            let code = first_char.wrapping_add(offset as u8);
            widths.insert(code, *w);
            if code == last_char {
                break;
            }
        }

        let cmap = get_to_unicode_cmap_from_font(font_dict, doc).ok();
        let mut characters = HashMap::new();
        for code in first_char..=last_char {
            let glyph = match &cmap {
                Some(cmap) => cmap.map_bytes(&[code]),
                None => (code as char).to_string(),
            };
            if delimiters::contains_reserved(&glyph) {
                return Err(ExtractionError::ReservedGlyphCollision { page, code });
            }
            characters.insert(code, glyph);
        }

        Ok(Font { font_name: base_font, size, weight, characters, widths })
    }

    /// `Font.decode(bytes) → (glyphs, width)` (§4.1): for each byte, append
    /// its glyph and accumulate its width (in font design units, 1/1000 em).
    pub fn decode(&self, bytes: &[u8]) -> (String, i64) {
        let mut content = String::new();
        let mut width = 0i64;
        for b in bytes {
            if let Some(glyph) = self.characters.get(b) {
                content.push_str(glyph);
            }
            width += self.widths.get(b).copied().unwrap_or(0);
        }
        (content, width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font(name: &str) -> Font {
        Font { font_name: name.into(), size: 9.0, weight: FontWeight::from_font_name(name), characters: HashMap::new(), widths: HashMap::new() }
    }

    #[test]
    fn weight_inferred_case_insensitively() {
        assert_eq!(font("Arial-Bold").weight, FontWeight::Bold);
        assert_eq!(font("Arial-BOLD").weight, FontWeight::Bold);
        assert_eq!(font("Arial-Light").weight, FontWeight::Light);
        assert_eq!(font("Arial").weight, FontWeight::Regular);
    }

    #[test]
    fn decode_sums_widths_and_concatenates_glyphs() {
        let mut f = font("Arial");
        f.characters.insert(b'A', "A".into());
        f.characters.insert(b'B', "B".into());
        f.widths.insert(b'A', 500);
        f.widths.insert(b'B', 600);
        let (content, width) = f.decode(b"AB");
        assert_eq!(content, "AB");
        assert_eq!(width, 1100);
    }
}
