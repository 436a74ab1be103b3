//! The six reserved glyphs injected by the extractor to preserve layout
//! structure that stock PDF text extraction throws away.

/// Terminates one serialized [`crate::text_object::TextObject`].
pub const END_OBJECT: char = '\n';
/// A horizontal gap larger than a per-font threshold inside a text object.
pub const TAB: char = '⇥';
/// The following text was emitted after, but displays to the left of, the
/// preceding text within the same text object.
pub const PRECEDES: char = '⇤';
/// An intra-object line break.
pub const RETURN: char = '↩';
/// Opens the per-object attribute suffix.
pub const ATTRIBUTES_OPEN: char = '《';
/// Closes the per-object attribute suffix.
pub const ATTRIBUTES_CLOSE: char = '》';

/// All six reserved glyphs, for membership checks.
pub const ALL: [char; 6] = [END_OBJECT, TAB, PRECEDES, RETURN, ATTRIBUTES_OPEN, ATTRIBUTES_CLOSE];

/// True if `s` contains any reserved delimiter glyph.
pub fn contains_reserved(s: &str) -> bool {
    s.chars().any(|c| ALL.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_glyphs_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for c in ALL {
            assert!(seen.insert(c), "duplicate reserved glyph {:?}", c);
        }
    }

    #[test]
    fn contains_reserved_detects_each_glyph() {
        for c in ALL {
            let s: String = format!("abc{c}def");
            assert!(contains_reserved(&s));
        }
        assert!(!contains_reserved("plain ascii text"));
    }
}
