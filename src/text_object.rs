//! `TextObject`: one finalized, serialized chunk of the page's annotated
//! text (§3, §4.2).

use crate::delimiters::{ATTRIBUTES_CLOSE, ATTRIBUTES_OPEN, END_OBJECT};
use crate::font::Font;
use crate::geometry::BoundingBox;

/// `{content, font, bounding_box}`. Invariant: once appended to a page's
/// list, `font` and `bounding_box` are set (enforced by construction here:
/// there is no `TextObject` without both).
#[derive(Debug, Clone)]
pub struct TextObject {
    pub content: String,
    pub font: Font,
    pub bounding_box: BoundingBox,
}

impl TextObject {
    pub fn new(content: String, font: Font, bounding_box: BoundingBox) -> Self {
        TextObject { content, font, bounding_box }
    }

    /// Emits `<glyphs> ATTRIBUTES_OPEN x_min|x_center|x_max|weight ATTRIBUTES_CLOSE END_OBJECT`.
    pub fn serialize(&self) -> String {
        format!(
            "{content}{open}{x_min}|{x_center}|{x_max}|{weight}{close}{end}",
            content = self.content,
            open = ATTRIBUTES_OPEN,
            x_min = self.bounding_box.x_min,
            x_center = self.bounding_box.x_center(),
            x_max = self.bounding_box.x_max(),
            weight = self.font.weight.as_attr_str(),
            close = ATTRIBUTES_CLOSE,
            end = END_OBJECT,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontWeight;
    use std::collections::HashMap;

    #[test]
    fn serialize_matches_expected_envelope() {
        let font = Font {
            font_name: "Arial".into(),
            size: 9.0,
            weight: FontWeight::Bold,
            characters: HashMap::new(),
            widths: HashMap::new(),
        };
        let bb = BoundingBox::new(10.0, 0.0, 20.0, 9.0);
        let obj = TextObject::new("Smith".into(), font, bb);
        assert_eq!(obj.serialize(), "Smith《10|20|30|bold》\n");
    }
}
