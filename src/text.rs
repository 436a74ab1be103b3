//! The shape of a `TJ` operator's array operand (§4.2).

use serde_derive::{Deserialize, Serialize};

/// One element of a `TJ` array: a byte string to show, or a spacing
/// adjustment (in thousandths of an em).
#[derive(Debug, Clone, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TextItem {
    Text(Vec<u8>),
    Offset(f64),
}

/// A trait for mapping raw character-code byte sequences to Unicode text,
/// via a font's resolved `ToUnicode` CMap.
pub trait CMap {
    fn map_bytes(&self, bytes: &[u8]) -> String;
}
