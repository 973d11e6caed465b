//! CSS property parsers organized by category.
//!
//! Each submodule reads its longhands from the winning declarations and
//! writes the typed values. Unparsable values leave the field untouched.

pub mod colors;
pub mod dimensions;
pub mod edges;
pub mod layout;
pub mod typography;

/// ASCII-lowercased, trimmed keyword.
pub fn keyword(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}
