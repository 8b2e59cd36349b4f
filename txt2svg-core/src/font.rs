//! The closed set of supported fonts.

use crate::error::{Result, Txt2SvgError};
use std::fmt;

/// Directory, relative to the asset store root, that holds font files.
pub const FONT_DIR: &str = "fonts";

/// A supported font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontKey {
    /// Roboto (the default).
    #[default]
    Roboto,
    /// Wendy One.
    WendyOne,
    /// Alfa Slab One.
    AlfaSlabOne,
}

impl FontKey {
    /// Every supported font, in catalog order.
    pub const ALL: [FontKey; 3] = [Self::Roboto, Self::WendyOne, Self::AlfaSlabOne];

    /// Resolve a selector, case-insensitively.
    ///
    /// Unknown selectors produce `UnsupportedFont` carrying the lowercased
    /// key, which is what the client sees in the error message.
    pub fn parse(selector: &str) -> Result<Self> {
        let key = selector.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|font| font.as_str() == key)
            .ok_or(Txt2SvgError::UnsupportedFont { key })
    }

    /// Get the canonical lowercase selector.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Roboto => "roboto",
            Self::WendyOne => "wendyone",
            Self::AlfaSlabOne => "alfaslabone",
        }
    }

    /// Get the font's file name inside [`FONT_DIR`].
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Roboto => "Roboto.ttf",
            Self::WendyOne => "WendyOne.ttf",
            Self::AlfaSlabOne => "AlfaSlabOne.ttf",
        }
    }

    /// Get the store-relative path of the font asset.
    pub fn asset_path(self) -> String {
        format!("{}/{}", FONT_DIR, self.file_name())
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
