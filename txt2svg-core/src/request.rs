//! Render request types and input normalization.

use std::fmt;

/// Text rendered when the request carries none.
pub const DEFAULT_TEXT: &str = "Hello World";

/// Font key used when the request carries none.
pub const DEFAULT_FONT: &str = "roboto";

/// Fill color used when the request carries none.
pub const DEFAULT_COLOR: &str = "#000000";

/// Marker every encoded color starts with.
const COLOR_MARKER: char = '#';

/// A fill color, normalized to carry exactly one leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Color(String);

impl Color {
    /// Normalize a raw color value.
    ///
    /// The marker is prepended only when absent, so `"ff0000"` and
    /// `"#ff0000"` normalize to the same value.
    pub fn normalize(raw: &str) -> Self {
        if raw.starts_with(COLOR_MARKER) {
            Self(raw.to_string())
        } else {
            let mut value = String::with_capacity(raw.len() + 1);
            value.push(COLOR_MARKER);
            value.push_str(raw);
            Self(value)
        }
    }

    /// Get the normalized color string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self(DEFAULT_COLOR.to_string())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fully-defaulted render request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Text to render.
    pub text: String,
    /// Lowercased font selector; not yet validated against the catalog.
    pub font_key: String,
    /// Normalized fill color.
    pub color: Color,
}

impl RenderRequest {
    /// Build a request from optional raw inputs.
    ///
    /// Missing and empty values both fall back to the defaults. Text and
    /// color reach the module as NUL-terminated strings, so NUL characters
    /// are stripped from them first; a value that was only NULs counts as
    /// empty.
    pub fn from_parts(text: Option<&str>, font: Option<&str>, color: Option<&str>) -> Self {
        let text = non_empty(text.map(strip_nul)).unwrap_or_else(|| DEFAULT_TEXT.to_string());
        let font = font.filter(|f| !f.is_empty()).unwrap_or(DEFAULT_FONT);
        let color = non_empty(color.map(strip_nul)).unwrap_or_else(|| DEFAULT_COLOR.to_string());

        Self {
            text,
            font_key: font.to_lowercase(),
            color: Color::normalize(&color),
        }
    }

    /// Set the text. NUL characters are stripped.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = if text.contains('\0') {
            strip_nul(&text)
        } else {
            text
        };
        self
    }

    /// Set the font key (lowercased).
    pub fn with_font(mut self, font: &str) -> Self {
        self.font_key = font.to_lowercase();
        self
    }

    /// Set the color (normalized, NUL characters stripped).
    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Color::normalize(&strip_nul(color));
        self
    }
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self::from_parts(None, None, None)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn strip_nul(value: &str) -> String {
    value.replace('\0', "")
}
