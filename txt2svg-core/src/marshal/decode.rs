//! Decoding of the output region after a generate call.

/// How the output of a generate call was located.
///
/// The entry point signals its output two ways: it NUL-terminates the bytes
/// when there is room, and it returns the number of bytes written. A
/// terminator wins when present; the returned length is only consulted when
/// the buffer holds no terminator at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedOutput {
    /// A terminator was found inside the output region.
    Terminated(String),
    /// No terminator; the returned length bounded the output.
    LengthBound {
        /// The decoded output.
        svg: String,
        /// The output filled the whole region, so it may have been cut short.
        truncated: bool,
    },
    /// No terminator and a non-positive result length.
    Empty,
}

impl DecodedOutput {
    /// Decode the output region given the entry point's return value.
    ///
    /// Invalid UTF-8 is replaced with U+FFFD rather than rejected.
    pub fn decode(region: &[u8], result_length: i32) -> Self {
        if let Some(end) = region.iter().position(|&b| b == 0) {
            return Self::Terminated(String::from_utf8_lossy(&region[..end]).into_owned());
        }

        if result_length > 0 {
            let claimed = result_length as usize;
            let len = claimed.min(region.len());
            return Self::LengthBound {
                svg: String::from_utf8_lossy(&region[..len]).into_owned(),
                truncated: claimed >= region.len(),
            };
        }

        Self::Empty
    }

    /// Get the decoded text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Terminated(svg) | Self::LengthBound { svg, .. } => svg,
            Self::Empty => "",
        }
    }

    /// Consume and return the decoded text.
    pub fn into_string(self) -> String {
        match self {
            Self::Terminated(svg) | Self::LengthBound { svg, .. } => svg,
            Self::Empty => String::new(),
        }
    }

    /// Check if no output was produced.
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    /// Check if the output may have been cut at the region boundary.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::LengthBound { truncated: true, .. })
    }

    /// Short name of the decode path, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Terminated(_) => "terminated",
            Self::LengthBound { .. } => "length_bound",
            Self::Empty => "empty",
        }
    }
}
