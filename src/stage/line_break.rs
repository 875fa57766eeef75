//! Line-break parser: turns delimiter matches into `NewLine` markers.
//!
//! The delimiter is a user-configurable regex (`"\r\n"`, `"\n"`, or an
//! arbitrary token like `"EOL"`). Matched delimiter text is transferred
//! unchanged — the control-char stage downstream decides whether it stays
//! visible — and a `NewLine` marker is emitted at the output offset right
//! after the match, i.e. where the next line's first character will land.

use super::Stage;
use crate::buffer::{CompiledPattern, Marker, StreamedData};

/// Streaming parser for the configured line-break pattern.
#[derive(Debug)]
pub struct LineBreakParser {
    pattern: CompiledPattern,
    enabled: bool,
}

impl LineBreakParser {
    /// Create an enabled parser with the given compiled delimiter pattern.
    pub fn new(pattern: CompiledPattern) -> Self {
        Self {
            pattern,
            enabled: true,
        }
    }

    /// The active delimiter pattern.
    pub const fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// Swap in a new delimiter pattern.
    ///
    /// Text withheld as a partial match of the old pattern is re-scanned
    /// with the new one on the next chunk.
    pub fn set_pattern(&mut self, pattern: CompiledPattern) {
        self.pattern = pattern;
    }

    /// Whether the parser is active. Disabled means pure passthrough.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the parser. Takes effect from the next chunk.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl Stage for LineBreakParser {
    fn process(&mut self, input: &mut StreamedData, output: &mut StreamedData) {
        if !self.enabled {
            output.shift_all(input);
            return;
        }

        loop {
            let Some(end) = self.pattern.regex().find(input.text()).map(|m| m.end()) else {
                break;
            };
            let end_chars = input.text()[..end].chars().count();
            if end_chars == 0 {
                // Zero-width match; empty patterns are rejected at
                // configuration time, but stay safe against lookarounds.
                break;
            }
            output.shift_prefix(input, end_chars);
            output.add_marker(Marker::new_line(output.char_len()));
        }

        output.shift_until_partial_match(input, &self.pattern);
    }
}
