//! Control-char parser: drops control characters or swaps in visible glyphs.
//!
//! Must run strictly **after** the line-break parser, because it rewrites or
//! removes the very characters (`\r`, `\n`) the delimiter pattern depends
//! on. Markers sitting on a consumed control character are re-attached
//! ahead of whatever replaces it, so line breaks and colour runs survive the
//! rewrite. The match unit is a single character, so there is no partial
//! match to withhold.

use super::Stage;
use crate::buffer::{CompiledPattern, StreamedData};

/// Unicode control-character class.
const CONTROL_PATTERN: &str = r"\p{Cc}";

/// Fixed control-code → visible-glyph table. Unmapped codes drop silently.
const fn glyph_for(control: char) -> Option<char> {
    match control {
        '\0' => Some('␀'),
        '\u{7}' => Some('␇'),
        '\u{8}' => Some('␈'),
        '\t' => Some('␉'),
        '\n' => Some('␤'),
        '\u{b}' => Some('␋'),
        '\u{c}' => Some('␌'),
        '\r' => Some('↵'),
        '\u{1b}' => Some('␛'),
        '\u{7f}' => Some('␡'),
        _ => None,
    }
}

/// Streaming rewriter for control characters.
#[derive(Debug)]
pub struct ControlCharParser {
    pattern: CompiledPattern,
    replace_with_glyphs: bool,
    enabled: bool,
}

impl Default for ControlCharParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlCharParser {
    /// Create an enabled parser in drop mode.
    pub fn new() -> Self {
        Self {
            pattern: CompiledPattern::new(CONTROL_PATTERN)
                .expect("control pattern is valid"),
            replace_with_glyphs: false,
            enabled: true,
        }
    }

    /// Whether control characters are substituted with visible glyphs
    /// instead of dropped.
    pub const fn replaces_with_glyphs(&self) -> bool {
        self.replace_with_glyphs
    }

    /// Switch between drop mode and glyph substitution.
    pub fn set_replace_with_glyphs(&mut self, replace: bool) {
        self.replace_with_glyphs = replace;
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

impl Stage for ControlCharParser {
    fn process(&mut self, input: &mut StreamedData, output: &mut StreamedData) {
        if !self.enabled {
            output.shift_all(input);
            return;
        }

        loop {
            let Some(start) = self.pattern.regex().find(input.text()).map(|m| m.start())
            else {
                break;
            };
            let preceding_chars = input.text()[..start].chars().count();
            output.shift_prefix(input, preceding_chars);

            // The control char is now at the front. Its annotations must
            // outlive it: re-attach them ahead of the replacement.
            for marker in input.take_leading_markers() {
                output.add_marker(marker.with_offset(output.char_len()));
            }

            let control = input
                .text()
                .chars()
                .next()
                .expect("match guarantees a leading character");
            input.drop_prefix(1);

            if self.replace_with_glyphs {
                if let Some(glyph) = glyph_for(control) {
                    output.append(&glyph.to_string());
                }
            }
        }

        // Single-character matches cannot straddle a chunk boundary.
        output.shift_all(input);
    }
}
