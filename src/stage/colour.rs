//! Colour-escape parser: the ANSI SGR colour subset.
//!
//! Recognizes `ESC '[' digits (';' digits)* 'm'` sequences, consumes them
//! from the stream, and queues the resolved colour on the output buffer so
//! a `Colour` marker lands on the first character of the newly coloured
//! run — even when that character arrives in a later chunk. Only the
//! classic 8-colour codes `30..=37` are modeled, with the bold-intensity
//! table selected by a second `1` parameter. Anything else the pattern
//! matches is discarded without a marker; that is defined behavior, not an
//! error.

use super::Stage;
use crate::buffer::{CompiledPattern, Rgb, StreamedData};

/// `ESC '[' digits (';' digits)* 'm'`.
const ESCAPE_PATTERN: &str = r"\x1b\[\d+(?:;\d+)*m";

/// Normal-intensity colours for SGR codes 30..=37 (VGA palette).
const NORMAL_COLOURS: [Rgb; 8] = [
    Rgb::new(0, 0, 0),
    Rgb::new(170, 0, 0),
    Rgb::new(0, 170, 0),
    Rgb::new(170, 85, 0),
    Rgb::new(0, 0, 170),
    Rgb::new(170, 0, 170),
    Rgb::new(0, 170, 170),
    Rgb::new(170, 170, 170),
];

/// Bold-intensity colours for SGR codes 30..=37 with a `1` parameter.
const BOLD_COLOURS: [Rgb; 8] = [
    Rgb::new(85, 85, 85),
    Rgb::new(255, 85, 85),
    Rgb::new(85, 255, 85),
    Rgb::new(255, 255, 85),
    Rgb::new(85, 85, 255),
    Rgb::new(255, 85, 255),
    Rgb::new(85, 255, 255),
    Rgb::new(255, 255, 255),
];

/// Streaming parser for the SGR colour escape subset.
#[derive(Debug)]
pub struct ColourParser {
    pattern: CompiledPattern,
    enabled: bool,
}

impl Default for ColourParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ColourParser {
    /// Create an enabled parser.
    pub fn new() -> Self {
        Self {
            pattern: CompiledPattern::new(ESCAPE_PATTERN)
                .expect("escape pattern is valid"),
            enabled: true,
        }
    }

    /// Whether the parser is active. Disabled means pure passthrough.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the parser. Takes effect from the next chunk.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Resolve a full escape sequence to a colour, or `None` if the code
    /// combination is not in the modeled subset.
    fn resolve(sequence: &str) -> Option<Rgb> {
        let body = sequence.strip_prefix("\u{1b}[")?.strip_suffix('m')?;
        let mut params = body.split(';');
        let first: usize = params.next()?.parse().ok()?;
        if !(30..=37).contains(&first) {
            return None;
        }
        let index = first - 30;
        match (params.next(), params.next()) {
            (None, _) => Some(NORMAL_COLOURS[index]),
            (Some("1"), None) => Some(BOLD_COLOURS[index]),
            _ => None,
        }
    }
}

impl Stage for ColourParser {
    fn process(&mut self, input: &mut StreamedData, output: &mut StreamedData) {
        if !self.enabled {
            output.shift_all(input);
            return;
        }

        loop {
            let Some((start, end)) = self
                .pattern
                .regex()
                .find(input.text())
                .map(|m| (m.start(), m.end()))
            else {
                break;
            };

            let preceding_chars = input.text()[..start].chars().count();
            let sequence_chars = input.text()[start..end].chars().count();
            let colour = Self::resolve(&input.text()[start..end]);

            output.shift_prefix(input, preceding_chars);
            // The escape itself never reaches the display.
            input.drop_prefix(sequence_chars);

            if let Some(rgb) = colour {
                output.set_pending_colour(rgb);
            }
        }

        output.shift_until_partial_match(input, &self.pattern);
    }
}
