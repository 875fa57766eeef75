//! Line filter: retains only lines matching a user regex.
//!
//! Lines are delimited by the `NewLine` markers the line-break parser
//! emitted, not by re-matching delimiter text — the control stage upstream
//! may already have dropped or substituted the delimiter characters. A line
//! is tested once; if it matches while still unterminated, the rest of it
//! is released unconditionally as it arrives (`release_on_current_line`).
//! An unterminated non-matching fragment is retained for re-testing once
//! more of the line shows up.

use regex::Regex;

use super::Stage;
use crate::buffer::StreamedData;

/// Streaming per-line filter.
///
/// `None` pattern means no filtering (pure passthrough); the pipeline maps
/// an empty pattern string to `None` before it ever reaches this stage.
#[derive(Debug, Default)]
pub struct LineFilter {
    pattern: Option<Regex>,
    release_on_current_line: bool,
}

impl LineFilter {
    /// Create a filter with no pattern (passthrough).
    pub fn new() -> Self {
        Self::default()
    }

    /// The active filter pattern, if any.
    pub const fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    /// Install or clear the filter pattern and reset carry-over state.
    ///
    /// Retained text from an earlier pattern is re-tested with the new one
    /// on the next chunk.
    pub fn set_pattern(&mut self, pattern: Option<Regex>) {
        self.pattern = pattern;
        self.release_on_current_line = false;
    }

    /// Reset carry-over state (used when the pipeline is reconfigured).
    pub fn reset(&mut self) {
        self.release_on_current_line = false;
    }
}

impl Stage for LineFilter {
    fn process(&mut self, input: &mut StreamedData, output: &mut StreamedData) {
        let Some(pattern) = self.pattern.clone() else {
            output.shift_all(input);
            return;
        };

        loop {
            if self.release_on_current_line {
                // The open line already matched; forward it without
                // re-testing until its terminator arrives. A break on the
                // next character means the line closed with no further
                // text; the marker stays put and travels with whatever
                // follows it, the same as any boundary between two tested
                // lines: out with a kept line, gone with a dropped one.
                if input.has_leading_new_line() {
                    self.release_on_current_line = false;
                    continue;
                }
                match input.first_line_boundary() {
                    Some(boundary) => {
                        output.shift_prefix(input, boundary);
                        self.release_on_current_line = false;
                    }
                    None => {
                        output.shift_all(input);
                        return;
                    }
                }
                continue;
            }

            match input.first_line_boundary() {
                Some(boundary) => {
                    let line_end = input.byte_at(boundary);
                    if pattern.is_match(&input.text()[..line_end]) {
                        output.shift_prefix(input, boundary);
                    } else {
                        input.drop_prefix(boundary);
                    }
                }
                None => {
                    if !input.is_empty() && pattern.is_match(input.text()) {
                        output.shift_all(input);
                        self.release_on_current_line = true;
                    }
                    // A non-matching unterminated fragment stays buffered
                    // for re-testing when more of the line arrives.
                    return;
                }
            }
        }
    }
}
