//! Timestamp parser: stamps the first character of every display line.
//!
//! Exactly one `Timestamp` marker per line, at the line's first character,
//! no matter how the line's bytes were split across chunks. The stamp is
//! only emitted once the line's first character actually arrives; an open
//! line whose text is still in flight stays unstamped until then. Line
//! boundaries come from the `NewLine` markers already in the stream (same
//! rationale as the line filter: the delimiter text may be gone by now).

use chrono::Local;

use super::Stage;
use crate::buffer::{Marker, StreamedData};

/// Streaming per-line timestamper.
#[derive(Debug)]
pub struct TimestampParser {
    next_char_is_line_start: bool,
    enabled: bool,
}

impl Default for TimestampParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampParser {
    /// Create an enabled parser positioned at a line start.
    pub fn new() -> Self {
        Self {
            next_char_is_line_start: true,
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

    /// Reset to line-start state (used when the pipeline is reconfigured).
    pub fn reset(&mut self) {
        self.next_char_is_line_start = true;
    }
}

impl Stage for TimestampParser {
    fn process(&mut self, input: &mut StreamedData, output: &mut StreamedData) {
        if !self.enabled {
            output.shift_all(input);
            return;
        }

        loop {
            // A break marker on the next character means a line starts
            // there, whether we emitted it in an earlier iteration or it
            // arrived detached from its (already consumed) delimiter text.
            if input.has_leading_new_line() {
                self.next_char_is_line_start = true;
            }

            match input.first_line_boundary() {
                Some(boundary) => {
                    if self.next_char_is_line_start {
                        output.add_marker(Marker::timestamp(output.char_len(), Local::now()));
                    }
                    output.shift_prefix(input, boundary);
                    self.next_char_is_line_start = true;
                }
                None => {
                    if !input.is_empty() {
                        if self.next_char_is_line_start {
                            output
                                .add_marker(Marker::timestamp(output.char_len(), Local::now()));
                            self.next_char_is_line_start = false;
                        }
                        output.shift_all(input);
                    }
                    return;
                }
            }
        }
    }
}
