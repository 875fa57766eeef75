//! Stage module: the six streaming transforms of the RX pipeline.
//!
//! Each stage is a long-lived object that consumes from an input buffer and
//! produces into an output buffer, carrying whatever private state it needs
//! to stay correct across arbitrary chunk boundaries (withheld partial
//! matches, open-line flags). Stages never fail: unrecognized escape codes
//! and unmapped control characters are defined silent drops.
//!
//! Pipeline order is fixed:
//! freeze → colour → line break → control chars → line filter → timestamp.

mod colour;
mod control;
mod filter;
mod freeze;
mod line_break;
mod timestamp;

pub use colour::ColourParser;
pub use control::ControlCharParser;
pub use filter::LineFilter;
pub use freeze::FreezeGate;
pub use line_break::LineBreakParser;
pub use timestamp::TimestampParser;

use crate::buffer::StreamedData;

/// A streaming transform between two buffers.
///
/// One call consumes whatever `input` holds that can safely be released and
/// appends the transformed result to `output`, withholding in `input` any
/// suffix that could still be the start of a pattern match.
pub trait Stage {
    /// Process currently buffered input into `output`.
    fn process(&mut self, input: &mut StreamedData, output: &mut StreamedData);
}
