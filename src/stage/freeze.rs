//! Freeze gate: holds the stream back while the display is frozen.

use super::Stage;
use crate::buffer::StreamedData;

/// Pass-through gate at the head of the pipeline.
///
/// While frozen, input is retained in full for later; unbounded growth of
/// the upstream buffer is the accepted trade-off for not losing data.
#[derive(Debug, Default)]
pub struct FreezeGate {
    frozen: bool,
}

impl FreezeGate {
    /// Create an unfrozen gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the gate is currently frozen.
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freeze or unfreeze the gate. Takes effect from the next chunk.
    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }
}

impl Stage for FreezeGate {
    fn process(&mut self, input: &mut StreamedData, output: &mut StreamedData) {
        if self.frozen {
            return;
        }
        output.shift_all(input);
    }
}
