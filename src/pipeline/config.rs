//! Pipeline configuration.

use bitflags::bitflags;

bitflags! {
    /// Enable switches for the optional pipeline stages.
    ///
    /// These can be combined using bitwise OR.
    ///
    /// # Example
    /// ```
    /// use rxpipe::StageSwitches;
    /// let switches = StageSwitches::COLOUR | StageSwitches::LINE_BREAK;
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StageSwitches: u8 {
        /// Parse ANSI SGR colour escapes into colour markers.
        const COLOUR = 0b0000_0001;
        /// Parse the configured line-break pattern into new-line markers.
        const LINE_BREAK = 0b0000_0010;
        /// Consume control characters (drop or substitute).
        const CONTROL_CHARS = 0b0000_0100;
        /// Substitute consumed control characters with visible glyphs.
        const CONTROL_GLYPHS = 0b0000_1000;
        /// Stamp the first character of every line.
        const TIMESTAMPS = 0b0001_0000;
    }
}

impl Default for StageSwitches {
    /// Colour, line-break, control-char and timestamp stages on; glyph
    /// substitution off.
    fn default() -> Self {
        Self::COLOUR | Self::LINE_BREAK | Self::CONTROL_CHARS | Self::TIMESTAMPS
    }
}

/// Construction-time settings for a [`Pipeline`](super::Pipeline).
///
/// Everything here can also be changed between chunks through the runtime
/// setters on the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Regex delimiting display lines.
    pub line_break_pattern: String,
    /// Regex a line must match to be retained; empty means no filtering.
    pub filter_pattern: String,
    /// Which optional stages are active.
    pub switches: StageSwitches,
    /// Maximum character count of the display buffer.
    pub max_chars: usize,
    /// Whether the pipeline starts frozen.
    pub frozen: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            line_break_pattern: "\n".to_string(),
            filter_pattern: String::new(),
            switches: StageSwitches::default(),
            max_chars: 50_000,
            frozen: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_switches() {
        let switches = StageSwitches::default();
        assert!(switches.contains(StageSwitches::COLOUR));
        assert!(switches.contains(StageSwitches::LINE_BREAK));
        assert!(switches.contains(StageSwitches::CONTROL_CHARS));
        assert!(switches.contains(StageSwitches::TIMESTAMPS));
        assert!(!switches.contains(StageSwitches::CONTROL_GLYPHS));
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.line_break_pattern, "\n");
        assert!(config.filter_pattern.is_empty());
        assert!(!config.frozen);
    }
}
