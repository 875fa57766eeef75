//! Pipeline driver: wires the stage chain to the bounded display buffer.
//!
//! The driver owns the six stages, the persistent buffer between each pair
//! of neighbours (carry-over text withheld mid-pattern lives there between
//! chunks), the display buffer with its eviction cap, and the three output
//! taps. One call to [`Pipeline::process_chunk`] runs a full pass; chunks
//! are processed strictly in arrival order on a single thread.

use regex::Regex;
use tracing::{debug, warn};

use super::config::{PipelineConfig, StageSwitches};
use super::tap::Tap;
use crate::buffer::{CompiledPattern, Marker, PatternError, StreamedData};
use crate::stage::{
    ColourParser, ControlCharParser, FreezeGate, LineBreakParser, LineFilter, Stage,
    TimestampParser,
};

/// Display buffer state published to the display tap after each pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySnapshot {
    /// The full display text.
    pub text: String,
    /// Markers, sorted by `(offset, kind rank)`.
    pub markers: Vec<Marker>,
}

/// The RX processing pipeline.
///
/// Single-threaded by contract: chunks originating on an I/O thread must be
/// marshaled onto one processing thread (see
/// [`ChunkFeed`](super::ChunkFeed)) before entering the pipeline.
pub struct Pipeline {
    freeze: FreezeGate,
    colour: ColourParser,
    line_break: LineBreakParser,
    control: ControlCharParser,
    filter: LineFilter,
    timestamp: TimestampParser,

    /// Raw decoded text awaiting the freeze gate.
    raw: StreamedData,
    /// Released text awaiting the colour parser.
    gated: StreamedData,
    /// Colour-annotated text awaiting the line-break parser.
    coloured: StreamedData,
    /// Line-annotated text awaiting the control-char parser.
    lined: StreamedData,
    /// Control-free text awaiting the line filter.
    stripped: StreamedData,
    /// Filtered text awaiting the timestamp parser.
    filtered: StreamedData,
    /// The bounded display buffer.
    display: StreamedData,

    switches: StageSwitches,
    max_chars: usize,

    raw_tap: Tap<str>,
    display_tap: Tap<DisplaySnapshot>,
    rendered_tap: Tap<str>,
}

impl Pipeline {
    /// Create a pipeline from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if the line-break or filter pattern does not
    /// compile.
    pub fn new(config: PipelineConfig) -> Result<Self, PatternError> {
        let line_break_pattern = CompiledPattern::new(&config.line_break_pattern)?;
        let filter_pattern = if config.filter_pattern.is_empty() {
            None
        } else {
            Some(compile_filter(&config.filter_pattern)?)
        };

        let mut freeze = FreezeGate::new();
        freeze.set_frozen(config.frozen);
        let mut filter = LineFilter::new();
        filter.set_pattern(filter_pattern);

        let mut pipeline = Self {
            freeze,
            colour: ColourParser::new(),
            line_break: LineBreakParser::new(line_break_pattern),
            control: ControlCharParser::new(),
            filter,
            timestamp: TimestampParser::new(),
            raw: StreamedData::new(),
            gated: StreamedData::new(),
            coloured: StreamedData::new(),
            lined: StreamedData::new(),
            stripped: StreamedData::new(),
            filtered: StreamedData::new(),
            display: StreamedData::new(),
            switches: config.switches,
            max_chars: config.max_chars,
            raw_tap: Tap::new(),
            display_tap: Tap::new(),
            rendered_tap: Tap::new(),
        };
        pipeline.apply_switches();
        Ok(pipeline)
    }

    /// Run one full pipeline pass over a decoded chunk.
    ///
    /// Characters reach the display buffer in exact arrival order; the pass
    /// runs to completion before the call returns.
    pub fn process_chunk(&mut self, text: &str) {
        debug!(chars = text.chars().count(), "processing rx chunk");
        if !self.raw_tap.is_empty() {
            self.raw_tap.publish(text);
        }

        self.raw.append(text);
        self.freeze.process(&mut self.raw, &mut self.gated);
        self.colour.process(&mut self.gated, &mut self.coloured);
        self.line_break.process(&mut self.coloured, &mut self.lined);
        self.control.process(&mut self.lined, &mut self.stripped);
        self.filter.process(&mut self.stripped, &mut self.filtered);

        let chars_before = self.display.char_len();
        self.timestamp.process(&mut self.filtered, &mut self.display);

        let rendered = if self.rendered_tap.is_empty() {
            None
        } else {
            let start = self.display.byte_at(chars_before);
            Some(self.display.text()[start..].to_string())
        };

        if self.display.char_len() > self.max_chars {
            let excess = self.display.char_len() - self.max_chars;
            debug!(excess, "evicting oldest display characters");
            self.display.drop_prefix(excess);
        }

        if let Some(rendered) = rendered {
            if !rendered.is_empty() {
                self.rendered_tap.publish(&rendered);
            }
        }
        if !self.display_tap.is_empty() {
            let snapshot = DisplaySnapshot {
                text: self.display.text().to_string(),
                markers: self.display.markers().to_vec(),
            };
            self.display_tap.publish(&snapshot);
        }
    }

    /// The display buffer.
    pub const fn display(&self) -> &StreamedData {
        &self.display
    }

    /// The display buffer's text.
    pub fn display_text(&self) -> &str {
        self.display.text()
    }

    /// Replace the line-break pattern.
    ///
    /// On rejection the previously active pattern stays in effect. On
    /// success, per-line carry-over state (filter release flag, timestamp
    /// line-start flag) is reset; text withheld as a partial match of the
    /// old pattern is re-scanned with the new one on the next chunk.
    pub fn set_line_break_pattern(&mut self, pattern: &str) -> Result<(), PatternError> {
        match CompiledPattern::new(pattern) {
            Ok(compiled) => {
                self.line_break.set_pattern(compiled);
                self.filter.reset();
                self.timestamp.reset();
                Ok(())
            }
            Err(error) => {
                warn!(%error, "rejected line-break pattern");
                Err(error)
            }
        }
    }

    /// Replace or clear the filter pattern (empty string clears).
    ///
    /// On rejection the previously active pattern stays in effect. On
    /// success the filter's release flag is reset; retained text is
    /// re-tested with the new pattern on the next chunk.
    pub fn set_filter_pattern(&mut self, pattern: &str) -> Result<(), PatternError> {
        if pattern.is_empty() {
            self.filter.set_pattern(None);
            return Ok(());
        }
        match compile_filter(pattern) {
            Ok(regex) => {
                self.filter.set_pattern(Some(regex));
                Ok(())
            }
            Err(error) => {
                warn!(%error, "rejected filter pattern");
                Err(error)
            }
        }
    }

    /// The active stage switches.
    pub const fn switches(&self) -> StageSwitches {
        self.switches
    }

    /// Replace the stage switches. Takes effect from the next chunk;
    /// per-line carry-over state is reset.
    pub fn set_switches(&mut self, switches: StageSwitches) {
        self.switches = switches;
        self.apply_switches();
        self.filter.reset();
        self.timestamp.reset();
    }

    /// Set or clear a single stage switch.
    pub fn set_switch(&mut self, switch: StageSwitches, on: bool) {
        let mut switches = self.switches;
        switches.set(switch, on);
        self.set_switches(switches);
    }

    /// Whether the freeze gate is holding the stream back.
    pub const fn is_frozen(&self) -> bool {
        self.freeze.is_frozen()
    }

    /// Freeze or unfreeze the stream. Takes effect from the next chunk;
    /// text received while frozen is released in order on unfreeze.
    pub fn set_frozen(&mut self, frozen: bool) {
        self.freeze.set_frozen(frozen);
    }

    /// The display buffer's character cap.
    pub const fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Change the display buffer's character cap, evicting immediately if
    /// the buffer already exceeds it.
    pub fn set_max_chars(&mut self, max_chars: usize) {
        self.max_chars = max_chars;
        if self.display.char_len() > max_chars {
            let excess = self.display.char_len() - max_chars;
            debug!(excess, "evicting after cap change");
            self.display.drop_prefix(excess);
        }
    }

    /// Tap publishing each raw pre-pipeline chunk.
    pub fn raw_tap(&mut self) -> &mut Tap<str> {
        &mut self.raw_tap
    }

    /// Tap publishing the display buffer after each pass.
    pub fn display_tap(&mut self) -> &mut Tap<DisplaySnapshot> {
        &mut self.display_tap
    }

    /// Tap publishing the text newly shown by the pane on each pass.
    pub fn rendered_tap(&mut self) -> &mut Tap<str> {
        &mut self.rendered_tap
    }

    /// Discard all buffered text and markers and reset per-line state.
    pub fn clear(&mut self) {
        self.raw.clear();
        self.gated.clear();
        self.coloured.clear();
        self.lined.clear();
        self.stripped.clear();
        self.filtered.clear();
        self.display.clear();
        self.filter.reset();
        self.timestamp.reset();
    }

    fn apply_switches(&mut self) {
        self.colour
            .set_enabled(self.switches.contains(StageSwitches::COLOUR));
        self.line_break
            .set_enabled(self.switches.contains(StageSwitches::LINE_BREAK));
        self.control
            .set_enabled(self.switches.contains(StageSwitches::CONTROL_CHARS));
        self.control
            .set_replace_with_glyphs(self.switches.contains(StageSwitches::CONTROL_GLYPHS));
        self.timestamp
            .set_enabled(self.switches.contains(StageSwitches::TIMESTAMPS));
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default()).expect("default configuration is valid")
    }
}

fn compile_filter(pattern: &str) -> Result<Regex, PatternError> {
    Regex::new(pattern).map_err(|source| PatternError::Syntax {
        pattern: pattern.to_string(),
        source: Box::new(source),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{MarkerKind, Rgb};
    use std::sync::{Arc, Mutex};

    fn marker_shape(markers: &[Marker]) -> Vec<(usize, MarkerKind)> {
        markers.iter().map(|m| (m.offset(), m.kind())).collect()
    }

    #[test]
    fn test_end_to_end_default_config() {
        let mut pipeline = Pipeline::default();
        pipeline.process_chunk("hello\u{1b}[31m world\r\n");
        assert_eq!(pipeline.display_text(), "hello world");
        assert_eq!(
            marker_shape(pipeline.display().markers()),
            vec![(0, MarkerKind::Timestamp), (5, MarkerKind::Colour)]
        );
        assert_eq!(
            pipeline.display().markers()[1],
            Marker::colour(5, Rgb::new(170, 0, 0))
        );

        // The held-back line break lands with the next line's text.
        pipeline.process_chunk("next");
        assert_eq!(pipeline.display_text(), "hello worldnext");
        assert_eq!(
            marker_shape(pipeline.display().markers()),
            vec![
                (0, MarkerKind::Timestamp),
                (5, MarkerKind::Colour),
                (11, MarkerKind::Timestamp),
                (11, MarkerKind::NewLine),
            ]
        );
    }

    #[test]
    fn test_eviction_rebases_markers() {
        let mut pipeline = Pipeline::new(PipelineConfig {
            max_chars: 6,
            switches: StageSwitches::LINE_BREAK | StageSwitches::CONTROL_CHARS,
            ..PipelineConfig::default()
        })
        .unwrap();

        pipeline.process_chunk("abc\ndef\nghi");
        assert_eq!(pipeline.display_text(), "defghi");
        // Breaks were at 3 and 6; the survivors re-base by the evicted 3.
        assert_eq!(
            marker_shape(pipeline.display().markers()),
            vec![(0, MarkerKind::NewLine), (3, MarkerKind::NewLine)]
        );
    }

    #[test]
    fn test_freeze_holds_and_releases() {
        let mut pipeline = Pipeline::default();
        pipeline.set_frozen(true);
        pipeline.process_chunk("held");
        assert_eq!(pipeline.display_text(), "");

        pipeline.set_frozen(false);
        pipeline.process_chunk(" more");
        assert_eq!(pipeline.display_text(), "held more");
    }

    #[test]
    fn test_filter_through_config() {
        let mut pipeline = Pipeline::new(PipelineConfig {
            line_break_pattern: r"\r".to_string(),
            filter_pattern: "B".to_string(),
            switches: StageSwitches::LINE_BREAK,
            ..PipelineConfig::default()
        })
        .unwrap();
        pipeline.process_chunk("A\rB\rC\r");
        assert_eq!(pipeline.display_text(), "B\r");
    }

    #[test]
    fn test_token_delimiter_split_keeps_single_break() {
        let config = PipelineConfig {
            line_break_pattern: "EOL".to_string(),
            filter_pattern: "b".to_string(),
            ..PipelineConfig::default()
        };

        let mut whole = Pipeline::new(config.clone()).unwrap();
        whole.process_chunk("bbEOLcccEOLb");

        // Splitting right after the first delimiter must not leave a second
        // break marker where the dropped middle line collapsed.
        let mut split = Pipeline::new(config).unwrap();
        split.process_chunk("bbEOL");
        split.process_chunk("cccEOLb");

        assert_eq!(split.display_text(), whole.display_text());
        assert_eq!(
            marker_shape(split.display().markers()),
            marker_shape(whole.display().markers())
        );
        assert_eq!(
            marker_shape(split.display().markers()),
            vec![
                (0, MarkerKind::Timestamp),
                (5, MarkerKind::Timestamp),
                (5, MarkerKind::NewLine),
            ]
        );
    }

    #[test]
    fn test_invalid_pattern_keeps_previous() {
        let mut pipeline = Pipeline::default();
        assert!(pipeline.set_line_break_pattern("[bad").is_err());
        assert!(pipeline.set_line_break_pattern("").is_err());
        assert!(pipeline.set_filter_pattern("[bad").is_err());

        // The default "\n" pattern is still in effect.
        pipeline.process_chunk("a\nb");
        assert_eq!(
            marker_shape(pipeline.display().markers()),
            vec![
                (0, MarkerKind::Timestamp),
                (1, MarkerKind::Timestamp),
                (1, MarkerKind::NewLine),
            ]
        );
    }

    #[test]
    fn test_taps_publish() {
        let raw_seen = Arc::new(Mutex::new(String::new()));
        let rendered_seen = Arc::new(Mutex::new(String::new()));
        let snapshots = Arc::new(Mutex::new(Vec::new()));

        let mut pipeline = Pipeline::default();
        {
            let raw_seen = Arc::clone(&raw_seen);
            pipeline.raw_tap().subscribe(move |text: &str| {
                raw_seen.lock().unwrap().push_str(text);
            });
            let rendered_seen = Arc::clone(&rendered_seen);
            pipeline.rendered_tap().subscribe(move |text: &str| {
                rendered_seen.lock().unwrap().push_str(text);
            });
            let snapshots = Arc::clone(&snapshots);
            pipeline
                .display_tap()
                .subscribe(move |snapshot: &DisplaySnapshot| {
                    snapshots.lock().unwrap().push(snapshot.clone());
                });
        }

        pipeline.process_chunk("one\r\n");
        pipeline.process_chunk("two");

        assert_eq!(*raw_seen.lock().unwrap(), "one\r\ntwo");
        assert_eq!(*rendered_seen.lock().unwrap(), "onetwo");
        let snapshots = snapshots.lock().unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[1].text, "onetwo");
    }

    #[test]
    fn test_set_max_chars_evicts_immediately() {
        let mut pipeline = Pipeline::default();
        pipeline.process_chunk("0123456789");
        pipeline.set_max_chars(4);
        assert_eq!(pipeline.display_text(), "6789");
    }

    #[test]
    fn test_glyph_switch() {
        let mut pipeline = Pipeline::default();
        pipeline.set_switch(StageSwitches::CONTROL_GLYPHS, true);
        pipeline.process_chunk("abc\rdef\r");
        assert_eq!(pipeline.display_text(), "abc↵def↵");
    }

    #[test]
    fn test_clear() {
        let mut pipeline = Pipeline::default();
        pipeline.process_chunk("some text");
        pipeline.clear();
        assert_eq!(pipeline.display_text(), "");
        assert!(pipeline.display().markers().is_empty());
    }
}
