//! # rxpipe
//!
//! A chunk-invariant streaming text pipeline for serial terminal displays.
//!
//! rxpipe turns an unbounded stream of decoded RX text — arriving in
//! arbitrary, unpredictable chunks, including mid-escape-sequence or
//! mid-line — into a bounded display buffer annotated with markers (colour
//! runs, line breaks, timestamps) at exact character offsets.
//!
//! ## Core Concepts
//!
//! - **Chunk-boundary invariance**: feeding a stream in any chunking yields
//!   the same display text and markers as feeding it whole
//! - **Markers**: annotations that travel with their characters through
//!   every transfer, re-based automatically
//! - **Stage chain**: freeze gate, SGR colour parser, line-break parser,
//!   control-char parser, line filter, timestamp parser — each resumable
//!   across chunk boundaries
//! - **Bounded display**: oldest characters (and their markers) are evicted
//!   once a configurable cap is exceeded
//!
//! ## Example
//!
//! ```rust
//! use rxpipe::Pipeline;
//!
//! let mut pipeline = Pipeline::default();
//! pipeline.process_chunk("boot ok\r\n");
//! assert_eq!(pipeline.display_text(), "boot ok");
//! ```

pub mod buffer;
pub mod pipeline;
pub mod stage;

// Re-exports for convenience
pub use buffer::{CompiledPattern, Marker, MarkerKind, PatternError, Rgb, StreamedData};
pub use pipeline::{
    ChunkFeed, ChunkSender, DisplaySnapshot, Pipeline, PipelineConfig, StageSwitches, Tap,
};
pub use stage::{
    ColourParser, ControlCharParser, FreezeGate, LineBreakParser, LineFilter, Stage,
    TimestampParser,
};
