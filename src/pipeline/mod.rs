//! Pipeline module: driver, configuration, taps, and chunk marshaling.
//!
//! This module contains:
//! - [`Pipeline`]: runs the six-stage chain into the bounded display buffer
//! - [`PipelineConfig`] / [`StageSwitches`]: construction-time and runtime
//!   configuration
//! - [`Tap`] / [`DisplaySnapshot`]: named publish points for renderers and
//!   loggers
//! - [`ChunkFeed`] / [`ChunkSender`]: lock-free hand-off from an I/O thread
//!   to the processing thread

mod config;
mod driver;
mod feed;
mod tap;

pub use config::{PipelineConfig, StageSwitches};
pub use driver::{DisplaySnapshot, Pipeline};
pub use feed::{ChunkFeed, ChunkSender};
pub use tap::Tap;
