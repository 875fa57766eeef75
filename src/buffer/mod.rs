//! Buffer module: annotated streamed text and its transfer primitives.
//!
//! This module contains:
//! - [`StreamedData`]: an append-only character buffer with an ordered
//!   marker list and chunk-safe prefix transfers
//! - [`Marker`]: positioned annotations (colour run, line break, timestamp)
//! - [`Rgb`]: true-color representation
//! - [`CompiledPattern`]: user patterns compiled for resumable streaming
//!   scans

mod marker;
mod pattern;
mod streamed;

pub use marker::{Marker, MarkerKind, Rgb};
pub use pattern::{CompiledPattern, PatternError};
pub use streamed::StreamedData;
