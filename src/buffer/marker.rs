//! Marker: positioned annotations attached to streamed text.
//!
//! A marker records that *something* happens at a character offset in a
//! [`StreamedData`](super::StreamedData) buffer: a colour run begins, a new
//! display line starts, or a line was first seen at a wall-clock instant.
//! Markers are plain values; copying one duplicates all of its fields and
//! there is no shared ownership between buffers.
//!
//! Markers are totally ordered by `(offset, kind rank)`. The kind rank
//! resolves ties when several markers land on one offset: a timestamp opens
//! the line, then the line break itself, then the colour of the line's
//! first character.

use chrono::{DateTime, Local};

/// True-color RGB representation.
///
/// Uses 3 bytes for 24-bit color depth. The SGR lookup tables resolve the
/// classic 8-colour escape codes to these values.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create from a 24-bit hex color (e.g., 0xFF5500).
    #[inline]
    pub const fn from_u32(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    #[inline]
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

/// The kind of a marker, in tie-break order.
///
/// Declaration order is the rank order used when markers share an offset:
/// `Timestamp < NewLine < Colour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerKind {
    /// A line was first seen at this offset.
    Timestamp,
    /// The character at this offset starts a new display line.
    NewLine,
    /// A colour run begins at this offset.
    Colour,
}

impl MarkerKind {
    /// Tie-break rank for markers sharing an offset.
    pub const fn rank(self) -> u8 {
        match self {
            Self::Timestamp => 0,
            Self::NewLine => 1,
            Self::Colour => 2,
        }
    }
}

/// A positioned annotation in a streamed text buffer.
///
/// The offset is a **character** offset (not bytes) and always lies in
/// `[0, buffer length]`; an end-of-buffer marker annotates the next
/// character to arrive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// Wall-clock instant at which the line starting here was first seen.
    Timestamp {
        /// Character offset of the line's first character.
        offset: usize,
        /// Capture time.
        at: DateTime<Local>,
    },
    /// The character at `offset` starts a new display line.
    NewLine {
        /// Character offset of the new line's first character.
        offset: usize,
    },
    /// A colour run starting at `offset`.
    Colour {
        /// Character offset of the run's first character.
        offset: usize,
        /// Run colour.
        rgb: Rgb,
    },
}

impl Marker {
    /// Create a timestamp marker.
    pub const fn timestamp(offset: usize, at: DateTime<Local>) -> Self {
        Self::Timestamp { offset, at }
    }

    /// Create a new-line marker.
    pub const fn new_line(offset: usize) -> Self {
        Self::NewLine { offset }
    }

    /// Create a colour marker.
    pub const fn colour(offset: usize, rgb: Rgb) -> Self {
        Self::Colour { offset, rgb }
    }

    /// The marker's character offset.
    pub const fn offset(&self) -> usize {
        match self {
            Self::Timestamp { offset, .. }
            | Self::NewLine { offset }
            | Self::Colour { offset, .. } => *offset,
        }
    }

    /// The marker's kind.
    pub const fn kind(&self) -> MarkerKind {
        match self {
            Self::Timestamp { .. } => MarkerKind::Timestamp,
            Self::NewLine { .. } => MarkerKind::NewLine,
            Self::Colour { .. } => MarkerKind::Colour,
        }
    }

    /// Sort key: `(offset, kind rank)`.
    pub const fn sort_key(&self) -> (usize, u8) {
        (self.offset(), self.kind().rank())
    }

    /// Replace the offset, keeping the payload.
    pub fn set_offset(&mut self, new_offset: usize) {
        match self {
            Self::Timestamp { offset, .. }
            | Self::NewLine { offset }
            | Self::Colour { offset, .. } => *offset = new_offset,
        }
    }

    /// A copy of this marker at a different offset.
    pub fn with_offset(mut self, new_offset: usize) -> Self {
        self.set_offset(new_offset);
        self
    }
}
