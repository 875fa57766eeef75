//! `StreamedData`: an annotated, append-only text buffer and the transfer
//! primitives every pipeline stage is built from.
//!
//! A buffer owns its text, its ordered marker list, and one piece of pending
//! state: a colour waiting to attach to the next appended character. Offsets
//! are **character** offsets; markers always lie in `[0, length]` and stay
//! sorted by `(offset, kind rank)`.
//!
//! Transfers move a prefix of characters from one buffer to another, taking
//! the markers that fall inside the prefix along and re-basing the rest, so
//! annotations stay glued to their characters no matter how the stream was
//! chunked.

use super::marker::{Marker, MarkerKind, Rgb};
use super::pattern::CompiledPattern;

/// An annotated text buffer with chunk-safe transfer primitives.
#[derive(Debug, Default)]
pub struct StreamedData {
    /// Owned text. Grows by append, shrinks from the front by transfer or
    /// eviction.
    text: String,
    /// Cached character count of `text`.
    char_count: usize,
    /// Markers, sorted ascending by `(offset, kind rank)`.
    markers: Vec<Marker>,
    /// Colour to attach to the next character that lands in this buffer.
    pending_colour: Option<Rgb>,
}

impl StreamedData {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The buffer text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of characters in the buffer.
    pub const fn char_len(&self) -> usize {
        self.char_count
    }

    /// Whether the buffer holds no characters.
    pub const fn is_empty(&self) -> bool {
        self.char_count == 0
    }

    /// The markers, sorted by `(offset, kind rank)`.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Queue a colour to attach to the next character that lands here.
    ///
    /// A later queued colour replaces an earlier one that never saw a
    /// character.
    pub fn set_pending_colour(&mut self, rgb: Rgb) {
        self.pending_colour = Some(rgb);
    }

    /// The queued colour, if any.
    pub const fn pending_colour(&self) -> Option<Rgb> {
        self.pending_colour
    }

    /// Discard all text, markers, and pending state.
    pub fn clear(&mut self) {
        self.text.clear();
        self.char_count = 0;
        self.markers.clear();
        self.pending_colour = None;
    }

    /// Append text to the end of the buffer.
    ///
    /// If a colour is pending and at least one character is appended, a
    /// `Colour` marker is emitted at the first appended character and the
    /// pending colour is cleared.
    pub fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.materialize_pending_colour();
        self.text.push_str(text);
        self.char_count += text.chars().count();
    }

    /// Insert a marker, keeping the list sorted.
    ///
    /// Insertion is stable: a marker with an already-present `(offset, kind)`
    /// key lands after its equals.
    pub fn add_marker(&mut self, marker: Marker) {
        debug_assert!(
            marker.offset() <= self.char_count,
            "marker offset {} out of range 0..={}",
            marker.offset(),
            self.char_count
        );
        let key = marker.sort_key();
        let index = self.markers.partition_point(|m| m.sort_key() <= key);
        self.markers.insert(index, marker);
    }

    /// Move the first `n` characters of `source` to the end of this buffer.
    ///
    /// Markers of `source` at offsets `< n` move along, re-based onto this
    /// buffer; the rest stay in `source`, re-based by `-n`. If a colour is
    /// pending here and `n > 0`, it materializes at the insert point first.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the number of characters in `source`; that can
    /// only happen from a stage logic defect, never from stream input.
    pub fn shift_prefix(&mut self, source: &mut Self, n: usize) {
        assert!(
            n <= source.char_count,
            "shift_prefix: requested {n} chars, source holds {}",
            source.char_count
        );
        if n == 0 {
            return;
        }

        let base = self.char_count;
        self.materialize_pending_colour();

        let split = source.byte_at(n);
        self.text.push_str(&source.text[..split]);
        source.text.replace_range(..split, "");
        self.char_count += n;
        source.char_count -= n;

        let mut retained = Vec::with_capacity(source.markers.len());
        for marker in source.markers.drain(..) {
            let offset = marker.offset();
            if offset < n {
                self.add_marker(marker.with_offset(base + offset));
            } else {
                retained.push(marker.with_offset(offset - n));
            }
        }
        source.markers = retained;
    }

    /// Move everything `source` holds to the end of this buffer.
    ///
    /// A `NewLine` at the very end of `source` describes the boundary after
    /// the text being transferred, so it travels along and lands at the end
    /// of this buffer. Markers of other kinds at the end annotate a
    /// character that has not arrived yet and stay behind.
    pub fn shift_all(&mut self, source: &mut Self) {
        self.shift_prefix(source, source.char_count);
        if source.markers.is_empty() {
            return;
        }
        let end = self.char_count;
        let mut retained = Vec::new();
        for marker in source.markers.drain(..) {
            if marker.kind() == MarkerKind::NewLine {
                self.add_marker(marker.with_offset(end));
            } else {
                retained.push(marker);
            }
        }
        source.markers = retained;
    }

    /// Move the maximal prefix of `source` that cannot be part of a future
    /// match of `pattern`, withholding exactly the shortest suffix that is
    /// still a viable match prefix.
    pub fn shift_until_partial_match(&mut self, source: &mut Self, pattern: &CompiledPattern) {
        let releasable = pattern
            .partial_match_start(&source.text)
            .unwrap_or(source.char_count);
        self.shift_prefix(source, releasable);
    }

    /// Discard the first `n` characters without transferring them.
    ///
    /// Markers at offsets `< n` are discarded with them; the rest are
    /// re-based by `-n`.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the buffer length; that can only happen from a
    /// stage logic defect, never from stream input.
    pub fn drop_prefix(&mut self, n: usize) {
        assert!(
            n <= self.char_count,
            "drop_prefix: requested {n} chars, buffer holds {}",
            self.char_count
        );
        if n == 0 {
            return;
        }
        let split = self.byte_at(n);
        self.text.replace_range(..split, "");
        self.char_count -= n;
        self.markers.retain_mut(|marker| {
            let offset = marker.offset();
            if offset < n {
                false
            } else {
                marker.set_offset(offset - n);
                true
            }
        });
    }

    /// Remove and return every marker sitting at offset 0.
    ///
    /// Used when the character those markers annotate is about to be dropped
    /// or substituted: the annotations must outlive it.
    pub fn take_leading_markers(&mut self) -> Vec<Marker> {
        let cut = self.markers.partition_point(|m| m.offset() == 0);
        self.markers.drain(..cut).collect()
    }

    /// Offset of the first `NewLine` marker at an offset greater than zero,
    /// i.e. the exclusive end of the current first line.
    pub fn first_line_boundary(&self) -> Option<usize> {
        self.markers.iter().find_map(|m| match m {
            Marker::NewLine { offset } if *offset > 0 => Some(*offset),
            _ => None,
        })
    }

    /// Whether a `NewLine` marker sits at offset 0 (the next character to
    /// arrive starts a new line).
    pub fn has_leading_new_line(&self) -> bool {
        self.markers
            .iter()
            .take_while(|m| m.offset() == 0)
            .any(|m| matches!(m, Marker::NewLine { .. }))
    }

    /// Byte offset of character `char_offset`, for slicing `text`.
    pub(crate) fn byte_at(&self, char_offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_offset)
            .map_or(self.text.len(), |(byte, _)| byte)
    }

    fn materialize_pending_colour(&mut self) {
        if let Some(rgb) = self.pending_colour.take() {
            self.add_marker(Marker::colour(self.char_count, rgb));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MarkerKind;
    use chrono::Local;

    fn assert_sorted(buffer: &StreamedData) {
        let keys: Vec<_> = buffer.markers().iter().map(Marker::sort_key).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
        for marker in buffer.markers() {
            assert!(marker.offset() <= buffer.char_len());
        }
    }

    #[test]
    fn test_append_counts_chars() {
        let mut buf = StreamedData::new();
        buf.append("abc");
        buf.append("↵␤");
        assert_eq!(buf.char_len(), 5);
        assert_eq!(buf.text(), "abc↵␤");
    }

    #[test]
    fn test_pending_colour_attaches_to_next_append() {
        let mut buf = StreamedData::new();
        buf.append("abc");
        buf.set_pending_colour(Rgb::new(170, 0, 0));
        assert!(buf.markers().is_empty());
        buf.append("red");
        assert_eq!(buf.markers(), &[Marker::colour(3, Rgb::new(170, 0, 0))]);
        assert!(buf.pending_colour().is_none());
    }

    #[test]
    fn test_pending_colour_last_write_wins() {
        let mut buf = StreamedData::new();
        buf.set_pending_colour(Rgb::new(170, 0, 0));
        buf.set_pending_colour(Rgb::new(0, 170, 0));
        buf.append("x");
        assert_eq!(buf.markers(), &[Marker::colour(0, Rgb::new(0, 170, 0))]);
    }

    #[test]
    fn test_add_marker_keeps_order() {
        let mut buf = StreamedData::new();
        buf.append("abcdef");
        buf.add_marker(Marker::colour(4, Rgb::new(1, 1, 1)));
        buf.add_marker(Marker::new_line(2));
        buf.add_marker(Marker::timestamp(4, Local::now()));
        assert_sorted(&buf);
        assert_eq!(buf.markers()[0].offset(), 2);
        assert_eq!(buf.markers()[1].kind(), MarkerKind::Timestamp);
        assert_eq!(buf.markers()[2].kind(), MarkerKind::Colour);
    }

    #[test]
    fn test_shift_prefix_moves_text_and_markers() {
        let mut src = StreamedData::new();
        src.append("hello world");
        src.add_marker(Marker::new_line(3));
        src.add_marker(Marker::colour(8, Rgb::new(9, 9, 9)));

        let mut dst = StreamedData::new();
        dst.append("XY");
        dst.shift_prefix(&mut src, 5);

        assert_eq!(dst.text(), "XYhello");
        assert_eq!(src.text(), " world");
        // Marker at 3 moved, re-based onto dst; marker at 8 stayed, re-based.
        assert_eq!(dst.markers(), &[Marker::new_line(5)]);
        assert_eq!(src.markers(), &[Marker::colour(3, Rgb::new(9, 9, 9))]);
        assert_sorted(&dst);
        assert_sorted(&src);
    }

    #[test]
    fn test_shift_prefix_marker_at_split_stays() {
        let mut src = StreamedData::new();
        src.append("abcd");
        src.add_marker(Marker::new_line(2));
        let mut dst = StreamedData::new();
        dst.shift_prefix(&mut src, 2);
        // The marker at the split names the boundary before "cd": it stays.
        assert_eq!(dst.text(), "ab");
        assert!(dst.markers().is_empty());
        assert_eq!(src.markers(), &[Marker::new_line(0)]);
    }

    #[test]
    fn test_shift_all_carries_end_new_line() {
        let mut src = StreamedData::new();
        src.append("ab");
        src.add_marker(Marker::new_line(2));
        let mut dst = StreamedData::new();
        dst.append("x");
        dst.shift_all(&mut src);
        // A full transfer takes the trailing boundary with its text.
        assert_eq!(dst.text(), "xab");
        assert_eq!(dst.markers(), &[Marker::new_line(3)]);
        assert!(src.markers().is_empty());
    }

    #[test]
    fn test_shift_all_carries_bare_new_line() {
        let mut src = StreamedData::new();
        src.add_marker(Marker::new_line(0));
        let mut dst = StreamedData::new();
        dst.append("ab");
        dst.shift_all(&mut src);
        assert_eq!(dst.markers(), &[Marker::new_line(2)]);
        assert!(src.markers().is_empty());
    }

    #[test]
    fn test_shift_prefix_materializes_pending_colour_first() {
        let mut src = StreamedData::new();
        src.append("red");
        let mut dst = StreamedData::new();
        dst.append("default");
        dst.set_pending_colour(Rgb::new(170, 0, 0));
        dst.shift_all(&mut src);
        assert_eq!(dst.text(), "defaultred");
        assert_eq!(dst.markers(), &[Marker::colour(7, Rgb::new(170, 0, 0))]);
    }

    #[test]
    #[should_panic(expected = "shift_prefix")]
    fn test_shift_prefix_out_of_range_panics() {
        let mut src = StreamedData::new();
        src.append("ab");
        let mut dst = StreamedData::new();
        dst.shift_prefix(&mut src, 3);
    }

    #[test]
    fn test_drop_prefix_rebases_and_discards() {
        let mut buf = StreamedData::new();
        buf.append("0123456789");
        buf.add_marker(Marker::new_line(2));
        buf.add_marker(Marker::new_line(4));
        buf.add_marker(Marker::colour(7, Rgb::new(5, 5, 5)));

        buf.drop_prefix(4);
        assert_eq!(buf.text(), "456789");
        assert_eq!(
            buf.markers(),
            &[Marker::new_line(0), Marker::colour(3, Rgb::new(5, 5, 5))]
        );
        assert_sorted(&buf);
    }

    #[test]
    #[should_panic(expected = "drop_prefix")]
    fn test_drop_prefix_out_of_range_panics() {
        let mut buf = StreamedData::new();
        buf.append("ab");
        buf.drop_prefix(3);
    }

    #[test]
    fn test_shift_until_partial_match_withholds_tail() {
        let pattern = CompiledPattern::new(r"\r\n").unwrap();
        let mut src = StreamedData::new();
        src.append("abc\r");
        let mut dst = StreamedData::new();
        dst.shift_until_partial_match(&mut src, &pattern);
        assert_eq!(dst.text(), "abc");
        assert_eq!(src.text(), "\r");
    }

    #[test]
    fn test_shift_until_partial_match_releases_everything() {
        let pattern = CompiledPattern::new(r"\r\n").unwrap();
        let mut src = StreamedData::new();
        src.append("abc");
        let mut dst = StreamedData::new();
        dst.shift_until_partial_match(&mut src, &pattern);
        assert_eq!(dst.text(), "abc");
        assert!(src.is_empty());
    }

    #[test]
    fn test_take_leading_markers() {
        let mut buf = StreamedData::new();
        buf.append("abc");
        buf.add_marker(Marker::new_line(0));
        buf.add_marker(Marker::colour(0, Rgb::new(1, 1, 1)));
        buf.add_marker(Marker::new_line(2));
        let leading = buf.take_leading_markers();
        assert_eq!(leading.len(), 2);
        assert_eq!(buf.markers(), &[Marker::new_line(2)]);
    }

    #[test]
    fn test_first_line_boundary_ignores_leading_marker() {
        let mut buf = StreamedData::new();
        buf.append("abcdef");
        buf.add_marker(Marker::new_line(0));
        buf.add_marker(Marker::new_line(4));
        assert_eq!(buf.first_line_boundary(), Some(4));
        assert!(buf.has_leading_new_line());
    }

    #[test]
    fn test_multibyte_offsets() {
        let mut src = StreamedData::new();
        src.append("a↵b↵c");
        src.add_marker(Marker::new_line(2));
        let mut dst = StreamedData::new();
        dst.shift_prefix(&mut src, 3);
        assert_eq!(dst.text(), "a↵b");
        assert_eq!(src.text(), "↵c");
        assert_eq!(dst.markers(), &[Marker::new_line(2)]);
    }
}
