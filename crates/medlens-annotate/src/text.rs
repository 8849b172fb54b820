//! Character-indexed view of a source text.
//!
//! Offsets from the extraction services count Unicode scalar values, not
//! bytes. `CharIndex` maps those offsets to byte positions for slicing and
//! runs the case-insensitive searches the resolver needs.

use medlens_contracts::entity::SpanRange;

pub(crate) struct CharIndex<'t> {
    text: &'t str,
    /// Byte offset of every char, followed by `text.len()`.
    bounds: Vec<usize>,
    /// One lowercase char per source char, so folded positions equal source
    /// positions.
    folded: Vec<char>,
}

impl<'t> CharIndex<'t> {
    pub(crate) fn new(text: &'t str) -> Self {
        let mut bounds = Vec::with_capacity(text.len() + 1);
        let mut folded = Vec::with_capacity(text.len());
        for (byte, c) in text.char_indices() {
            bounds.push(byte);
            folded.push(fold(c));
        }
        bounds.push(text.len());
        Self {
            text,
            bounds,
            folded,
        }
    }

    /// Number of chars in the text.
    pub(crate) fn len(&self) -> usize {
        self.folded.len()
    }

    /// The text of `[start, end)`, with both ends clamped to the text.
    pub(crate) fn slice(&self, start: usize, end: usize) -> &'t str {
        let end = end.min(self.len());
        let start = start.min(end);
        &self.text[self.bounds[start]..self.bounds[end]]
    }

    /// Clamp `range` to the text. `None` when nothing of it remains.
    pub(crate) fn clamp(&self, range: SpanRange) -> Option<SpanRange> {
        let end = range.end.min(self.len());
        (range.start < end).then(|| SpanRange::new(range.start, end))
    }

    /// True when the text of `range` equals `needle`, ignoring case and
    /// surrounding whitespace. Ranges outside the text never match.
    pub(crate) fn matches_ignore_case(&self, range: SpanRange, needle: &str) -> bool {
        if range.start >= range.end || range.end > self.len() {
            return false;
        }
        let slice = self.slice(range.start, range.end).trim();
        slice.chars().map(fold).eq(needle.trim().chars().map(fold))
    }

    /// First case-insensitive occurrence of `needle`. An empty needle never
    /// matches.
    pub(crate) fn find_ignore_case(&self, needle: &str) -> Option<SpanRange> {
        let needle: Vec<char> = needle.chars().map(fold).collect();
        if needle.is_empty() || needle.len() > self.folded.len() {
            return None;
        }
        self.folded
            .windows(needle.len())
            .position(|w| w == needle.as_slice())
            .map(|start| SpanRange::new(start, start + needle.len()))
    }
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
