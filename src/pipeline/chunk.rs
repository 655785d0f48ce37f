//! Fixed-size character windows.
//!
//! One policy serves every stage: summarization and quiz generation (1000
//! characters by default) and speech synthesis (1500). Windows are counted in
//! `char`s so a multi-byte script never gets split inside a code point, but a
//! window may still end mid-word or mid-sentence. Chunks never overlap and
//! their in-order concatenation is the original string.

/// Lazy iterator over consecutive windows of at most `size` characters.
///
/// Cloning yields an independent iterator from the same position, so a chunk
/// sequence can be replayed.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    rest: &'a str,
    size: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let end = self
            .rest
            .char_indices()
            .nth(self.size)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (head, tail) = self.rest.split_at(end);
        self.rest = tail;
        Some(head)
    }
}

impl std::iter::FusedIterator for Chunks<'_> {}

/// Split `text` into windows of `size` characters; the last may be shorter.
///
/// A `size` of 0 is treated as 1. Empty `text` yields no chunks.
pub fn chunk_text(text: &str, size: usize) -> Chunks<'_> {
    Chunks {
        rest: text,
        size: size.max(1),
    }
}

/// Number of chunks [`chunk_text`] will yield: ⌈chars / size⌉.
pub fn chunk_count(text: &str, size: usize) -> usize {
    text.chars().count().div_ceil(size.max(1))
}
