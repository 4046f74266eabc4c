use std::ops::Range;

use crate::byte_buffer::ByteBuffer;

/// Splits `buf` into `parts` contiguous, line-aligned ranges of roughly
/// equal size. Ranges may be empty when lines are long relative to the
/// split, but together they always cover `0..buf.len()` exactly once.
pub fn partition(buf: &[u8], parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let len = buf.len() as u128;

    let offsets: Vec<usize> = (1..parts)
        .map(|i| (i as u128 * len / parts as u128) as usize)
        .collect();

    split_at_offsets(buf, &offsets)
}

/// Cuts `buf` at the given raw offsets, snapping each one forward to the
/// start of the next line. The first range starts at 0 and the last ends
/// at `buf.len()`.
pub fn split_at_offsets(buf: &[u8], offsets: &[usize]) -> Vec<Range<usize>> {
    let mut ranges = Vec::with_capacity(offsets.len() + 1);

    let mut start = 0;
    for &offset in offsets {
        let end = buf.line_start_from(offset).max(start);
        ranges.push(start..end);
        start = end;
    }
    ranges.push(start..buf.len());

    ranges
}
