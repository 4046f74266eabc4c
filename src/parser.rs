//! Record tokenizer for `<name>;<temperature>\n` lines.
//!
//! Temperatures follow `-?D?D.D` and are decoded straight from the ASCII
//! digits into tenths of a degree; no float is ever built.

use crate::byte_buffer::ByteBuffer;
use crate::error::{Error, Result};
use crate::hash_table::Table;

pub const MAX_KEY_LEN: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Record<'a> {
    pub name: &'a [u8],
    pub hash: u64,
    pub tenths: i32,
}

/// Iterates the records of a line-aligned byte range.
///
/// A malformed record yields an `Err` and the cursor moves past its line
/// terminator, so the caller may either stop or carry on with the next line.
pub struct LineParser<'a> {
    buf: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> LineParser<'a> {
    /// `base` is the absolute offset of `buf` in the input, used in errors.
    pub fn new(buf: &'a [u8], base: usize) -> Self {
        Self { buf, pos: 0, base }
    }

    #[inline(always)]
    fn next_record(&mut self) -> Result<Record<'a>> {
        let buf = self.buf;
        let start = self.pos;
        let malformed = |reason: &'static str| Error::Malformed {
            offset: self.base + start,
            reason,
        };

        let mut hash = 0;
        let mut semi = start;
        loop {
            match buf.get(semi) {
                Some(b';') => break,
                Some(b'\n') | None => return Err(malformed("missing ';' delimiter")),
                Some(&b) => {
                    hash = Table::hash_byte(hash, b);
                    semi += 1;
                }
            }
        }

        let len = semi - start;
        if len == 0 {
            return Err(malformed("empty station name"));
        }
        if len > MAX_KEY_LEN {
            return Err(Error::KeyTooLong {
                offset: self.base + start,
                len,
            });
        }

        let (tenths, next) = parse_temperature(buf, semi + 1).map_err(malformed)?;
        self.pos = next;

        Ok(Record {
            name: &buf[start..semi],
            hash: Table::finish_hash(hash),
            tenths,
        })
    }

    #[cold]
    fn resync(&mut self) {
        self.pos = match self.buf[self.pos..].byte_position(b'\n') {
            Some(nl) => self.pos + nl + 1,
            None => self.buf.len(),
        };
    }
}

impl<'a> Iterator for LineParser<'a> {
    type Item = Result<Record<'a>>;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.buf.len() {
            return None;
        }

        let record = self.next_record();
        if record.is_err() {
            self.resync();
        }
        Some(record)
    }
}

#[inline(always)]
fn digit(byte: Option<&u8>) -> std::result::Result<i32, &'static str> {
    match byte {
        Some(&b) if b.is_ascii_digit() => Ok((b - b'0') as i32),
        _ => Err("digit expected"),
    }
}

/// Decodes `-?D?D.D` starting at `at`, followed by `\n` or end of buffer.
/// Returns the value in tenths and the offset of the next record.
#[inline(always)]
pub fn parse_temperature(buf: &[u8], at: usize) -> std::result::Result<(i32, usize), &'static str> {
    let mut i = at;

    let negative = buf.get(i) == Some(&b'-');
    if negative {
        i += 1;
    }

    let mut whole = digit(buf.get(i))?;
    i += 1;
    if buf.get(i) != Some(&b'.') {
        whole = whole * 10 + digit(buf.get(i))?;
        i += 1;
        if buf.get(i) != Some(&b'.') {
            return Err("'.' expected");
        }
    }
    i += 1;

    let tenths = whole * 10 + digit(buf.get(i))?;
    i += 1;

    let next = match buf.get(i) {
        Some(b'\n') => i + 1,
        None => i,
        Some(_) => return Err("line terminator expected"),
    };

    Ok((if negative { -tenths } else { tenths }, next))
}
