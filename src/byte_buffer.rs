const MSB_MASK: u64 = 0x8080_8080_8080_8080;
const LSB_MASK: u64 = 0x0101_0101_0101_0101;

pub trait ByteBuffer {
    fn byte_position(&self, needle: u8) -> Option<usize>;

    /// First offset `>= offset` that begins a line: `offset` itself when it
    /// already follows a `\n` (or is 0), otherwise one past the next `\n`,
    /// or the buffer length if there is none.
    fn line_start_from(&self, offset: usize) -> usize;
}

impl ByteBuffer for [u8] {
    #[inline(always)]
    fn byte_position(&self, needle: u8) -> Option<usize> {
        let mut i = 0;

        let repeat = LSB_MASK * needle as u64;
        while i + 8 <= self.len() {
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&self[i..i + 8]);
            let xored = u64::from_le_bytes(chunk) ^ repeat;
            let matching_bytes = xored.wrapping_sub(LSB_MASK) & !xored & MSB_MASK;

            if matching_bytes != 0 {
                let j = (matching_bytes.trailing_zeros() / 8) as usize;
                return Some(i + j);
            }

            i += 8;
        }

        while i < self.len() {
            if self[i] == needle {
                return Some(i);
            }
            i += 1;
        }

        None
    }

    #[inline]
    fn line_start_from(&self, offset: usize) -> usize {
        if offset == 0 {
            return 0;
        }
        if offset >= self.len() {
            return self.len();
        }
        if self[offset - 1] == b'\n' {
            return offset;
        }

        match self[offset..].byte_position(b'\n') {
            Some(nl) => offset + nl + 1,
            None => self.len(),
        }
    }
}
