//! Bump arena over a reserved anonymous mapping.
//!
//! The whole reservation is mapped up front with no physical backing; the
//! OS supplies pages the first time they are written. `committed` tracks
//! the page-aligned prefix handed out so far and only ever grows. There is
//! no per-allocation free: the mapping is released when the arena drops.

use memmap2::MmapMut;
use tracing::trace;

use crate::error::{Error, Result};

pub const PAGE_SIZE: usize = 4096;

/// Handles store 32-bit offsets.
pub const MAX_RESERVE: usize = 1 << 31;

#[inline(always)]
const fn align_up(n: usize, align: usize) -> usize {
    (n + align - 1) & !(align - 1)
}

/// Handle to bytes carved out of an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaSlice {
    offset: u32,
    len: u32,
}

impl ArenaSlice {
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

pub struct Arena {
    map: MmapMut,
    used: usize,
    committed: usize,
}

impl Arena {
    /// Reserves `reserve` bytes of address space (rounded up to a page).
    pub fn new(reserve: usize) -> Result<Self> {
        let reserved = align_up(reserve.clamp(PAGE_SIZE, MAX_RESERVE), PAGE_SIZE);
        let map = MmapMut::map_anon(reserved).map_err(|source| Error::ArenaReserve {
            reserved,
            source,
        })?;

        Ok(Self {
            map,
            used: 0,
            committed: 0,
        })
    }

    /// Bump-allocates `size` zeroed bytes.
    #[inline(always)]
    pub fn alloc(&mut self, size: usize) -> Result<ArenaSlice> {
        let start = self.used;
        let end = match start.checked_add(size) {
            Some(end) if end <= self.map.len() => end,
            _ => {
                return Err(Error::ArenaExhausted {
                    requested: size,
                    used: self.used,
                    reserved: self.map.len(),
                });
            }
        };

        if end > self.committed {
            self.grow(end);
        }
        self.used = end;

        Ok(ArenaSlice {
            offset: start as u32,
            len: size as u32,
        })
    }

    /// Allocates and fills a copy of `bytes`.
    #[inline(always)]
    pub fn alloc_copy(&mut self, bytes: &[u8]) -> Result<ArenaSlice> {
        let slice = self.alloc(bytes.len())?;
        self.get_mut(slice).copy_from_slice(bytes);
        Ok(slice)
    }

    #[cold]
    fn grow(&mut self, end: usize) {
        let committed = align_up(end, PAGE_SIZE).min(self.map.len());
        trace!(from = self.committed, to = committed, "arena commit");
        self.committed = committed;
    }

    #[inline(always)]
    pub fn get(&self, slice: ArenaSlice) -> &[u8] {
        let start = slice.offset as usize;
        &self.map[start..start + slice.len as usize]
    }

    #[inline(always)]
    pub fn get_mut(&mut self, slice: ArenaSlice) -> &mut [u8] {
        let start = slice.offset as usize;
        &mut self.map[start..start + slice.len as usize]
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn committed(&self) -> usize {
        self.committed
    }

    pub fn reserved(&self) -> usize {
        self.map.len()
    }
}
