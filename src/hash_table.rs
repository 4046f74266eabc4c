use crate::arena::{Arena, ArenaSlice};
use crate::error::{Error, Result};

const HASH_PRIME: u64 = 37;

/// Index slot marker for "no entry".
const EMPTY: u32 = u32::MAX;

/// Running statistics for one station, in tenths of a degree.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Aggregate {
    pub sum: i64,
    pub count: u64,
    pub min: i32,
    pub max: i32,
}

impl Default for Aggregate {
    fn default() -> Self {
        Self {
            sum: 0,
            count: 0,
            min: i32::MAX,
            max: i32::MIN,
        }
    }
}

impl Aggregate {
    #[inline(always)]
    pub fn record(&mut self, tenths: i32) {
        self.sum += tenths as i64;
        self.count += 1;
        self.min = self.min.min(tenths);
        self.max = self.max.max(tenths);
    }

    #[inline(always)]
    pub fn merge(&mut self, other: &Aggregate) {
        self.sum += other.sum;
        self.count += other.count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// `sum / count` rounded half away from zero, in tenths.
    pub fn mean_tenths(&self) -> i64 {
        if self.count == 0 {
            return 0;
        }

        let sum = self.sum as i128;
        let count = self.count as i128;
        let rounded = (2 * sum.abs() + count) / (2 * count);
        (if sum < 0 { -rounded } else { rounded }) as i64
    }
}

enum Probe {
    Found(usize),
    Vacant(usize),
}

/// Fixed-capacity open-addressing map from station name to [`Aggregate`].
///
/// `index` has one slot per capacity unit and points into the dense
/// `hashes`/`keys`/`stats` arrays. Dense arrays never hold more than
/// `capacity / 2 - 1` entries, so a probe always reaches an empty slot.
pub struct Table {
    arena: Arena,
    index: Vec<u32>,
    hashes: Vec<u64>,
    keys: Vec<ArenaSlice>,
    stats: Vec<Aggregate>,
    size: usize,
}

impl Table {
    pub fn new(size: usize, arena_reserve: usize) -> Result<Self> {
        if size < 2 || !size.is_power_of_two() || size > EMPTY as usize {
            return Err(Error::InvalidCapacity { capacity: size });
        }

        let max_entries = size / 2 - 1;

        Ok(Self {
            arena: Arena::new(arena_reserve)?,
            index: vec![EMPTY; size],
            hashes: Vec::with_capacity(max_entries),
            keys: Vec::with_capacity(max_entries),
            stats: Vec::with_capacity(max_entries),
            size,
        })
    }

    #[inline(always)]
    pub fn hash_byte(hash: u64, byte: u8) -> u64 {
        hash.wrapping_mul(HASH_PRIME).wrapping_add(byte as u64)
    }

    /// Zero is reserved for "no key", so it is never a valid hash.
    #[inline(always)]
    pub fn finish_hash(hash: u64) -> u64 {
        if hash == 0 { 1 } else { hash }
    }

    #[inline(always)]
    pub fn hash(name: &[u8]) -> u64 {
        Table::finish_hash(name.iter().fold(0, |h, &b| Table::hash_byte(h, b)))
    }

    #[inline(always)]
    fn probe(&self, name: &[u8], hash: u64) -> Result<Probe> {
        let size_mask = self.size - 1;
        let mut slot = hash as usize & size_mask;

        for _ in 0..self.size {
            let idx = self.index[slot];
            if idx == EMPTY {
                return Ok(Probe::Vacant(slot));
            }

            let i = idx as usize;
            if self.hashes[i] == hash && self.arena.get(self.keys[i]) == name {
                return Ok(Probe::Found(i));
            }

            slot = (slot + 1) & size_mask;
        }

        Err(self.full())
    }

    fn full(&self) -> Error {
        Error::TableFull {
            capacity: self.size,
            entries: self.stats.len(),
        }
    }

    /// Returns the aggregate for `name`, inserting a fresh one if absent.
    /// `hash` must be `Table::hash(name)`.
    #[inline(always)]
    pub fn get_or_insert(&mut self, name: &[u8], hash: u64) -> Result<&mut Aggregate> {
        debug_assert_eq!(hash, Table::hash(name));

        let i = match self.probe(name, hash)? {
            Probe::Found(i) => i,
            Probe::Vacant(slot) => {
                if self.stats.len() >= self.size / 2 - 1 {
                    return Err(self.full());
                }

                let key = self.arena.alloc_copy(name)?;
                let i = self.stats.len();
                self.index[slot] = i as u32;
                self.hashes.push(hash);
                self.keys.push(key);
                self.stats.push(Aggregate::default());
                i
            }
        };

        Ok(&mut self.stats[i])
    }

    #[inline(always)]
    pub fn update(&mut self, name: &[u8], hash: u64, tenths: i32) -> Result<()> {
        self.get_or_insert(name, hash)?.record(tenths);
        Ok(())
    }

    pub fn get(&self, name: &[u8]) -> Option<&Aggregate> {
        match self.probe(name, Table::hash(name)) {
            Ok(Probe::Found(i)) => Some(&self.stats[i]),
            _ => None,
        }
    }

    /// Folds every entry of `other` into this table.
    pub fn merge_from(&mut self, other: &Table) -> Result<()> {
        for (name, hash, stats) in other.iter() {
            self.get_or_insert(name, hash)?.merge(stats);
        }
        Ok(())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], u64, &Aggregate)> {
        self.keys
            .iter()
            .zip(&self.hashes)
            .zip(&self.stats)
            .map(|((&key, &hash), stats)| (self.arena.get(key), hash, stats))
    }

    pub fn entries(&self) -> Vec<(&[u8], &Aggregate)> {
        self.iter().map(|(name, _, stats)| (name, stats)).collect()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.size
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }
}
