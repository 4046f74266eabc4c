//! Error types for the aggregation engine.
//!
//! Every failure here is fatal to a run: capacity errors mean the
//! deployment is mis-sized, input errors mean the file breaks the
//! `name;temperature` contract. Nothing is retried.

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The arena could not obtain its address range from the OS.
    #[error("failed to reserve {reserved} bytes for arena: {source}")]
    ArenaReserve {
        reserved: usize,
        #[source]
        source: io::Error,
    },

    /// A bump allocation would cross the reservation ceiling.
    #[error("arena exhausted: requested {requested} bytes with {used} of {reserved} in use")]
    ArenaExhausted {
        requested: usize,
        used: usize,
        reserved: usize,
    },

    /// Table capacity must be a power of two of at least 2.
    #[error("table capacity {capacity} is not a power of two >= 2")]
    InvalidCapacity { capacity: usize },

    /// The load factor ceiling (half the slots) has been reached.
    #[error("table full: {entries} stations already stored in {capacity} slots")]
    TableFull { capacity: usize, entries: usize },

    /// A record does not match `<name>;-?D?D.D\n`.
    #[error("malformed record at byte {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },

    /// Station names are limited to 100 bytes.
    #[error("station name at byte {offset} is {len} bytes, limit is 100")]
    KeyTooLong { offset: usize, len: usize },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    /// Errors caused by a single bad record rather than by configuration.
    pub fn is_record_error(&self) -> bool {
        matches!(self, Error::Malformed { .. } | Error::KeyTooLong { .. })
    }
}
