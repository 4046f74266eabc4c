//! Per-station min/mean/max over `station;temperature` records.
//!
//! The input is an immutable byte buffer. It is split into line-aligned
//! partitions, each reduced on its own worker into an arena-backed
//! [`Table`], then the tables are merged, sorted by key bytes and rendered
//! as `{name=min/mean/max, ...}\n`.

pub mod arena;
pub mod byte_buffer;
pub mod config;
pub mod error;
pub mod format;
pub mod hash_table;
pub mod parser;
pub mod partition;
pub mod reduce;

use std::time::Instant;

use tracing::info;

pub use config::{Config, MalformedPolicy};
pub use error::{Error, Result};
pub use format::{Summary, render};
pub use hash_table::{Aggregate, Table};
pub use reduce::{reduce, reduce_sequential};

/// Rolling hash of a station name; the same function the parser and the
/// merger use to place keys.
pub fn rolling_hash(name: &[u8]) -> u64 {
    Table::hash(name)
}

/// Full pipeline: reduce in parallel, then sort and format.
pub fn aggregate(buf: &[u8], config: &Config) -> Result<Summary> {
    let table = reduce(buf, config)?;

    let started = Instant::now();
    let summary = render(&table, config.output_limit);
    info!(
        bytes = summary.bytes.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "summary rendered"
    );

    Ok(summary)
}
