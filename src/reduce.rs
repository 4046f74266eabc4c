//! Partition, parallel reduce and merge.
//!
//! Every worker owns a private [`Table`] (and so a private arena) and only
//! reads its own slice of the shared input. The single synchronisation
//! point is the end of the map phase; merging is sequential.

use std::ops::Range;
use std::time::Instant;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{Config, MalformedPolicy};
use crate::error::Result;
use crate::hash_table::Table;
use crate::parser::LineParser;
use crate::partition::partition;

/// Output of one worker.
pub struct Partial {
    pub table: Table,
    pub records: u64,
    pub skipped: u64,
}

/// Runs the parser over `buf[range]` into a fresh table.
pub fn process(buf: &[u8], range: Range<usize>, config: &Config) -> Result<Partial> {
    let mut table = Table::new(config.table_capacity, config.arena_reserve)?;
    let mut records = 0;
    let mut skipped = 0;

    for record in LineParser::new(&buf[range.clone()], range.start) {
        match record {
            Ok(record) => {
                table.update(record.name, record.hash, record.tenths)?;
                records += 1;
            }
            Err(err) if config.malformed == MalformedPolicy::Skip && err.is_record_error() => {
                debug!(error = %err, "skipping record");
                skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    debug!(
        start = range.start,
        end = range.end,
        records,
        skipped,
        stations = table.len(),
        arena_used = table.arena().used(),
        "partition reduced"
    );

    Ok(Partial {
        table,
        records,
        skipped,
    })
}

/// Folds every table in `rest` into `acc`.
pub fn merge(mut acc: Table, rest: impl IntoIterator<Item = Table>) -> Result<Table> {
    for table in rest {
        acc.merge_from(&table)?;
    }
    Ok(acc)
}

/// Partitions `buf` across the configured workers, reduces each partition
/// in parallel and merges the results.
pub fn reduce(buf: &[u8], config: &Config) -> Result<Table> {
    let ranges = partition(buf, config.worker_count());

    let started = Instant::now();
    let map = || {
        ranges
            .par_iter()
            .map(|range| process(buf, range.clone(), config))
            .collect::<Result<Vec<_>>>()
    };
    let partials = match config.threads {
        Some(threads) => ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?
            .install(map)?,
        None => map()?,
    };
    info!(
        partitions = ranges.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "map phase complete"
    );

    finish(partials, config)
}

/// Single pass over the whole buffer on the calling thread.
pub fn reduce_sequential(buf: &[u8], config: &Config) -> Result<Table> {
    let started = Instant::now();
    let partial = process(buf, 0..buf.len(), config)?;
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "sequential pass complete"
    );

    finish(vec![partial], config)
}

fn finish(partials: Vec<Partial>, config: &Config) -> Result<Table> {
    let records: u64 = partials.iter().map(|p| p.records).sum();
    let skipped: u64 = partials.iter().map(|p| p.skipped).sum();
    if skipped > 0 {
        warn!(skipped, "malformed records skipped");
    }

    let started = Instant::now();
    let mut tables = partials.into_iter().map(|p| p.table);
    let table = match tables.next() {
        Some(acc) => merge(acc, tables)?,
        None => Table::new(config.table_capacity, config.arena_reserve)?,
    };
    info!(
        records,
        stations = table.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "merge complete"
    );

    Ok(table)
}
