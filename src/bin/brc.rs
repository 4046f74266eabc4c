use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use memmap2::Mmap;
use onebrc_arena::config::{DEFAULT_ARENA_RESERVE, DEFAULT_OUTPUT_LIMIT, DEFAULT_TABLE_CAPACITY};
use onebrc_arena::{Config, MalformedPolicy, reduce, reduce_sequential, render};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Per-station min/mean/max temperatures from a `station;temperature` file.
#[derive(Parser, Debug)]
#[command(name = "brc", version, about)]
struct Args {
    /// Measurements file, one record per line
    file: PathBuf,

    /// Worker threads (defaults to available parallelism)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Hash table slots per worker, a power of two
    #[arg(long, default_value_t = DEFAULT_TABLE_CAPACITY)]
    capacity: usize,

    /// Arena reservation per worker, in bytes
    #[arg(long, default_value_t = DEFAULT_ARENA_RESERVE)]
    arena_reserve: usize,

    /// Maximum summary size, in bytes
    #[arg(long, default_value_t = DEFAULT_OUTPUT_LIMIT)]
    output_limit: usize,

    /// Skip malformed records instead of failing
    #[arg(long)]
    skip_malformed: bool,

    /// Single-threaded pass over the whole file
    #[arg(long)]
    sequential: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::default()
            .with_table_capacity(self.capacity)
            .with_arena_reserve(self.arena_reserve)
            .with_output_limit(self.output_limit);

        if let Some(threads) = self.threads {
            config = config.with_threads(threads);
        }
        if self.skip_malformed {
            config = config.with_malformed(MalformedPolicy::Skip);
        }
        config
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let config = args.config();

    let file = File::open(&args.file)
        .with_context(|| format!("couldn't open file {:?}", args.file))?;
    let len = file
        .metadata()
        .with_context(|| format!("couldn't stat file {:?}", args.file))?
        .len();

    let mmap = if len == 0 {
        None
    } else {
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("couldn't mmap file {:?}", args.file))?;
        #[cfg(unix)]
        if let Err(err) = mmap.advise(memmap2::Advice::WillNeed) {
            debug!(error = %err, "madvise failed");
        }
        Some(mmap)
    };
    let buf: &[u8] = mmap.as_deref().unwrap_or_default();
    info!(bytes = buf.len(), workers = config.worker_count(), "input mapped");

    let table = if args.sequential {
        reduce_sequential(buf, &config)?
    } else {
        reduce(buf, &config)?
    };
    let summary = render(&table, config.output_limit);

    // The writer owns only the rendered bytes; tables and the mapping are
    // released on this thread while stdout drains.
    let writer = thread::spawn(move || -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(&summary.bytes)?;
        out.flush()
    });

    drop(table);
    drop(mmap);

    writer
        .join()
        .map_err(|_| anyhow!("output writer panicked"))?
        .context("couldn't write summary")?;

    Ok(())
}
