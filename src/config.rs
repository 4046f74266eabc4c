/// 2^17 slots keeps the ~42k station domain under half load.
pub const DEFAULT_TABLE_CAPACITY: usize = 1 << 17;

pub const DEFAULT_ARENA_RESERVE: usize = 64 << 20;

pub const DEFAULT_OUTPUT_LIMIT: usize = 8 << 20;

/// What to do with a record that breaks the input grammar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Stop the run with [`crate::Error::Malformed`].
    #[default]
    Abort,
    /// Drop the record up to its line terminator and keep going.
    Skip,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Worker count. `None` uses the host's available parallelism.
    pub threads: Option<usize>,
    pub table_capacity: usize,
    /// Reservation ceiling for each worker's arena, in bytes.
    pub arena_reserve: usize,
    /// Maximum size of the formatted summary, in bytes.
    pub output_limit: usize,
    pub malformed: MalformedPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: None,
            table_capacity: DEFAULT_TABLE_CAPACITY,
            arena_reserve: DEFAULT_ARENA_RESERVE,
            output_limit: DEFAULT_OUTPUT_LIMIT,
            malformed: MalformedPolicy::Abort,
        }
    }
}

impl Config {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }

    pub fn with_table_capacity(mut self, capacity: usize) -> Self {
        self.table_capacity = capacity;
        self
    }

    pub fn with_arena_reserve(mut self, bytes: usize) -> Self {
        self.arena_reserve = bytes;
        self
    }

    pub fn with_output_limit(mut self, bytes: usize) -> Self {
        self.output_limit = bytes;
        self
    }

    pub fn with_malformed(mut self, policy: MalformedPolicy) -> Self {
        self.malformed = policy;
        self
    }

    /// Resolved worker count.
    pub fn worker_count(&self) -> usize {
        self.threads.unwrap_or_else(rayon::current_num_threads).max(1)
    }
}
