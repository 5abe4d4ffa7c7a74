//! Compile-time limits
//!
//! Hard safety bounds for input size and work per unit. These cannot be
//! changed at runtime; user-tunable behaviour lives in [`super::runtime`].

pub mod compile_time {
    pub mod file_processing {
        /// Maximum token dump size accepted from disk (64MB)
        /// SECURITY: Prevents memory exhaustion from oversized dumps
        pub const MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

        /// File name suffix identifying raw token dumps during discovery
        pub const TOKEN_DUMP_SUFFIX: &str = ".tokens.json";
    }

    pub mod tokens {
        /// Maximum number of tokens accepted for a single unit
        /// SECURITY: Prevents DoS via token explosion
        pub const MAX_TOKEN_COUNT: usize = 2_000_000;
    }

    pub mod structure {
        /// How far back (in tokens) a declaration's doc comment may sit
        pub const DOCBLOCK_SCAN_LIMIT: usize = 100;

        /// Name reported for closures
        pub const ANONYMOUS_FUNCTION_NAME: &str = "anonymous function";

        /// Name reported for `new class { ... }`
        pub const ANONYMOUS_CLASS_NAME: &str = "anonymous class";
    }

    pub mod batch {
        /// Upper bound on worker threads regardless of preference
        pub const MAX_THREADS: usize = 64;

        /// Units handed to the worker pool per round
        /// PERFORMANCE: Bounds memory held by in-flight results
        pub const MAX_CHUNK_SIZE: usize = 50;

        /// Maximum units per batch
        pub const MAX_UNITS_PER_BATCH: usize = 100_000;
    }

    pub mod logging {
        /// Events retained per unit by the error collector
        pub const MAX_LOG_EVENTS_PER_FILE: usize = 1000;

        /// Events retained across all units
        pub const LOG_BUFFER_SIZE: usize = 100_000;
    }
}
