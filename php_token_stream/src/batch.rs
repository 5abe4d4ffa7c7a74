//! Batch analysis over many units
//!
//! Sequential and thread-parallel execution with per-unit failure
//! isolation. Each worker owns the units it analyses; only the result sink
//! and the stop flags are shared. Results come back in input order no
//! matter which worker finished first.

use crate::config::compile_time::batch::{MAX_CHUNK_SIZE, MAX_THREADS, MAX_UNITS_PER_BATCH};
use crate::config::compile_time::file_processing::TOKEN_DUMP_SUFFIX;
use crate::config::AnalysisPreferences;
use crate::logging::{self, codes, Code};
use crate::pipeline::{self, AnalysisError, UnitAnalysis};
use crate::tokens::RawToken;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

/// One unit's raw tokens held in memory
#[derive(Debug, Clone)]
pub struct AnalysisUnit {
    pub name: String,
    pub raw_tokens: Vec<RawToken>,
}

impl AnalysisUnit {
    pub fn new(name: impl Into<String>, raw_tokens: Vec<RawToken>) -> Self {
        Self {
            name: name.into(),
            raw_tokens,
        }
    }
}

/// Batch processing configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: Option<usize>,
    pub progress_reporting: bool,
    pub fail_fast: bool,
    pub preferences: AnalysisPreferences,
    /// Checked before each unit starts; set it to stop the batch early
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: std::thread::available_parallelism()
                .map(|n| n.get().min(8))
                .unwrap_or(4),
            recursive: true,
            max_files: None,
            progress_reporting: false,
            fail_fast: false,
            preferences: AnalysisPreferences::default(),
            cancel: None,
        }
    }
}

impl BatchConfig {
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn thread_count(&self) -> usize {
        self.max_threads.clamp(1, MAX_THREADS)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }
}

/// A unit whose analysis failed
#[derive(Debug, Clone)]
pub struct UnitFailure {
    /// Position in the batch input
    pub index: usize,
    pub unit: String,
    pub error: AnalysisError,
}

/// Batch processing results
#[derive(Debug, Default)]
pub struct BatchResults {
    /// `(input position, analysis)` in input order
    pub successful_units: Vec<(usize, UnitAnalysis)>,
    /// In input order
    pub failed_units: Vec<UnitFailure>,
    pub units_processed: usize,
    pub units_discovered: usize,
    /// Units never started because of fail-fast or cancellation
    pub units_skipped: usize,
    pub cancelled: bool,
    pub processing_duration: Duration,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful_units.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_units.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.units_processed == 0 {
            0.0
        } else {
            self.successful_units.len() as f64 / self.units_processed as f64
        }
    }

    pub fn add_success(&mut self, index: usize, analysis: UnitAnalysis) {
        self.successful_units.push((index, analysis));
        self.units_processed += 1;
    }

    pub fn add_failure(&mut self, index: usize, unit: String, error: AnalysisError) {
        self.failed_units.push(UnitFailure { index, unit, error });
        self.units_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful_units.extend(other.successful_units);
        self.failed_units.extend(other.failed_units);
        self.units_processed += other.units_processed;
    }

    /// Successful analyses in input order
    pub fn analyses(&self) -> impl Iterator<Item = &UnitAnalysis> {
        self.successful_units.iter().map(|(_, analysis)| analysis)
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch analysis completed: {} units processed, {} successful ({:.1}%), {} failed, {} skipped, {:.2}s total",
            self.units_processed,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.units_skipped,
            self.processing_duration.as_secs_f64()
        )
    }

    fn restore_input_order(&mut self) {
        self.successful_units.sort_by_key(|(index, _)| *index);
        self.failed_units.sort_by_key(|failure| failure.index);
    }
}

/// Batch processing errors
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No token dumps found in directory: {path}")]
    NoUnitsFound { path: String },

    #[error("Too many units: {count} (max: {max})")]
    TooManyUnits { count: usize, max: usize },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },

    #[error("Worker thread error: {message}")]
    ThreadError { message: String },
}

impl BatchError {
    pub fn code(&self) -> Code {
        match self {
            BatchError::DirectoryNotFound { .. } => codes::batch::DIRECTORY_NOT_FOUND,
            BatchError::NoUnitsFound { .. } => codes::batch::NO_UNITS_FOUND,
            BatchError::TooManyUnits { .. } => codes::batch::TOO_MANY_UNITS,
            BatchError::IoError { .. } => codes::input::IO_ERROR,
            BatchError::ThreadError { .. } => codes::batch::WORKER_FAILURE,
        }
    }
}

// ============================================================================
// UNIT SOURCES
// ============================================================================

/// Something a worker can turn into a [`UnitAnalysis`]
trait UnitSource: Send + 'static {
    fn name(&self) -> String;
    fn analyze(self, preferences: &AnalysisPreferences) -> Result<UnitAnalysis, AnalysisError>;
}

impl UnitSource for AnalysisUnit {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn analyze(self, preferences: &AnalysisPreferences) -> Result<UnitAnalysis, AnalysisError> {
        pipeline::analyze_unit(&self.name, self.raw_tokens, preferences)
    }
}

impl UnitSource for PathBuf {
    fn name(&self) -> String {
        self.display().to_string()
    }

    fn analyze(self, preferences: &AnalysisPreferences) -> Result<UnitAnalysis, AnalysisError> {
        pipeline::analyze_dump(&self, preferences)
    }
}

// ============================================================================
// DISCOVERY
// ============================================================================

/// Find token dumps (`*.tokens.json`) under a directory, sorted by path
pub fn discover_token_dumps(dir_path: &Path, config: &BatchConfig) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting token dump discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        return Err(BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        });
    }

    let mut walker = WalkDir::new(dir_path).follow_links(false).sort_by_file_name();
    if !config.recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| BatchError::IoError {
            error: e.to_string(),
        })?;
        if !entry.file_type().is_file() || !is_token_dump(entry.path()) {
            continue;
        }

        files.push(entry.into_path());
        if let Some(max_files) = config.max_files {
            if files.len() >= max_files {
                crate::log_warning!("Reached maximum file limit",
                    "files_found" => files.len(),
                    "limit" => max_files
                );
                break;
            }
        }
    }

    if files.is_empty() {
        return Err(BatchError::NoUnitsFound {
            path: dir_path.display().to_string(),
        });
    }

    files.sort();

    crate::log_success!(codes::success::DISCOVERY_COMPLETE, "Token dump discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

fn is_token_dump(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| {
            name.len() > TOKEN_DUMP_SUFFIX.len() && name.ends_with(TOKEN_DUMP_SUFFIX)
        })
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

fn run_batch<S: UnitSource>(sources: Vec<S>, config: &BatchConfig) -> Result<BatchResults, BatchError> {
    if sources.len() > MAX_UNITS_PER_BATCH {
        return Err(BatchError::TooManyUnits {
            count: sources.len(),
            max: MAX_UNITS_PER_BATCH,
        });
    }

    let start_time = Instant::now();
    let total = sources.len();
    let threads = config.thread_count();

    crate::log_info!("Starting batch analysis",
        "units" => total,
        "threads" => threads,
        "fail_fast" => config.fail_fast
    );

    let mut results = if threads == 1 || total <= 1 {
        process_sequential(sources, config)
    } else {
        process_parallel(sources, config, threads)?
    };

    results.restore_input_order();
    results.units_discovered = total;
    results.units_skipped = total - results.units_processed;
    results.cancelled = config.is_cancelled();
    results.processing_duration = start_time.elapsed();

    crate::log_success!(codes::success::BATCH_COMPLETE, "Batch analysis completed",
        "units_processed" => results.units_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "skipped" => results.units_skipped,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );

    Ok(results)
}

/// Analyse one unit under its logging context; `false` when the batch should stop
fn process_one<S: UnitSource>(
    index: usize,
    source: S,
    preferences: &AnalysisPreferences,
    results: &mut BatchResults,
) -> bool {
    let unit = source.name();
    logging::with_unit_context(&unit, index, || match source.analyze(preferences) {
        Ok(analysis) => {
            results.add_success(index, analysis);
            true
        }
        Err(error) => {
            crate::log_error!(codes::batch::UNIT_ANALYSIS_FAILED, "Unit analysis failed",
                "unit" => unit,
                "unit_id" => index,
                "code" => error.code()
            );
            results.add_failure(index, unit.clone(), error);
            false
        }
    })
}

fn process_sequential<S: UnitSource>(sources: Vec<S>, config: &BatchConfig) -> BatchResults {
    let mut results = BatchResults::new();
    let total = sources.len();

    for (index, source) in sources.into_iter().enumerate() {
        if config.is_cancelled() {
            crate::log_warning!("Batch cancelled", "remaining" => total - index);
            break;
        }
        if config.progress_reporting {
            println!("Analyzing unit {} of {}: {}", index + 1, total, source.name());
        }

        let succeeded = process_one(index, source, &config.preferences, &mut results);
        if !succeeded && config.fail_fast {
            crate::log_warning!("Fail-fast mode enabled, stopping batch analysis");
            break;
        }
    }

    results
}

fn process_parallel<S: UnitSource>(
    sources: Vec<S>,
    config: &BatchConfig,
    threads: usize,
) -> Result<BatchResults, BatchError> {
    let chunk_size = calculate_chunk_size(sources.len(), threads);
    crate::log_debug!("Parallel batch configuration",
        "total_units" => sources.len(),
        "chunk_size" => chunk_size,
        "threads" => threads
    );

    let stop = Arc::new(AtomicBool::new(false));
    let mut results = BatchResults::new();
    let mut pending: Vec<(usize, S)> = sources.into_iter().enumerate().collect();

    while !pending.is_empty() {
        let rest = pending.split_off(chunk_size.min(pending.len()));
        let chunk = std::mem::replace(&mut pending, rest);
        results.merge(process_chunk_parallel(chunk, config, threads, &stop)?);

        if stop.load(Ordering::Relaxed) || config.is_cancelled() {
            crate::log_warning!("Stopping batch analysis early",
                "fail_fast" => config.fail_fast,
                "cancelled" => config.is_cancelled()
            );
            break;
        }
    }

    Ok(results)
}

/// Split one chunk across worker threads
fn process_chunk_parallel<S: UnitSource>(
    chunk: Vec<(usize, S)>,
    config: &BatchConfig,
    threads: usize,
    stop: &Arc<AtomicBool>,
) -> Result<BatchResults, BatchError> {
    let results = Arc::new(Mutex::new(BatchResults::new()));
    let per_thread = (chunk.len() + threads - 1) / threads;

    let mut handles = Vec::new();
    let mut remaining = chunk;
    while !remaining.is_empty() {
        let rest = remaining.split_off(per_thread.min(remaining.len()));
        let thread_units = std::mem::replace(&mut remaining, rest);

        let results = Arc::clone(&results);
        let stop = Arc::clone(stop);
        let preferences = config.preferences.clone();
        let cancel = config.cancel.clone();
        let fail_fast = config.fail_fast;

        handles.push(thread::spawn(move || {
            for (index, source) in thread_units {
                let cancelled = cancel
                    .as_ref()
                    .map_or(false, |flag| flag.load(Ordering::Relaxed));
                if cancelled || stop.load(Ordering::Relaxed) {
                    break;
                }

                let mut local = BatchResults::new();
                let succeeded = process_one(index, source, &preferences, &mut local);
                lock(&results).merge(local);

                if !succeeded && fail_fast {
                    stop.store(true, Ordering::Relaxed);
                }
            }
        }));
    }

    for handle in handles {
        handle.join().map_err(|_| BatchError::ThreadError {
            message: "Worker panicked during analysis".to_string(),
        })?;
    }

    let results = Arc::try_unwrap(results).map_err(|_| BatchError::ThreadError {
        message: "Failed to collect results from workers".to_string(),
    })?;
    Ok(results
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner()))
}

fn lock(results: &Mutex<BatchResults>) -> MutexGuard<'_, BatchResults> {
    results
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Units per chunk: spread evenly over the threads, bounded for memory
fn calculate_chunk_size(units: usize, threads: usize) -> usize {
    const MIN_CHUNK_SIZE: usize = 1;

    let ideal_chunk_size = (units + threads - 1) / threads;
    ideal_chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Analyse units already in memory
pub fn analyze_units(units: Vec<AnalysisUnit>, config: &BatchConfig) -> Result<BatchResults, BatchError> {
    run_batch(units, config)
}

/// Discover token dumps under `dir_path` and analyse each one
pub fn process_directory(dir_path: &Path, config: &BatchConfig) -> Result<BatchResults, BatchError> {
    let files = discover_token_dumps(dir_path, config)?;
    run_batch(files, config)
}

/// Analyse an explicit list of token dump files
pub fn process_files(files: Vec<PathBuf>, config: &BatchConfig) -> Result<BatchResults, BatchError> {
    run_batch(files, config)
}
