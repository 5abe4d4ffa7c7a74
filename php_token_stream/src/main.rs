use clap::Parser;
use php_token_stream::config::RuntimeConfig;
use php_token_stream::logging::codes;
use php_token_stream::{batch, logging, pipeline};
use std::path::{Path, PathBuf};

/// Function, class and complexity report from PHP/Hack token dumps
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Token dump (`*.tokens.json`) or a directory of dumps
    input: PathBuf,

    /// Force sequential processing (no parallelism)
    #[arg(long)]
    sequential: bool,

    /// Maximum number of worker threads (default: auto)
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Don't search subdirectories
    #[arg(long)]
    no_recursive: bool,

    /// Limit the number of dumps analysed
    #[arg(long, value_name = "N")]
    max_files: Option<usize>,

    /// Stop on the first unit that fails
    #[arg(long)]
    fail_fast: bool,

    /// Suppress progress reporting
    #[arg(long)]
    quiet: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Fail a unit when any of its scopes is unbalanced
    #[arg(long)]
    strict_scopes: bool,

    /// TOML runtime configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let runtime = match &cli.config {
        Some(path) => match RuntimeConfig::load(path) {
            Ok(runtime) => runtime,
            Err(error) => {
                eprintln!("error[{}]: {}", codes::system::CONFIGURATION_ERROR, error);
                std::process::exit(1);
            }
        },
        None => RuntimeConfig::default(),
    };
    if let Err(message) = logging::init_global_logging(&runtime.logging) {
        eprintln!("error[{}]: {}", codes::system::INITIALIZATION_FAILURE, message);
        std::process::exit(1);
    }

    let config = batch_config(&cli, &runtime);

    if cli.input.is_file() {
        process_single_file(&cli.input, &config, cli.json);
    } else if cli.input.is_dir() {
        process_directory_batch(&cli.input, &config, cli.json);
    } else {
        eprintln!("Error: Input must be a token dump or a directory of dumps");
        eprintln!("  Path: {}", cli.input.display());
        std::process::exit(1);
    }
}

fn batch_config(cli: &Cli, runtime: &RuntimeConfig) -> batch::BatchConfig {
    let mut config = batch::BatchConfig {
        recursive: !cli.no_recursive,
        max_files: cli.max_files,
        progress_reporting: !cli.quiet && !cli.json,
        fail_fast: cli.fail_fast,
        preferences: runtime.analysis.clone(),
        ..batch::BatchConfig::default()
    };

    if let Some(threads) = cli.threads {
        config.max_threads = threads.max(1);
    }
    if cli.sequential {
        config.max_threads = 1;
    }
    if cli.strict_scopes {
        config.preferences.strict_scopes = true;
    }

    config
}

fn process_single_file(path: &Path, config: &batch::BatchConfig, json: bool) {
    match pipeline::analyze_dump(path, &config.preferences) {
        Ok(analysis) => {
            if json {
                print_json(&analysis);
            } else {
                print_unit(&analysis);
            }
            print_cargo_style_summary();
        }
        Err(error) => {
            eprintln!("\nFAILED [{}]: {}", error.code(), error);
            print_cargo_style_summary();
            std::process::exit(1);
        }
    }
}

fn process_directory_batch(dir_path: &Path, config: &batch::BatchConfig, json: bool) {
    if !json {
        println!("Starting batch analysis: {}", dir_path.display());
        println!(
            "Configuration: {} threads, recursive={}, fail_fast={}",
            config.max_threads, config.recursive, config.fail_fast
        );
    }

    match batch::process_directory(dir_path, config) {
        Ok(results) => {
            if json {
                let analyses: Vec<&pipeline::UnitAnalysis> = results.analyses().collect();
                print_json(&analyses);
            } else {
                for analysis in results.analyses() {
                    print_unit(analysis);
                }
                print_batch_results(&results);
            }
            print_cargo_style_summary();

            if results.failure_count() > 0 {
                std::process::exit(1);
            }
        }
        Err(error) => {
            eprintln!("Batch analysis failed [{}]: {}", error.code(), error);
            print_cargo_style_summary();
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(error) => eprintln!("Cannot serialise results: {}", error),
    }
}

fn print_unit(analysis: &pipeline::UnitAnalysis) {
    println!(
        "\n{} ({} tokens, {} lines, {} comment lines)",
        analysis.unit,
        analysis.token_count,
        analysis.lines_of_code.loc,
        analysis.lines_of_code.cloc
    );

    for class in &analysis.classes {
        println!(
            "  {} {} lines {}-{}, {} methods",
            class.kind,
            class.qualified_name(),
            class.start_line,
            class.end_line,
            class.methods.len()
        );
    }

    for function in &analysis.functions {
        println!(
            "  {:<40} lines {:>5}-{:<5} ccn {:>3}  crap(0%) {:>6.1}",
            function.qualified_name(),
            function.start_line,
            function.end_line,
            function.ccn,
            function.crap(0.0)
        );
    }

    for inclusion in &analysis.inclusions {
        println!(
            "  {:?} {} (line {})",
            inclusion.kind, inclusion.target, inclusion.start_line
        );
    }

    for diagnostic in &analysis.diagnostics {
        println!("  skipped {}", diagnostic);
    }
}

fn print_batch_results(results: &batch::BatchResults) {
    println!("\nBatch Analysis Summary:");
    println!("  Units discovered: {}", results.units_discovered);
    println!("  Units processed: {}", results.units_processed);
    println!(
        "  Successful: {} ({:.1}%)",
        results.success_count(),
        results.success_rate() * 100.0
    );
    println!("  Failed: {}", results.failure_count());
    if results.units_skipped > 0 {
        println!("  Skipped: {}", results.units_skipped);
    }
    println!(
        "  Total time: {:.2}s",
        results.processing_duration.as_secs_f64()
    );

    let functions: usize = results.analyses().map(|a| a.functions.len()).sum();
    let max_ccn = results.analyses().map(|a| a.max_ccn()).max().unwrap_or(0);
    println!("  Functions: {} (max ccn {})", functions, max_ccn);

    if results.failure_count() > 0 {
        println!("\nFailed Units:");
        for failure in &results.failed_units {
            println!("  {}: {}", failure.unit, get_error_summary(&failure.error));
        }
    }
}

fn get_error_summary(error: &pipeline::AnalysisError) -> String {
    match error {
        pipeline::AnalysisError::FileProcessing(_) => "Token dump could not be loaded".to_string(),
        pipeline::AnalysisError::TokenStream(_) => "Token stream could not be built".to_string(),
        pipeline::AnalysisError::Scope(_) => "Unbalanced scopes".to_string(),
    }
}

fn print_cargo_style_summary() {
    let summary = logging::cargo_style_summary();
    if !summary.is_empty() {
        eprintln!("\n{}", summary);
    }
}
