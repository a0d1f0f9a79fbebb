//! jobcov CLI
//!
//! Command-line interface for generating sparse CI job matrices.

#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::fn_params_excessive_bools)]

use clap::{Parser, Subcommand, ValueEnum};
use jobcov_cli::{
    CheckArgs, GenerateOptions, check_combination, fingerprint, generate, jobs_to_json,
    jobs_to_yaml, load_config, pair_size_stats,
};
use jobcov_rules::RuleOutcome;
use jobcov_rules::names::BACKEND_NAMES;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jobcov")]
#[command(about = "Sparse CI job matrix generator", long_about = None)]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG wins
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a job list from a matrix config
    Generate {
        /// Path to matrix YAML file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Tuple size to cover, overrides the config
        #[arg(long)]
        pair_size: Option<usize>,

        /// Do not apply the built-in alpaka rules
        #[arg(long)]
        no_rules: bool,

        /// Keep only jobs whose name matches this regex
        #[arg(long)]
        filter: Option<String>,

        /// Space separated regexes; matching jobs move to the front
        #[arg(long)]
        reorder: Option<String>,

        /// Fail if any required tuple is left uncovered
        #[arg(long)]
        verify: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: Format,

        /// Write the job list to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a single combination against the built-in rules
    Check {
        /// Host compiler as name@version, e.g. gcc@10
        #[arg(long)]
        host_compiler: Option<String>,

        /// Device compiler as name@version, e.g. nvcc@11.3
        #[arg(long)]
        device_compiler: Option<String>,

        /// Backends as name@version; 0 and 1 disable and enable a backend
        #[arg(long, num_args = 1..)]
        backends: Vec<String>,

        /// Ubuntu release
        #[arg(long)]
        ubuntu: Option<String>,

        /// CMake version
        #[arg(long)]
        cmake: Option<String>,

        /// Boost version
        #[arg(long)]
        boost: Option<String>,

        /// C++ standard
        #[arg(long)]
        cxx: Option<String>,
    },

    /// Print all known backend names
    Backends,

    /// Job counts for pair sizes 1..=max
    Stats {
        /// Path to matrix YAML file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Largest pair size
        #[arg(long, default_value = "3")]
        max: usize,

        /// Do not apply the built-in alpaka rules
        #[arg(long)]
        no_rules: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            config,
            pair_size,
            no_rules,
            filter,
            reorder,
            verify,
            format,
            output,
        } => {
            let options = GenerateOptions {
                pair_size,
                no_rules,
                filter,
                reorder,
                verify,
            };
            run_generate(&config, &options, format, output);
        }
        Commands::Check {
            host_compiler,
            device_compiler,
            backends,
            ubuntu,
            cmake,
            boost,
            cxx,
        } => {
            run_check(&CheckArgs {
                host_compiler,
                device_compiler,
                backends,
                ubuntu,
                cmake,
                boost,
                cxx,
            });
        }
        Commands::Backends => {
            for backend in BACKEND_NAMES {
                println!("{backend}");
            }
        }
        Commands::Stats {
            config,
            max,
            no_rules,
        } => run_stats(&config, max, no_rules),
    }
}

fn run_generate(config: &Path, options: &GenerateOptions, format: Format, output: Option<PathBuf>) {
    let config = match load_config(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let outcome = match generate(&config, options) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    for warning in &outcome.warnings {
        eprintln!("Warning: {warning}");
    }

    let rendered = match format {
        Format::Yaml => jobs_to_yaml(&outcome.jobs),
        Format::Json => jobs_to_json(&outcome.jobs),
    };
    let rendered = match rendered {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    match &output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, &rendered) {
                eprintln!("Error writing {}: {e}", path.display());
                std::process::exit(1);
            }
        }
        None => print!("{rendered}"),
    }

    eprintln!("Generated {} jobs ({})", outcome.jobs.len(), outcome.coverage);
    match fingerprint(&outcome.jobs) {
        Ok(hash) => eprintln!("Fingerprint: sha256:{hash}"),
        Err(e) => eprintln!("{e}"),
    }
}

fn run_check(args: &CheckArgs) {
    let report = match check_combination(args) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    for warning in &report.unsupported {
        eprintln!("Warning: {warning}");
    }
    for rule in &report.rules {
        println!("{rule}");
    }
    let skipped = report
        .rules
        .iter()
        .filter(|rule| matches!(rule.outcome, RuleOutcome::Skipped { .. }))
        .count();
    if skipped > 0 {
        eprintln!("{skipped} rule(s) skipped, the combination is not fully validated");
    }
    if !report.is_valid() {
        std::process::exit(1);
    }
}

fn run_stats(config: &Path, max: usize, no_rules: bool) {
    let config = match load_config(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let stats = match pair_size_stats(&config, max, no_rules) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!("{:>9}  {:>6}  {:>8}", "pair_size", "jobs", "time_ms");
    for entry in stats {
        match entry.jobs {
            Ok(jobs) => println!("{:>9}  {jobs:>6}  {:>8}", entry.pair_size, entry.duration_ms),
            Err(e) => println!("{:>9}  error: {e}", entry.pair_size),
        }
    }
}
