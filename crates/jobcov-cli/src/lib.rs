//! jobcov CLI library
//!
//! Library functions behind the `jobcov` binary: config loading, generation
//! with post-processing, serialization and single-combination checks.

#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::struct_excessive_bools)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

use jobcov_gen::fields::{BACKENDS, BOOST, CMAKE, CXX_STANDARD, DEVICE_COMPILER, HOST_COMPILER, UBUNTU};
use jobcov_gen::{
    BackendGroup, CoverageReport, DEFAULT_PAIR_SIZE, Field, FilterChain, Job, JobGenerator,
    ParameterMatrix, RunSpec, Value, filter_jobs, generate_batch, reorder_jobs,
    search_and_move_job, verify_coverage,
};
use jobcov_rules::names;
use jobcov_rules::{
    ValidationReport, alpaka_filter_chain, missing_special_fields, parse_backend_arg,
    parse_compiler_arg, validate_assignments,
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, info};

/// Matrix configuration file
///
/// ```yaml
/// pair_size: 2
/// fields:
///   - name: HOST_COMPILER
///     values:
///       - {name: gcc, version: 10}
///   - name: BACKENDS
///     values:
///       - - {name: alpaka_ACC_GPU_CUDA_ENABLE, version: "11.4"}
/// job_filter: "gcc"
/// reorder: "nvcc clang"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixConfig {
    /// Tuple size to cover
    #[serde(default = "default_pair_size")]
    pub pair_size: usize,
    /// Fields in matrix order
    pub fields: Vec<Field>,
    /// Keep only jobs whose display name matches this regex
    #[serde(default)]
    pub job_filter: Option<String>,
    /// Space separated regexes; matching jobs move to the front in this order
    #[serde(default)]
    pub reorder: Option<String>,
    /// Jobs to move to fixed positions, applied after filter and reorder
    #[serde(default)]
    pub move_jobs: Vec<MoveRule>,
}

fn default_pair_size() -> usize {
    DEFAULT_PAIR_SIZE
}

/// Move the first job carrying all `search` assignments to `position`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoveRule {
    /// Target index, clamped to the job list
    pub position: usize,
    /// Required assignments
    pub search: Vec<SearchEntry>,
}

/// One `field = value` assignment of a [`MoveRule`]
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchEntry {
    /// Field identifier
    pub field: String,
    /// Value the job must carry
    pub value: Value,
}

/// Parse a matrix configuration from YAML
pub fn parse_config(yaml: &str) -> Result<MatrixConfig, String> {
    serde_yaml::from_str(yaml).map_err(|e| format!("Error parsing config: {e}"))
}

/// Load a matrix configuration file
pub fn load_config(path: &Path) -> Result<MatrixConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading config {}: {e}", path.display()))?;
    parse_config(&content)
}

/// Validate the configured fields into a matrix
pub fn build_matrix(config: &MatrixConfig) -> Result<ParameterMatrix, String> {
    ParameterMatrix::new(config.fields.clone()).map_err(|e| e.to_string())
}

/// Options of one `generate` run; `None` falls back to the config
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Overrides the configured pair size
    pub pair_size: Option<usize>,
    /// Generate without the built-in alpaka rules
    pub no_rules: bool,
    /// Overrides the configured job filter
    pub filter: Option<String>,
    /// Overrides the configured reorder list
    pub reorder: Option<String>,
    /// Fail unless every required tuple is covered
    pub verify: bool,
}

/// Result of a `generate` run
#[derive(Debug)]
pub struct GenerateOutcome {
    /// Post-processed job list
    pub jobs: Vec<Job>,
    /// Coverage of the list before filtering
    pub coverage: CoverageReport,
    /// Non-fatal findings, e.g. missing special fields
    pub warnings: Vec<String>,
}

/// Chain used for a run
pub fn filter_chain(no_rules: bool) -> FilterChain {
    if no_rules {
        FilterChain::new()
    } else {
        alpaka_filter_chain()
    }
}

/// Generate, verify and post-process a job list
pub fn generate(config: &MatrixConfig, options: &GenerateOptions) -> Result<GenerateOutcome, String> {
    let matrix = build_matrix(config)?;
    let chain = filter_chain(options.no_rules);
    let pair_size = options.pair_size.unwrap_or(config.pair_size);

    let mut warnings = if options.no_rules {
        Vec::new()
    } else {
        missing_special_fields(&matrix)
    };
    for (filter, field) in chain.undeclared_fields(&matrix) {
        debug!(filter = %filter, field = %field, "filter inspects a field the matrix does not define");
    }

    let (jobs, registry) = JobGenerator::new(&matrix, &chain)
        .with_pair_size(pair_size)
        .generate_with_registry()
        .map_err(|e| e.to_string())?;
    let coverage = verify_coverage(&jobs, &registry);
    if options.verify && !coverage.is_complete() {
        let missing: Vec<String> = coverage
            .missing
            .iter()
            .map(|m| format!("  {}", m.tuple))
            .collect();
        return Err(format!("Coverage check failed: {coverage}\n{}", missing.join("\n")));
    }
    if registry.unreachable() > 0 {
        warnings.push(format!(
            "{} tuples pass the filters but have no admissible job",
            registry.unreachable()
        ));
    }

    let jobs = post_process(jobs, config, options)?;
    info!(jobs = jobs.len(), pair_size, "generated job list");
    Ok(GenerateOutcome {
        jobs,
        coverage,
        warnings,
    })
}

fn post_process(
    mut jobs: Vec<Job>,
    config: &MatrixConfig,
    options: &GenerateOptions,
) -> Result<Vec<Job>, String> {
    if let Some(pattern) = options.filter.as_ref().or(config.job_filter.as_ref()) {
        jobs = filter_jobs(&jobs, pattern).map_err(|e| e.to_string())?;
    }
    if let Some(patterns) = options.reorder.as_ref().or(config.reorder.as_ref()) {
        jobs = reorder_jobs(jobs, patterns).map_err(|e| e.to_string())?;
    }
    for rule in &config.move_jobs {
        let search: Vec<(&str, Value)> = rule
            .search
            .iter()
            .map(|entry| (entry.field.as_str(), entry.value.clone()))
            .collect();
        let moved =
            search_and_move_job(&mut jobs, &search, rule.position).map_err(|e| e.to_string())?;
        debug!(position = rule.position, moved, "move rule applied");
    }
    Ok(jobs)
}

/// Format jobs as YAML
pub fn jobs_to_yaml(jobs: &[Job]) -> Result<String, String> {
    serde_yaml::to_string(jobs).map_err(|e| format!("Error serializing to YAML: {e}"))
}

/// Format jobs as JSON
pub fn jobs_to_json(jobs: &[Job]) -> Result<String, String> {
    serde_json::to_string_pretty(jobs).map_err(|e| format!("Error serializing to JSON: {e}"))
}

/// SHA-256 of the compact JSON form of a job list
pub fn fingerprint(jobs: &[Job]) -> Result<String, String> {
    let json = serde_json::to_vec(jobs).map_err(|e| format!("Error serializing to JSON: {e}"))?;
    let mut hasher = Sha256::new();
    hasher.update(&json);
    Ok(hex::encode(hasher.finalize()))
}

/// Arguments of the `check` command
#[derive(Debug, Clone, Default)]
pub struct CheckArgs {
    /// `name@version`
    pub host_compiler: Option<String>,
    /// `name@version`
    pub device_compiler: Option<String>,
    /// `name@version` or bare backend names
    pub backends: Vec<String>,
    /// Ubuntu release
    pub ubuntu: Option<String>,
    /// CMake version
    pub cmake: Option<String>,
    /// Boost version
    pub boost: Option<String>,
    /// C++ standard
    pub cxx: Option<String>,
}

/// Validate one hand-written combination against the built-in rules
pub fn check_combination(args: &CheckArgs) -> Result<ValidationReport, String> {
    let mut assignments: Vec<(&str, Value)> = Vec::new();
    if let Some(host) = &args.host_compiler {
        let value = parse_compiler_arg(host).map_err(|e| e.to_string())?;
        assignments.push((HOST_COMPILER, Value::Parameter(value)));
    }
    if let Some(device) = &args.device_compiler {
        let value = parse_compiler_arg(device).map_err(|e| e.to_string())?;
        assignments.push((DEVICE_COMPILER, Value::Parameter(value)));
    }
    if !args.backends.is_empty() {
        let flags = args
            .backends
            .iter()
            .map(|backend| parse_backend_arg(backend))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;
        assignments.push((BACKENDS, Value::Backends(BackendGroup::new(flags))));
    }
    let software = [
        (UBUNTU, names::UBUNTU, &args.ubuntu),
        (CMAKE, names::CMAKE, &args.cmake),
        (BOOST, names::BOOST, &args.boost),
        (CXX_STANDARD, names::CXX, &args.cxx),
    ];
    for (field, name, version) in software {
        if let Some(version) = version {
            jobcov_rules::Version::parse(version).map_err(|e| format!("--{name}: {e}"))?;
            assignments.push((field, Value::parameter(name, version.as_str())));
        }
    }
    validate_assignments(&assignments).map_err(|e| e.to_string())
}

/// Job count for one pair size of a `stats` run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSizeStats {
    /// Tuple size
    pub pair_size: usize,
    /// Number of jobs, or the run's error
    pub jobs: Result<usize, String>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

/// Job counts for pair sizes `1..=max`, generated as a parallel batch
pub fn pair_size_stats(
    config: &MatrixConfig,
    max: usize,
    no_rules: bool,
) -> Result<Vec<PairSizeStats>, String> {
    let matrix = build_matrix(config)?;
    let chain = filter_chain(no_rules);
    let runs: Vec<RunSpec<'_>> = (1..=max)
        .map(|pair_size| RunSpec::new(&matrix, &chain, pair_size))
        .collect();
    Ok(generate_batch(&runs)
        .into_iter()
        .map(|result| PairSizeStats {
            pair_size: result.pair_size,
            jobs: result.jobs.map(|jobs| jobs.len()).map_err(|e| e.to_string()),
            duration_ms: result.duration_ms,
        })
        .collect())
}
