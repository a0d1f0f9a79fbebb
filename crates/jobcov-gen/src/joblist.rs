//! Job list post-processing
//!
//! Helpers that reorder or shrink a generated job list after the fact. Regexes
//! match against [`Job::display_name`] and are anchored at the start of the
//! name.

use crate::combination::Job;
use crate::error::{Error, Result};
use crate::parameter::Value;
use regex::Regex;

/// Move the first job that holds every `(field, value)` of `searched` to
/// `position` (clamped to the list length)
///
/// Returns `false` and leaves the list untouched when no job matches.
///
/// # Errors
///
/// Returns [`Error::EmptySearch`] if `searched` is empty.
pub fn search_and_move_job(
    jobs: &mut Vec<Job>,
    searched: &[(&str, Value)],
    position: usize,
) -> Result<bool> {
    if searched.is_empty() {
        return Err(Error::EmptySearch);
    }
    let Some(index) = jobs.iter().position(|job| {
        searched
            .iter()
            .all(|(field, value)| job.matches(field, value))
    }) else {
        return Ok(false);
    };
    let job = jobs.remove(index);
    let position = position.min(jobs.len());
    jobs.insert(position, job);
    Ok(true)
}

fn matches_at_start(regex: &Regex, name: &str) -> bool {
    regex.find(name).is_some_and(|m| m.start() == 0)
}

/// Jobs whose display name matches `pattern`
///
/// # Errors
///
/// Returns [`Error::Pattern`] if `pattern` is not a valid regex.
pub fn filter_jobs(jobs: &[Job], pattern: &str) -> Result<Vec<Job>> {
    let regex = Regex::new(pattern)?;
    Ok(jobs
        .iter()
        .filter(|job| matches_at_start(&regex, &job.display_name()))
        .cloned()
        .collect())
}

/// Reorder by a whitespace-separated regex list
///
/// Jobs matching the first regex come first, then those matching the second,
/// and so on; jobs matching none keep their relative order at the end. Jobs
/// matched by the same regex also keep their relative order.
///
/// # Errors
///
/// Returns [`Error::Pattern`] if one of the regexes is invalid.
pub fn reorder_jobs(jobs: Vec<Job>, patterns: &str) -> Result<Vec<Job>> {
    let regexes = patterns
        .split_whitespace()
        .map(Regex::new)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut jobs = jobs;
    for regex in regexes.iter().rev() {
        let (front, back): (Vec<Job>, Vec<Job>) = jobs
            .into_iter()
            .partition(|job| matches_at_start(regex, &job.display_name()));
        jobs = front;
        jobs.extend(back);
    }
    Ok(jobs)
}
