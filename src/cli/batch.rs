//! Planning of a batch from interleaved mode selectors and file arguments

use glob::glob;
use log::warn;
use std::path::PathBuf;

use crate::models::OutputMode;

/// One file argument and the mode in effect when it was listed.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Path or glob pattern, as given.
    pub target: String,
    /// `None` until a selector appears; the configured default applies.
    pub mode: Option<OutputMode>,
}

/// What an argument list asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchPlan {
    Help,
    Jobs(Vec<Job>),
}

enum Token<'a> {
    Mode(OutputMode),
    Help,
    Target(&'a str),
}

fn classify(arg: &str) -> Token<'_> {
    match arg {
        "-c" | "--commonjs" => Token::Mode(OutputMode::Commonjs),
        "-e" | "--es6" => Token::Mode(OutputMode::Es6),
        "-a" | "--es6-autorun" => Token::Mode(OutputMode::Es6Autorun),
        "-h" | "--help" => Token::Help,
        other => Token::Target(other),
    }
}

/// Assign each file argument the mode selected before it.
///
/// A help token anywhere wins over every file.
///
/// # Examples
///
/// ```
/// use animate_upgrade::cli::{plan_batch, BatchPlan, Job};
/// use animate_upgrade::models::OutputMode;
///
/// let args = vec!["a.js".to_string(), "-e".to_string(), "b.js".to_string()];
/// assert_eq!(
///     plan_batch(&args),
///     BatchPlan::Jobs(vec![
///         Job { target: "a.js".into(), mode: None },
///         Job { target: "b.js".into(), mode: Some(OutputMode::Es6) },
///     ])
/// );
/// ```
pub fn plan_batch(args: &[String]) -> BatchPlan {
    let mut mode = None;
    let mut jobs = Vec::new();
    for arg in args {
        match classify(arg) {
            Token::Mode(selected) => mode = Some(selected),
            Token::Help => return BatchPlan::Help,
            Token::Target(target) => jobs.push(Job { target: target.to_string(), mode }),
        }
    }
    BatchPlan::Jobs(jobs)
}

/// Resolve a file argument to paths.
///
/// Arguments containing `*`, `?` or `[` are glob patterns and expand in sorted
/// order; anything else is taken literally.
pub fn expand_target(target: &str) -> Vec<PathBuf> {
    if !target.contains(['*', '?', '[']) {
        return vec![PathBuf::from(target)];
    }

    match glob(target) {
        Ok(paths) => {
            let mut found: Vec<PathBuf> = paths.filter_map(Result::ok).filter(|p| p.is_file()).collect();
            found.sort();
            found
        }
        Err(e) => {
            warn!("'{}' is not a valid pattern ({}); treating it as a path", target, e);
            vec![PathBuf::from(target)]
        }
    }
}
