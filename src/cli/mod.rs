//! Command-line interface implementation
//!
//! Arguments are mode selectors and file paths, interleaved. A selector applies
//! to every file listed after it.

mod batch;

use clap::Parser;
use log::{error, info, warn};
use std::process::ExitCode;

use crate::config::load_config;
use crate::migrate::{migrate_file, MigrateOptions};

pub use batch::{expand_target, plan_batch, BatchPlan, Job};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

const USAGE: &str = "\
Usage: animate-upgrade [MODE|FILE]...

Migrates legacy pixi-animate exports in place to class-based modules.
Each mode selector applies to the files listed after it.

Modes:
  -c, --commonjs      module.exports = data; (default)
  -e, --es6           export default data;
  -a, --es6-autorun   import the runtime, run setup and export every library class

Options:
  -h, --help          Print this help and exit

Shape files referenced by each migrated file are updated as well.
Defaults may be set in animate-upgrade.toml; RUST_LOG controls log output.
";

/// Upgrade legacy pixi-animate exports to class-based modules
#[derive(Parser, Debug)]
#[command(name = "animate-upgrade")]
#[command(about = "Upgrade legacy pixi-animate exports to class-based modules")]
#[command(version, disable_help_flag = true)]
pub struct Cli {
    /// Mode selectors and files or glob patterns to migrate
    #[arg(value_name = "MODE|FILE", allow_hyphen_values = true, trailing_var_arg = true)]
    pub args: Vec<String>,
}

/// The usage text printed for help and for an empty invocation.
pub fn usage() -> &'static str {
    USAGE
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let jobs = match plan_batch(&cli.args) {
        BatchPlan::Help => {
            print!("{}", USAGE);
            return ExitCode::from(EXIT_SUCCESS);
        }
        BatchPlan::Jobs(jobs) if jobs.is_empty() => {
            eprint!("{}", USAGE);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        BatchPlan::Jobs(jobs) => jobs,
    };

    let config = match load_config(None) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    run_batch(&jobs, &MigrateOptions::from_config(&config))
}

fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    // A logger may already be installed when embedded; keep it.
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).format_target(false).try_init();
}

/// Migrate every job in order. One failure never stops the batch.
fn run_batch(jobs: &[Job], defaults: &MigrateOptions) -> ExitCode {
    let mut migrated = 0usize;
    let mut failed = 0usize;

    for job in jobs {
        let paths = expand_target(&job.target);
        if paths.is_empty() {
            error!("No files match '{}'", job.target);
            failed += 1;
            continue;
        }

        let options = job.mode.map_or_else(|| defaults.clone(), |mode| defaults.with_mode(mode));
        for path in paths {
            match migrate_file(&path, &options) {
                Ok(report) => {
                    migrated += 1;
                    let shape_failures = report.shape_failures();
                    if shape_failures > 0 {
                        warn!("{}: {} shape file(s) could not be migrated", report.path.display(), shape_failures);
                        failed += 1;
                    }
                }
                Err(e) => {
                    match e.path() {
                        Some(_) => error!("{}", e),
                        None => error!("{}: {}", path.display(), e),
                    }
                    failed += 1;
                }
            }
        }
    }

    info!("{} file(s) migrated, {} failure(s)", migrated, failed);

    if failed > 0 {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}
