//! animate-upgrade - Command-line tool for migrating legacy pixi-animate exports

use std::process::ExitCode;

use animate_upgrade::cli;

fn main() -> ExitCode {
    cli::run()
}
