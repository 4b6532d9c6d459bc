//! animate-upgrade - Migrate legacy pixi-animate library exports
//!
//! This library provides functionality to:
//! - Recover the library setup block, asset manifest and stage data of a legacy export
//! - Convert `MovieClip.extend(...)` / `Container.extend(...)` definitions into classes
//! - Emit the result as a CommonJS or ES6 module
//! - Migrate referenced shape files to the new drawing command codes

pub mod classes;
pub mod cli;
pub mod config;
pub mod emit;
pub mod error;
pub mod manifest;
pub mod migrate;
pub mod models;
pub mod references;
pub mod scan;
pub mod shapes;

pub use error::MigrateError;
pub use migrate::{migrate_file, migrate_source, MigrateOptions, MigratedModule};
