//! LM Canvas command-line tools
//!
//! Library half of the `lmcanvas` binary: configuration and the work behind
//! each subcommand.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod commands;
pub mod config;
pub mod demo;

pub use commands::{describe_graph, linearize, SnapshotReport};
pub use config::{CliConfig, ConfigError, PersistenceSettings};
pub use demo::{run_demo, DemoReport, EchoAdapter};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
