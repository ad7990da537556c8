//! `milkprice` command line: prices purchases from a JSON snapshot.

pub mod commands;
pub mod snapshot;

pub use commands::{Cli, Command, run};
pub use snapshot::{LoadedSnapshot, Snapshot};
