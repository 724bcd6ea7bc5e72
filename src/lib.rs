pub mod checks;
pub mod config;
pub mod io;
pub mod options;
pub mod solutions;

pub use checks::harness::{Failure, Harness, HarnessError, RunReport};
pub use config::HarnessConfig;
