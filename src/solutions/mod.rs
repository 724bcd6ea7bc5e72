//! Solutions of contest problems, checked with the harness.

pub mod ranking;
pub mod slalom;
