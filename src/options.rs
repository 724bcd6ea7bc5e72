use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Problem {
    Slalom,
    Ranking,
}

/// Checks a solution against the test cases of a contest problem.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Opts {
    /// Problem whose solution is checked
    #[arg(value_enum)]
    pub problem: Problem,

    /// Input file, relative to `--dir`
    pub input: String,

    /// Expected output file, relative to `--dir`
    pub output: String,

    /// Directory the files are looked up in
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// The input does not start with the number of test cases
    #[arg(long)]
    pub no_count: bool,

    /// Treat parse warnings as errors
    #[arg(short, long)]
    pub paranoid: bool,

    /// Print failures as JSON lines
    #[arg(long)]
    pub json: bool,

    #[arg(short, long)]
    pub quiet: bool,
}

impl Opts {
    pub fn process() -> Self {
        let opts = Opts::parse();

        if !opts.quiet {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_max_level(tracing::Level::INFO)
                .without_time()
                .init();
        }

        opts
    }
}
