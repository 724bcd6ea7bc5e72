use std::fmt::Debug;
use std::process::exit;

use tracing::error;
use vpwharness::{
    Harness, HarnessConfig, HarnessError,
    io::loader::Loader,
    options::{Opts, Problem},
    solutions::{ranking, slalom},
};

fn run<I: Debug, O: Debug>(
    opts: &Opts,
    loader: &Loader,
    mut config: HarnessConfig<I, O>,
    solve: fn(&[I]) -> Vec<O>,
) -> Result<bool, HarnessError> {
    config = config.paranoid(opts.paranoid);
    if opts.no_count {
        config = config.without_count_line();
    }

    let harness = Harness::initialize(loader, &opts.input, &opts.output, config)?;
    let report = harness.run_groups(solve)?;

    for failure in &report.failures {
        if opts.json {
            println!("{}", failure.to_json());
        } else {
            println!("{failure}");
        }
    }

    if !opts.json {
        println!("Passed {} of {} test cases", report.passed(), report.executed);
    }

    Ok(report.is_success())
}

fn check(opts: &Opts) -> Result<bool, HarnessError> {
    let loader = Loader::local(&opts.dir);

    match opts.problem {
        Problem::Slalom => run(opts, &loader, slalom::config(), slalom::solve),
        Problem::Ranking => run(opts, &loader, ranking::config(), ranking::solve),
    }
}

fn main() {
    let opts = Opts::process();

    match check(&opts) {
        Ok(true) => {}
        Ok(false) => exit(1),
        Err(e) => {
            error!("{e}");
            exit(1)
        }
    }
}
