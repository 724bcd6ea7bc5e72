use std::cell::{Cell, RefCell};
use std::fmt::{self, Debug, Display, Formatter};

use crate::checks::validator::validate;
use crate::config::HarnessConfig;
use crate::io::{
    classifier::Layout,
    input_reader::{InputReaderError, TestGroup, read_groups},
    loader::{LoadError, Loader},
    output_reader::{ExpectedOutputs, OutputReaderError, read_outputs},
};

use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Failed to read input `{name}`: {source}")]
    Input {
        name: String,
        #[source]
        source: InputReaderError,
    },

    #[error("Failed to read expected output `{name}`: {source}")]
    Output {
        name: String,
        #[source]
        source: OutputReaderError,
    },

    #[error("Input holds {inputs} test cases, but expected output covers {outputs}")]
    CountMismatch { inputs: usize, outputs: usize },

    #[error("No expected output for test case {index}")]
    MissingExpectedOutput { index: usize },
}

/// A test case whose produced output differs from the expected one.
#[derive(Debug)]
pub struct Failure<'a, I, O> {
    pub index: usize,
    pub input: &'a TestGroup<I>,
    pub expected: &'a [O],
    pub actual: Vec<O>,
}

impl<I: Debug, O: Debug> Failure<'_, I, O> {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "index": self.index,
            "input": self.input.records().iter().map(|r| format!("{r:?}")).collect::<Vec<_>>(),
            "expected": self.expected.iter().map(|r| format!("{r:?}")).collect::<Vec<_>>(),
            "actual": self.actual.iter().map(|r| format!("{r:?}")).collect::<Vec<_>>(),
        })
    }
}

impl<I: Debug, O: Debug> Display for Failure<'_, I, O> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Test case {} failed", self.index)?;
        writeln!(f, "  input:    {:?}", self.input.records())?;
        writeln!(f, "  expected: {:?}", self.expected)?;
        write!(f, "  actual:   {:?}", self.actual)
    }
}

/// Result of a single run over all test cases.
#[derive(Debug)]
pub struct RunReport<'a, I, O> {
    pub executed: usize,
    pub failures: Vec<Failure<'a, I, O>>,
}

impl<I, O> RunReport<'_, I, O> {
    pub fn passed(&self) -> usize {
        self.executed - self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Input test cases and expected outputs of one problem, ready to check solutions against.
///
/// A `Harness` only exists after loading, parsing, and validating both files succeeded.
pub struct Harness<I, O> {
    config: HarnessConfig<I, O>,
    layout: Layout,
    groups: Vec<TestGroup<I>>,
    expected: ExpectedOutputs<O>,
    num_tests: usize,
    executed: Cell<usize>,
    error_inputs: RefCell<Vec<usize>>,
}

impl<I, O> Harness<I, O> {
    /// Loads both resources through `loader`, then parses and validates them.
    pub fn initialize(
        loader: &Loader,
        input_name: &str,
        output_name: &str,
        config: HarnessConfig<I, O>,
    ) -> Result<Self, HarnessError> {
        info!("Load input {input_name:?} and expected output {output_name:?}");
        let input = loader.load(input_name)?;
        let output = loader.load(output_name)?;
        Self::parse(input_name, &input, output_name, &output, config)
    }

    /// Same as [`Harness::initialize`], but with the file contents at hand.
    pub fn from_text(input: &str, output: &str, config: HarnessConfig<I, O>) -> Result<Self, HarnessError> {
        Self::parse("<input>", input, "<output>", output, config)
    }

    fn parse(
        input_name: &str,
        input: &str,
        output_name: &str,
        output: &str,
        config: HarnessConfig<I, O>,
    ) -> Result<Self, HarnessError> {
        let parsed = read_groups(input, &config).map_err(|source| HarnessError::Input {
            name: input_name.to_string(),
            source,
        })?;

        let expected = read_outputs(output, &config).map_err(|source| HarnessError::Output {
            name: output_name.to_string(),
            source,
        })?;

        let num_tests = validate(parsed.num_groups(), expected.len())?;
        debug!("Prepared {num_tests} test cases ({:?})", parsed.layout);

        Ok(Self {
            config,
            layout: parsed.layout,
            groups: parsed.groups,
            expected,
            num_tests,
            executed: Cell::new(0),
            error_inputs: RefCell::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &HarnessConfig<I, O> {
        &self.config
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn groups(&self) -> &[TestGroup<I>] {
        &self.groups
    }

    pub fn expected(&self) -> &ExpectedOutputs<O> {
        &self.expected
    }

    pub fn num_tests(&self) -> usize {
        self.num_tests
    }

    /// Number of test cases executed by the most recent run.
    pub fn executed(&self) -> usize {
        self.executed.get()
    }

    /// Input groups that failed during the most recent [`Harness::run_single`].
    pub fn error_inputs(&self) -> Vec<&TestGroup<I>> {
        self.error_inputs
            .borrow()
            .iter()
            .filter_map(|&index| self.groups.get(index - 1))
            .collect()
    }

    /// 1-based indices of the test cases returned by [`Harness::error_inputs`].
    pub fn error_indices(&self) -> Vec<usize> {
        self.error_inputs.borrow().clone()
    }

    fn outputs_match(&self, expected: &[O], actual: &[O]) -> bool {
        expected.len() == actual.len()
            && expected
                .iter()
                .zip(actual)
                .all(|(e, a)| self.config.outputs_equal(e, a))
    }
}

impl<I: Debug, O: Debug> Harness<I, O> {
    /// Applies `transform` to every test case and compares all produced records with the
    /// expected ones. Mismatches are logged and collected; the run always visits every test
    /// case, unless an expected output is missing.
    pub fn run_groups<F>(&self, mut transform: F) -> Result<RunReport<'_, I, O>, HarnessError>
    where
        F: FnMut(&[I]) -> Vec<O>,
    {
        self.executed.set(0);
        let mut failures = Vec::new();

        for (i, group) in self.groups.iter().enumerate() {
            let index = i + 1;
            let expected = self
                .expected
                .get(&index)
                .ok_or(HarnessError::MissingExpectedOutput { index })?;

            let actual = transform(group.records());
            self.executed.set(index);

            if !self.outputs_match(expected, &actual) {
                let failure = Failure {
                    index,
                    input: group,
                    expected: expected.as_slice(),
                    actual,
                };
                warn!("{failure}");
                failures.push(failure);
            }
        }

        Ok(self.finish(failures))
    }

    /// Applies `transform` to the first record of every test case and compares the result with
    /// the first expected record. Failing input groups are also kept for [`Harness::error_inputs`].
    pub fn run_single<F>(&self, mut transform: F) -> Result<RunReport<'_, I, O>, HarnessError>
    where
        F: FnMut(&I) -> O,
    {
        self.executed.set(0);
        self.error_inputs.borrow_mut().clear();
        let mut failures = Vec::new();

        for (i, group) in self.groups.iter().enumerate() {
            let index = i + 1;
            let Some(expected) = self.expected.get(&index).and_then(|e| e.first()) else {
                return Err(HarnessError::MissingExpectedOutput { index });
            };

            let actual = transform(group.first());
            self.executed.set(index);

            if !self.config.outputs_equal(expected, &actual) {
                let failure = Failure {
                    index,
                    input: group,
                    expected: std::slice::from_ref(expected),
                    actual: vec![actual],
                };
                warn!("{failure}");
                failures.push(failure);
                self.error_inputs.borrow_mut().push(index);
            }
        }

        Ok(self.finish(failures))
    }

    fn finish<'a>(&self, failures: Vec<Failure<'a, I, O>>) -> RunReport<'a, I, O> {
        let report = RunReport {
            executed: self.executed.get(),
            failures,
        };

        info!(
            "Passed {} of {} test cases",
            report.passed(),
            report.executed
        );

        report
    }
}
