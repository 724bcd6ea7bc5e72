use std::collections::BTreeMap;

use crate::config::{HarnessConfig, RecordError};
use crate::io::input_reader::non_blank_lines;

use thiserror::Error;
use tracing::{debug, error};

/// Expected output records, keyed by the 1-based test case index.
pub type ExpectedOutputs<O> = BTreeMap<usize, Vec<O>>;

#[derive(Debug, Error)]
pub enum OutputReaderError {
    #[error("Line {} contains an invalid output record: {source}", lineno + 1)]
    InvalidRecord {
        lineno: usize,
        #[source]
        source: RecordError,
    },

    #[error("Line {} refers to test case 0, but test cases are numbered from 1", lineno + 1)]
    ZeroIndex { lineno: usize },
}

/// Parses every non-blank line into a `(index, record)` pair and groups the records by index,
/// keeping the file order within each index.
pub fn read_outputs<I, O>(
    text: &str,
    config: &HarnessConfig<I, O>,
) -> Result<ExpectedOutputs<O>, OutputReaderError> {
    let mut outputs = ExpectedOutputs::new();
    let mut errors = Vec::new();

    for line in non_blank_lines(text) {
        match (config.parse_output)(&line.text) {
            Ok((0, _)) => errors.push(OutputReaderError::ZeroIndex {
                lineno: line.lineno,
            }),
            Ok((index, record)) => outputs.entry(index).or_insert_with(Vec::new).push(record),
            Err(source) => errors.push(OutputReaderError::InvalidRecord {
                lineno: line.lineno,
                source,
            }),
        }
    }

    if !errors.is_empty() {
        for e in &errors {
            error!(" {e}");
        }
        return Err(errors.remove(0));
    }

    debug!("Read expected outputs for {} test cases", outputs.len());
    Ok(outputs)
}
