use crate::checks::harness::HarnessError;
use tracing::debug;

/// Cross-checks the number of parsed test cases against the number of distinct indices in the
/// expected output and returns the final test count.
pub fn validate(inputs: usize, outputs: usize) -> Result<usize, HarnessError> {
    if inputs == 0 || outputs == 0 || inputs != outputs {
        return Err(HarnessError::CountMismatch { inputs, outputs });
    }

    debug!("Validated {inputs} test cases");
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_counts() {
        assert_eq!(validate(3, 3).unwrap(), 3);
    }

    #[test]
    fn mismatch() {
        let err = validate(3, 2).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::CountMismatch {
                inputs: 3,
                outputs: 2
            }
        ));

        let msg = err.to_string();
        assert!(msg.contains('3') && msg.contains('2'), "{msg}");
    }

    #[test]
    fn zero() {
        assert!(validate(0, 0).is_err());
        assert!(validate(0, 1).is_err());
        assert!(validate(1, 0).is_err());
    }
}
