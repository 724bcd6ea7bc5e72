use std::fmt;

/// Error produced by a user supplied record parser.
pub type RecordError = Box<dyn std::error::Error + Send + Sync>;

pub type InputParser<I> = Box<dyn Fn(&str) -> Result<I, RecordError>>;
pub type OutputParser<O> = Box<dyn Fn(&str) -> Result<(usize, O), RecordError>>;
pub type Equality<O> = Box<dyn Fn(&O, &O) -> bool>;

/// Describes how a pair of contest files is turned into typed records and how
/// produced records are compared against the expected ones.
///
/// # Example
/// ```
/// use vpwharness::{HarnessConfig, Harness};
///
/// let config = HarnessConfig::new(
///     |line| Ok(line.parse::<i64>()?),
///     |line| {
///         let (index, rest) = vpwharness::io::fields::split_index(line)?;
///         Ok((index, rest.parse::<i64>()?))
///     },
/// );
///
/// let harness = Harness::from_text("2\n3\n4", "1 9\n2 16", config).unwrap();
/// assert_eq!(harness.num_tests(), 2);
/// ```
pub struct HarnessConfig<I, O> {
    pub(crate) parse_input: InputParser<I>,
    pub(crate) parse_output: OutputParser<O>,
    pub(crate) equality: Equality<O>,
    pub(crate) leading_count: bool,
    pub(crate) group_markers: bool,
    pub(crate) paranoid: bool,
}

impl<I, O: PartialEq + 'static> HarnessConfig<I, O> {
    /// Creates a configuration comparing outputs with [`PartialEq`]. The input is expected to
    /// start with a test count line and group markers are recognized.
    pub fn new(
        parse_input: impl Fn(&str) -> Result<I, RecordError> + 'static,
        parse_output: impl Fn(&str) -> Result<(usize, O), RecordError> + 'static,
    ) -> Self {
        Self {
            parse_input: Box::new(parse_input),
            parse_output: Box::new(parse_output),
            equality: Box::new(|a: &O, b: &O| a == b),
            leading_count: true,
            group_markers: true,
            paranoid: false,
        }
    }
}

impl<I, O> HarnessConfig<I, O> {
    /// Replaces the output comparison.
    pub fn with_equality(mut self, equality: impl Fn(&O, &O) -> bool + 'static) -> Self {
        self.equality = Box::new(equality);
        self
    }

    /// The input does not start with a test count line.
    pub fn without_count_line(mut self) -> Self {
        self.leading_count = false;
        self
    }

    /// Lines holding a positive integer are never treated as group size markers.
    pub fn without_group_markers(mut self) -> Self {
        self.group_markers = false;
        self
    }

    /// In paranoid mode, parse warnings abort initialization.
    pub fn paranoid(mut self, paranoid: bool) -> Self {
        self.paranoid = paranoid;
        self
    }

    pub fn leading_count(&self) -> bool {
        self.leading_count
    }

    pub fn group_markers(&self) -> bool {
        self.group_markers
    }

    pub fn is_paranoid(&self) -> bool {
        self.paranoid
    }

    pub fn outputs_equal(&self, expected: &O, actual: &O) -> bool {
        (self.equality)(expected, actual)
    }
}

impl<I, O> fmt::Debug for HarnessConfig<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarnessConfig")
            .field("leading_count", &self.leading_count)
            .field("group_markers", &self.group_markers)
            .field("paranoid", &self.paranoid)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers() -> HarnessConfig<i64, i64> {
        HarnessConfig::new(
            |line| Ok(line.parse()?),
            |line| {
                let (index, rest) = crate::io::fields::split_index(line)?;
                Ok((index, rest.parse()?))
            },
        )
    }

    #[test]
    fn defaults() {
        let config = numbers();
        assert!(config.leading_count());
        assert!(config.group_markers());
        assert!(!config.is_paranoid());
        assert!(config.outputs_equal(&3, &3));
        assert!(!config.outputs_equal(&3, &4));
    }

    #[test]
    fn custom_equality() {
        let config = numbers().with_equality(|a, b| (a - b).abs() <= 1);
        assert!(config.outputs_equal(&3, &4));
        assert!(!config.outputs_equal(&3, &5));
    }

    #[test]
    fn builder_flags() {
        let config = numbers().without_count_line().without_group_markers().paranoid(true);
        assert!(!config.leading_count());
        assert!(!config.group_markers());
        assert!(config.is_paranoid());
    }
}
