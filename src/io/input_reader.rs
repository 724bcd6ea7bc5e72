use std::collections::VecDeque;

use crate::config::{HarnessConfig, RecordError};
use crate::io::classifier::{Layout, classify, group_marker};

use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum InputReaderError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Error while reading input: {0}")]
    Format(#[from] FormatError),

    #[error("Warning while reading input (paranoid mode): {0}")]
    Warning(#[from] FormatWarning),
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Line {} should contain the number of test cases, but reads `{text}`", lineno + 1)]
    InvalidCountLine { lineno: usize, text: String },

    #[error("Grouped test cases require a test count line")]
    CountLineRequired,

    #[error("Input announces {expected} test cases, but ends after {found}")]
    MissingTestCases { expected: usize, found: usize },

    #[error("Line {} looks like a group of {size} lines, but grouping requires a test count line", lineno + 1)]
    GroupingUnsupported { lineno: usize, size: usize },

    #[error("Found a test case without records")]
    EmptyGroup,

    #[error("Line {} contains an invalid record: {source}", lineno + 1)]
    InvalidRecord {
        lineno: usize,
        #[source]
        source: RecordError,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum FormatWarning {
    #[error("Count line {} announces {declared} test cases, but {found} lines follow", lineno + 1)]
    CountDisagrees {
        lineno: usize,
        declared: String,
        found: usize,
    },

    #[error("Ignoring {count} lines after the last test case, starting at line {}", lineno + 1)]
    TrailingLines { lineno: usize, count: usize },
}

/// A non-blank, trimmed source line together with its 0-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub lineno: usize,
    pub text: String,
}

pub(crate) fn non_blank_lines(text: &str) -> impl Iterator<Item = Line> + '_ {
    text.lines().enumerate().filter_map(|(lineno, l)| {
        let l = l.trim();
        (!l.is_empty()).then(|| Line {
            lineno,
            text: l.to_string(),
        })
    })
}

/// The input records of one test case; never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct TestGroup<I> {
    records: Vec<I>,
    linenos: Vec<usize>,
}

impl<I> TestGroup<I> {
    pub fn records(&self) -> &[I] {
        &self.records
    }

    /// 0-based line numbers of the records.
    pub fn line_numbers(&self) -> &[usize] {
        &self.linenos
    }

    pub fn first(&self) -> &I {
        &self.records[0]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub(crate) fn build(
        block: Vec<Line>,
        parse: impl Fn(&str) -> Result<I, RecordError>,
    ) -> Result<Self, FormatError> {
        if block.is_empty() {
            return Err(FormatError::EmptyGroup);
        }

        let mut records = Vec::with_capacity(block.len());
        let mut linenos = Vec::with_capacity(block.len());

        for line in block {
            let record = parse(&line.text).map_err(|source| FormatError::InvalidRecord {
                lineno: line.lineno,
                source,
            })?;
            records.push(record);
            linenos.push(line.lineno);
        }

        Ok(Self { records, linenos })
    }
}

//////////////////////////////////////////////////////////////////

/// Cuts a stream of lines into the blocks of the individual test cases. Structural errors
/// end the iteration; warnings are collected in `warnings`.
///
/// A group marker is only honoured if enough lines follow it; otherwise the marker line is
/// a test case of its own and the lines read ahead are pushed back.
pub(crate) struct BlockReader<L> {
    lines: L,
    pending: VecDeque<Line>,
    layout: Layout,
    leading_count: bool,
    group_markers: bool,
    header: Option<Header>,
    num_blocks: usize,
    finished: bool,
    pub(crate) warnings: Vec<FormatWarning>,
}

struct Header {
    lineno: usize,
    text: String,
    declared: Option<usize>,
}

impl<L, E> BlockReader<L>
where
    L: Iterator<Item = Result<Line, E>>,
    E: From<FormatError>,
{
    pub(crate) fn new(lines: L, layout: Layout, leading_count: bool, group_markers: bool) -> Self {
        Self {
            lines,
            pending: VecDeque::new(),
            layout,
            leading_count,
            group_markers,
            header: None,
            num_blocks: 0,
            finished: false,
            warnings: Vec::new(),
        }
    }

    fn next_line(&mut self) -> Result<Option<Line>, E> {
        match self.pending.pop_front() {
            Some(line) => Ok(Some(line)),
            None => self.lines.next().transpose(),
        }
    }

    fn read_header(&mut self) -> Result<(), E> {
        if self.header.is_some() || self.layout == Layout::Ungrouped {
            return Ok(());
        }

        if !self.leading_count {
            if self.layout == Layout::GroupedWithCount {
                return Err(FormatError::CountLineRequired.into());
            }
            return Ok(());
        }

        let Some(line) = self.next_line()? else {
            self.header = Some(Header {
                lineno: 0,
                text: String::new(),
                declared: Some(0),
            });
            return Ok(());
        };

        let declared = line.text.parse::<usize>().ok();
        debug!("Count line {}: {:?}", line.lineno + 1, line.text);

        if self.layout == Layout::GroupedWithCount && declared.is_none() {
            return Err(FormatError::InvalidCountLine {
                lineno: line.lineno,
                text: line.text,
            }
            .into());
        }

        self.header = Some(Header {
            lineno: line.lineno,
            text: line.text,
            declared,
        });

        Ok(())
    }

    fn next_block(&mut self) -> Result<Option<Vec<Line>>, E> {
        self.read_header()?;

        match self.layout {
            Layout::SimpleNumeric => {
                let Some(line) = self.next_line()? else {
                    self.check_declared_count();
                    return Ok(None);
                };
                Ok(Some(vec![line]))
            }

            Layout::Ungrouped => {
                let Some(line) = self.next_line()? else {
                    return Ok(None);
                };

                if let Some(size) = self.marker(&line.text).filter(|&s| s > 1) {
                    return Err(FormatError::GroupingUnsupported {
                        lineno: line.lineno,
                        size,
                    }
                    .into());
                }

                Ok(Some(vec![line]))
            }

            Layout::GroupedWithCount => {
                let expected = self.header.as_ref().and_then(|h| h.declared).unwrap_or(0);

                if self.num_blocks == expected {
                    self.check_trailing_lines()?;
                    return Ok(None);
                }

                let Some(line) = self.next_line()? else {
                    return Err(FormatError::MissingTestCases {
                        expected,
                        found: self.num_blocks,
                    }
                    .into());
                };

                let Some(size) = self.marker(&line.text) else {
                    return Ok(Some(vec![line]));
                };

                let mut block = Vec::with_capacity(size);
                while block.len() < size {
                    match self.next_line()? {
                        Some(l) => block.push(l),
                        None => break,
                    }
                }

                if block.len() < size {
                    debug!(
                        "Line {} announces {size} lines, but only {} follow; treat it as data",
                        line.lineno + 1,
                        block.len()
                    );
                    // read ahead lines precede anything left in `pending`
                    for l in block.into_iter().rev() {
                        self.pending.push_front(l);
                    }
                    return Ok(Some(vec![line]));
                }

                Ok(Some(block))
            }
        }
    }

    fn marker(&self, text: &str) -> Option<usize> {
        if self.group_markers {
            group_marker(text)
        } else {
            None
        }
    }

    fn check_declared_count(&mut self) {
        let Some(header) = &self.header else {
            return;
        };

        if header.declared != Some(self.num_blocks) {
            self.warnings.push(FormatWarning::CountDisagrees {
                lineno: header.lineno,
                declared: header.text.clone(),
                found: self.num_blocks,
            });
        }
    }

    fn check_trailing_lines(&mut self) -> Result<(), E> {
        let Some(first) = self.next_line()? else {
            return Ok(());
        };

        let mut count = 1;
        while self.next_line()?.is_some() {
            count += 1;
        }

        self.warnings.push(FormatWarning::TrailingLines {
            lineno: first.lineno,
            count,
        });

        Ok(())
    }
}

impl<L, E> Iterator for BlockReader<L>
where
    L: Iterator<Item = Result<Line, E>>,
    E: From<FormatError>,
{
    type Item = Result<Vec<Line>, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_block() {
            Ok(Some(block)) => {
                self.num_blocks += 1;
                Some(Ok(block))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

//////////////////////////////////////////////////////////////////

/// All test cases of an input file.
#[derive(Debug)]
pub struct ParsedInput<I> {
    pub layout: Layout,
    pub groups: Vec<TestGroup<I>>,
}

impl<I> ParsedInput<I> {
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }
}

/// Collects groups, errors and warnings of a complete input text.
pub struct InputVisitor<I> {
    pub layout: Layout,
    pub groups: Vec<TestGroup<I>>,
    pub errors: Vec<FormatError>,
    pub warnings: Vec<FormatWarning>,
}

impl<I> InputVisitor<I> {
    pub fn process<O>(text: &str, config: &HarnessConfig<I, O>) -> Self {
        let lines: Vec<Line> = non_blank_lines(text).collect();
        let layout = classify(
            &lines.iter().map(|l| l.text.as_str()).collect::<Vec<_>>(),
            config.leading_count,
        );
        debug!("Classified input with {} lines as {layout:?}", lines.len());

        let mut visitor = Self {
            layout,
            groups: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        };

        let mut blocks = BlockReader::new(
            lines.into_iter().map(Ok::<_, FormatError>),
            layout,
            config.leading_count,
            config.group_markers,
        );

        for block in blocks.by_ref() {
            match block {
                Ok(block) => match TestGroup::build(block, &config.parse_input) {
                    Ok(group) => visitor.groups.push(group),
                    Err(e) => visitor.errors.push(e),
                },
                Err(e) => visitor.errors.push(e),
            }
        }

        visitor.warnings.append(&mut blocks.warnings);
        visitor
    }
}

/// Classifies and parses a complete input text. All problems are logged; the first error is
/// returned. In paranoid mode, a warning is returned as error if there are no errors.
pub fn read_groups<I, O>(
    text: &str,
    config: &HarnessConfig<I, O>,
) -> Result<ParsedInput<I>, InputReaderError> {
    let mut visitor = InputVisitor::process(text, config);

    if !visitor.errors.is_empty() || !visitor.warnings.is_empty() {
        for w in &visitor.warnings {
            warn!(" {w}");
        }

        for e in &visitor.errors {
            error!(" {e}");
        }

        if !visitor.errors.is_empty() {
            return Err(InputReaderError::Format(visitor.errors.remove(0)));
        }

        if config.paranoid {
            return Err(InputReaderError::Warning(visitor.warnings.remove(0)));
        }
    }

    Ok(ParsedInput {
        layout: visitor.layout,
        groups: visitor.groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words() -> HarnessConfig<String, String> {
        HarnessConfig::new(|line| Ok(line.to_string()), |_| Ok((1, String::new())))
    }

    fn numbers() -> HarnessConfig<i64, i64> {
        HarnessConfig::new(|line| Ok(line.parse()?), |_| Ok((1, 0)))
    }

    fn records<I: Clone>(input: &ParsedInput<I>) -> Vec<Vec<I>> {
        input.groups.iter().map(|g| g.records().to_vec()).collect()
    }

    #[test]
    fn simple_numeric_with_count() {
        let input = read_groups("3\n4\n\n5\n6\n", &numbers()).unwrap();
        assert_eq!(input.layout, Layout::SimpleNumeric);
        assert_eq!(records(&input), vec![vec![4], vec![5], vec![6]]);
        assert_eq!(input.groups[1].line_numbers(), &[3]);
    }

    #[test]
    fn simple_numeric_without_count() {
        let input = read_groups("3\n4\n5", &numbers().without_count_line()).unwrap();
        assert_eq!(input.layout, Layout::SimpleNumeric);
        assert_eq!(records(&input), vec![vec![3], vec![4], vec![5]]);
    }

    #[test]
    fn simple_numeric_groups_have_single_record() {
        let text = "5\n1\n2\n3\n4\n5";
        for config in [numbers(), numbers().without_count_line()] {
            let has_count = config.leading_count();
            let input = read_groups(text, &config).unwrap();
            assert!(input.groups.iter().all(|g| g.len() == 1));
            assert_eq!(input.num_groups(), if has_count { 5 } else { 6 });
        }
    }

    #[test]
    fn grouped_with_markers() {
        let text = "3\n2\na b\nc d\nsingle\n1\nx";
        let input = read_groups(text, &words()).unwrap();
        assert_eq!(input.layout, Layout::GroupedWithCount);
        assert_eq!(
            records(&input),
            vec![
                vec!["a b".to_string(), "c d".to_string()],
                vec!["single".to_string()],
                vec!["x".to_string()],
            ]
        );
        assert_eq!(input.groups[0].line_numbers(), &[2, 3]);
    }

    #[test]
    fn padded_marker_is_data() {
        let input = read_groups("2\n02\nfoo\n", &words()).unwrap();
        assert_eq!(
            records(&input),
            vec![vec!["02".to_string()], vec!["foo".to_string()]]
        );
    }

    #[test]
    fn markers_disabled() {
        let input = read_groups("2\n2\nfoo\n", &words().without_group_markers()).unwrap();
        assert_eq!(
            records(&input),
            vec![vec!["2".to_string()], vec!["foo".to_string()]]
        );
    }

    #[test]
    fn ungrouped() {
        let config = words().without_count_line();
        let input = read_groups("a\n1\nb c", &config).unwrap();
        assert_eq!(input.layout, Layout::Ungrouped);
        assert_eq!(input.num_groups(), 3);
    }

    #[test]
    fn trailing_lines_warn() {
        let visitor = InputVisitor::process("1\na\nb\nc", &words());
        assert_eq!(visitor.groups.len(), 1);
        assert_eq!(
            visitor.warnings,
            vec![FormatWarning::TrailingLines {
                lineno: 2,
                count: 2
            }]
        );

        assert!(read_groups("1\na\nb\nc", &words()).is_ok());
        assert!(matches!(
            read_groups("1\na\nb\nc", &words().paranoid(true)),
            Err(InputReaderError::Warning(FormatWarning::TrailingLines { .. }))
        ));
    }

    #[test]
    fn count_disagrees_warn() {
        let visitor = InputVisitor::process("5\n1\n2", &numbers());
        assert_eq!(
            visitor.warnings,
            vec![FormatWarning::CountDisagrees {
                lineno: 0,
                declared: "5".to_string(),
                found: 2
            }]
        );
    }

    #[test]
    fn invalid_records_are_all_collected() {
        let visitor = InputVisitor::process("3\nx\n1 2\ny", &numbers());
        assert_eq!(visitor.groups.len(), 0);
        assert_eq!(visitor.errors.len(), 3);
    }

    macro_rules! assert_raises_error {
        ($name : ident, $str : expr, $config : expr, $pat : pat) => {
            #[test]
            fn $name() {
                let visitor = InputVisitor::process($str, &$config);
                assert!(
                    visitor.errors.iter().any(|e| matches!(e, $pat)),
                    "Errors: {:#?}",
                    visitor.errors
                );
            }
        };
    }

    assert_raises_error!(
        invalid_count_line,
        "two\na\nb",
        words(),
        FormatError::InvalidCountLine { lineno: 0, .. }
    );

    assert_raises_error!(
        missing_test_cases,
        "3\na\nb",
        words(),
        FormatError::MissingTestCases {
            expected: 3,
            found: 2
        }
    );

    #[test]
    fn short_group_marker_is_data() {
        let visitor = InputVisitor::process("2\na\n3\nb", &words());

        assert!(visitor.errors.is_empty(), "Errors: {:#?}", visitor.errors);
        assert_eq!(
            visitor
                .groups
                .iter()
                .map(|g| g.records().to_vec())
                .collect::<Vec<_>>(),
            vec![vec!["a".to_string()], vec!["3".to_string()]]
        );
        assert_eq!(
            visitor.warnings,
            vec![FormatWarning::TrailingLines {
                lineno: 3,
                count: 1
            }]
        );
    }

    #[test]
    fn lines_read_ahead_keep_their_order() {
        let input = read_groups("3\n3\nx\n\ny", &words()).unwrap();
        assert_eq!(
            records(&input),
            vec![
                vec!["3".to_string()],
                vec!["x".to_string()],
                vec!["y".to_string()],
            ]
        );
        assert_eq!(input.groups[2].line_numbers(), &[4]);
    }

    #[test]
    fn nested_short_markers() {
        let visitor = InputVisitor::process("4\n5\n1\nx\ny", &words());
        assert_eq!(visitor.groups.len(), 3);
        assert_eq!(visitor.groups[1].records(), &["x"]);
        assert!(matches!(
            visitor.errors[..],
            [FormatError::MissingTestCases {
                expected: 4,
                found: 3
            }]
        ));
    }

    #[test]
    fn groups_are_never_empty() {
        let parse = |line: &str| -> Result<String, RecordError> { Ok(line.to_string()) };
        assert!(matches!(
            TestGroup::build(vec![], parse),
            Err(FormatError::EmptyGroup)
        ));

        let input = read_groups("2\n1\nx\ny", &words()).unwrap();
        assert!(input.groups.iter().all(|g| !g.is_empty()));
        assert_eq!(input.groups[0].first(), "x");
    }

    assert_raises_error!(
        grouping_unsupported,
        "a\n2\nb\nc",
        words().without_count_line(),
        FormatError::GroupingUnsupported { lineno: 1, size: 2 }
    );

    assert_raises_error!(
        invalid_record,
        "2\n1 2\n3 4",
        numbers(),
        FormatError::InvalidRecord { lineno: 1, .. }
    );
}
