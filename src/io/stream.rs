use std::{
    fs::File,
    io::{BufRead, BufReader},
    iter::Enumerate,
    path::Path,
};

use crate::config::HarnessConfig;
use crate::io::classifier::Layout;
use crate::io::input_reader::{BlockReader, InputReaderError, Line, TestGroup};

use tracing::{debug, warn};

/// Non-blank, trimmed lines of a reader.
pub(crate) struct StreamLines<R> {
    lines: Enumerate<std::io::Lines<R>>,
}

impl<R: BufRead> StreamLines<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            lines: reader.lines().enumerate(),
        }
    }
}

impl<R: BufRead> Iterator for StreamLines<R> {
    type Item = Result<Line, InputReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        for (lineno, line) in self.lines.by_ref() {
            match line {
                Ok(line) => {
                    let text = line.trim();
                    if !text.is_empty() {
                        return Some(Ok(Line {
                            lineno,
                            text: text.to_string(),
                        }));
                    }
                }
                Err(e) => return Some(Err(e.into())),
            }
        }

        None
    }
}

/// Reads test cases lazily from a reader. Since the layout cannot be detected without seeing
/// the whole input, it has to be provided by the caller.
///
/// The reader is dropped as soon as the last group was produced or an error occurred.
pub struct GroupStream<'a, R, I, O> {
    blocks: Option<BlockReader<StreamLines<R>>>,
    config: &'a HarnessConfig<I, O>,
}

impl<'a, I, O> GroupStream<'a, BufReader<File>, I, O> {
    pub fn open(
        path: &Path,
        layout: Layout,
        config: &'a HarnessConfig<I, O>,
    ) -> Result<Self, InputReaderError> {
        debug!("Stream test cases from {path:?}");
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), layout, config))
    }
}

impl<'a, R: BufRead, I, O> GroupStream<'a, R, I, O> {
    pub fn new(reader: R, layout: Layout, config: &'a HarnessConfig<I, O>) -> Self {
        Self {
            blocks: Some(BlockReader::new(
                StreamLines::new(reader),
                layout,
                config.leading_count,
                config.group_markers,
            )),
            config,
        }
    }

    /// True once the underlying reader has been released.
    pub fn is_closed(&self) -> bool {
        self.blocks.is_none()
    }

    fn close(&mut self) -> Result<(), InputReaderError> {
        let Some(mut blocks) = self.blocks.take() else {
            return Ok(());
        };

        for w in &blocks.warnings {
            warn!(" {w}");
        }

        if self.config.paranoid && !blocks.warnings.is_empty() {
            return Err(InputReaderError::Warning(blocks.warnings.remove(0)));
        }

        Ok(())
    }
}

impl<R: BufRead, I, O> Iterator for GroupStream<'_, R, I, O> {
    type Item = Result<TestGroup<I>, InputReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        let blocks = self.blocks.as_mut()?;

        match blocks.next() {
            Some(Ok(block)) => match TestGroup::build(block, &self.config.parse_input) {
                Ok(group) => Some(Ok(group)),
                Err(e) => {
                    self.blocks = None;
                    Some(Err(e.into()))
                }
            },
            Some(Err(e)) => {
                self.blocks = None;
                Some(Err(e))
            }
            None => self.close().err().map(Err),
        }
    }
}
