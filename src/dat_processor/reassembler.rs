use serde::{Deserialize, Serialize};

use crate::utils::errors::{Dat2CsvError, Result};

/// How record boundaries are recovered from a line stream that does not
/// respect them. The three variants match three physical serialization
/// conventions seen in real `.dat` exports; they are not interchangeable on
/// ambiguous input, so the caller must pick one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryStrategy {
    /// The expected column count is known; a record is complete once the
    /// buffered fragments contain `expected_columns - 1` delimiters.
    CountBased,
    /// The field count of the first non-empty line fixes the record width;
    /// a line whose fields would overflow the buffer starts the next record.
    WidthInferred,
    /// A trailing delimiter marks line continuation; a line without one ends
    /// the record. Fields are whole fragments, never split within a line.
    TerminatorSuffix,
}

impl std::str::FromStr for BoundaryStrategy {
    type Err = Dat2CsvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "count-based" => Ok(Self::CountBased),
            "width-inferred" => Ok(Self::WidthInferred),
            "terminator-suffix" => Ok(Self::TerminatorSuffix),
            other => Err(Dat2CsvError::Config(format!(
                "unknown strategy {other:?}, expected one of count-based, width-inferred, terminator-suffix"
            ))),
        }
    }
}

/// One logical row, immutable once emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub fields: Vec<String>,
}

impl Record {
    pub fn arity(&self) -> usize {
        self.fields.len()
    }
}

enum State {
    CountBased {
        expected: usize,
        fragments: Vec<String>,
        delimiters: usize,
    },
    WidthInferred {
        width: Option<usize>,
        fields: Vec<String>,
    },
    TerminatorSuffix {
        fragments: Vec<String>,
    },
}

pub struct Reassembler {
    delimiter: char,
    state: State,
}

impl Reassembler {
    pub fn new(
        delimiter: char,
        strategy: BoundaryStrategy,
        expected_columns: Option<usize>,
    ) -> Result<Self> {
        if expected_columns == Some(0) {
            return Err(Dat2CsvError::InvalidExpectedColumns);
        }
        let state = match strategy {
            BoundaryStrategy::CountBased => State::CountBased {
                expected: expected_columns.ok_or(Dat2CsvError::MissingExpectedColumns)?,
                fragments: Vec::new(),
                delimiters: 0,
            },
            BoundaryStrategy::WidthInferred => State::WidthInferred {
                width: None,
                fields: Vec::new(),
            },
            BoundaryStrategy::TerminatorSuffix => State::TerminatorSuffix {
                fragments: Vec::new(),
            },
        };
        Ok(Self { delimiter, state })
    }

    /// Feed one physical line. Leading/trailing whitespace is stripped;
    /// empty lines carry nothing and return `None`. Returns a record as soon
    /// as a boundary is recognized.
    pub fn push_line(&mut self, raw: &str) -> Option<Record> {
        let line = raw.trim();
        if line.is_empty() {
            return None;
        }
        let delimiter = self.delimiter;

        match &mut self.state {
            State::CountBased {
                expected,
                fragments,
                delimiters,
            } => {
                *delimiters += line.matches(delimiter).count();
                fragments.push(line.to_string());
                if *delimiters == *expected - 1 {
                    let record = split_joined(fragments, delimiter);
                    fragments.clear();
                    *delimiters = 0;
                    Some(record)
                } else {
                    None
                }
            }
            State::WidthInferred { width, fields } => {
                let incoming: Vec<String> =
                    line.split(delimiter).map(str::to_string).collect();
                let w = *width.get_or_insert(incoming.len());
                if fields.len() + incoming.len() <= w {
                    fields.extend(incoming);
                    None
                } else {
                    let record = Record {
                        fields: std::mem::replace(fields, incoming),
                    };
                    Some(record)
                }
            }
            State::TerminatorSuffix { fragments } => {
                if let Some(rest) = line.strip_suffix(delimiter) {
                    fragments.push(rest.to_string());
                    None
                } else {
                    fragments.push(line.to_string());
                    Some(Record {
                        fields: std::mem::take(fragments),
                    })
                }
            }
        }
    }

    /// Flush whatever is still buffered as one final record. Input ending
    /// mid-record yields a short (or long) record here rather than losing
    /// the data.
    pub fn finish(&mut self) -> Option<Record> {
        match &mut self.state {
            State::CountBased {
                fragments,
                delimiters,
                ..
            } => {
                if fragments.is_empty() {
                    return None;
                }
                let record = split_joined(fragments, self.delimiter);
                fragments.clear();
                *delimiters = 0;
                Some(record)
            }
            State::WidthInferred { fields, .. } => {
                if fields.is_empty() {
                    return None;
                }
                Some(Record {
                    fields: std::mem::take(fields),
                })
            }
            State::TerminatorSuffix { fragments } => {
                if fragments.is_empty() {
                    return None;
                }
                Some(Record {
                    fields: std::mem::take(fragments),
                })
            }
        }
    }

    /// Record width the run has settled on, if established yet.
    pub fn established_width(&self) -> Option<usize> {
        match &self.state {
            State::CountBased { expected, .. } => Some(*expected),
            State::WidthInferred { width, .. } => *width,
            State::TerminatorSuffix { .. } => None,
        }
    }
}

// Fragments of one record are rejoined with a single space: the physical
// line break sat inside a field value, where it stood for whitespace.
// Rejoining with the delimiter itself would mint a spurious field per break.
fn split_joined(fragments: &[String], delimiter: char) -> Record {
    let joined = fragments.join(" ");
    Record {
        fields: joined.split(delimiter).map(str::to_string).collect(),
    }
}

/// Lazy adapter over any line source. Consumes one line at a time and yields
/// records as boundaries are recognized; the trailing buffer is flushed when
/// the source is exhausted.
pub struct RecordIter<I> {
    lines: I,
    reassembler: Reassembler,
    exhausted: bool,
}

impl<I, S> Iterator for RecordIter<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        if self.exhausted {
            return None;
        }
        loop {
            match self.lines.next() {
                Some(line) => {
                    if let Some(record) = self.reassembler.push_line(line.as_ref()) {
                        return Some(record);
                    }
                }
                None => {
                    self.exhausted = true;
                    return self.reassembler.finish();
                }
            }
        }
    }
}

pub fn reassemble<I, S>(
    lines: I,
    delimiter: char,
    strategy: BoundaryStrategy,
    expected_columns: Option<usize>,
) -> Result<RecordIter<I::IntoIter>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(RecordIter {
        lines: lines.into_iter(),
        reassembler: Reassembler::new(delimiter, strategy, expected_columns)?,
        exhausted: false,
    })
}
