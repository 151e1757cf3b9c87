use serde::{Deserialize, Serialize};

use crate::dat_processor::reader::{get_file_size, DatStreamReader};
use crate::utils::errors::Result;

/// Shape summary of a `.dat` source. Advisory only: the caller still picks
/// the boundary strategy; nothing here changes parsing behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatMetadata {
    pub total_lines: usize,
    pub non_empty_lines: usize,
    pub file_size_bytes: u64,
    pub delimiter: char,
    pub min_delimiters_per_line: usize,
    pub max_delimiters_per_line: usize,
    /// Field count of the first non-empty line, the same signal the
    /// width-inferred strategy locks onto.
    pub inferred_width: Option<usize>,
    pub sample_lines: Vec<String>,
}

pub fn analyze_dat(path: &str, delimiter: char, sample_lines: usize) -> Result<DatMetadata> {
    let reader = DatStreamReader::new(path);
    let mut scan = LineScan::new(delimiter);
    for result in reader.line_iter()? {
        let (_, line) = result?;
        scan.push(&line);
    }

    let mut metadata = scan.into_metadata();
    metadata.file_size_bytes = get_file_size(path)?;
    metadata.sample_lines = reader.read_sample_lines(sample_lines)?;
    Ok(metadata)
}

pub fn analyze_lines<I, S>(lines: I, delimiter: char) -> DatMetadata
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut scan = LineScan::new(delimiter);
    for line in lines {
        scan.push(line.as_ref());
    }
    scan.into_metadata()
}

struct LineScan {
    delimiter: char,
    total_lines: usize,
    non_empty_lines: usize,
    min_delimiters: usize,
    max_delimiters: usize,
    inferred_width: Option<usize>,
}

impl LineScan {
    fn new(delimiter: char) -> Self {
        Self {
            delimiter,
            total_lines: 0,
            non_empty_lines: 0,
            min_delimiters: usize::MAX,
            max_delimiters: 0,
            inferred_width: None,
        }
    }

    fn push(&mut self, line: &str) {
        let stripped = line.trim();
        self.total_lines += 1;
        if stripped.is_empty() {
            return;
        }
        self.non_empty_lines += 1;

        let count = stripped.matches(self.delimiter).count();
        self.min_delimiters = self.min_delimiters.min(count);
        self.max_delimiters = self.max_delimiters.max(count);
        if self.inferred_width.is_none() {
            self.inferred_width = Some(count + 1);
        }
    }

    fn into_metadata(self) -> DatMetadata {
        DatMetadata {
            total_lines: self.total_lines,
            non_empty_lines: self.non_empty_lines,
            file_size_bytes: 0,
            delimiter: self.delimiter,
            min_delimiters_per_line: if self.non_empty_lines == 0 {
                0
            } else {
                self.min_delimiters
            },
            max_delimiters_per_line: self.max_delimiters,
            inferred_width: self.inferred_width,
            sample_lines: Vec::new(),
        }
    }
}
