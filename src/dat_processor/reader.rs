use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::utils::errors::{Dat2CsvError, Result};

pub struct DatStreamReader {
    path: String,
}

impl DatStreamReader {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    fn open(&self) -> Result<BufReader<File>> {
        let file = File::open(&self.path).map_err(|source| Dat2CsvError::UnreadableSource {
            path: self.path.clone(),
            source,
        })?;
        Ok(BufReader::new(file))
    }

    pub fn line_iter(&self) -> Result<DatLineIterator> {
        Ok(DatLineIterator {
            lines: self.open()?.lines(),
            current_line: 0,
        })
    }

    pub fn read_sample_lines(&self, n: usize) -> Result<Vec<String>> {
        let mut lines = Vec::with_capacity(n);
        for result in self.open()?.lines().take(n) {
            lines.push(result?);
        }
        Ok(lines)
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

pub struct DatLineIterator {
    lines: std::io::Lines<BufReader<File>>,
    current_line: usize,
}

impl Iterator for DatLineIterator {
    type Item = Result<(usize, String)>;

    // Line numbers are 1-based, matching what editors show.
    fn next(&mut self) -> Option<Self::Item> {
        match self.lines.next() {
            Some(Ok(line)) => {
                self.current_line += 1;
                Some(Ok((self.current_line, line)))
            }
            Some(Err(e)) => Some(Err(Dat2CsvError::Io(e))),
            None => None,
        }
    }
}

pub fn get_file_size(path: &str) -> Result<u64> {
    let metadata = std::fs::metadata(path)?;
    Ok(metadata.len())
}
