use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};

use crate::utils::errors::{Dat2CsvError, Result};

/// CSV writer that stages rows in a sibling `.tmp` file and only moves it
/// onto the destination in `finish()`. An aborted run never leaves a partial
/// file at the output path.
pub struct CsvStreamWriter {
    path: PathBuf,
    tmp_path: PathBuf,
    writer: Option<Writer<File>>,
    rows_written: usize,
}

impl CsvStreamWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut tmp_name = path.as_os_str().to_os_string();
        tmp_name.push(".tmp");
        Self {
            path,
            tmp_path: PathBuf::from(tmp_name),
            writer: None,
            rows_written: 0,
        }
    }

    pub fn initialize(&mut self) -> Result<()> {
        let file = File::create(&self.tmp_path)?;
        // Arity-mismatched records must still be written; rejecting them is
        // the caller's call, not the writer's.
        self.writer = Some(WriterBuilder::new().flexible(true).from_writer(file));
        Ok(())
    }

    pub fn write_record(&mut self, fields: &[String]) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            Dat2CsvError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "Writer not initialized",
            ))
        })?;
        writer.write_record(fields)?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<usize> {
        if let Some(mut writer) = self.writer.take() {
            let flushed = writer.flush();
            drop(writer);
            let moved = flushed.map_err(Dat2CsvError::from).and_then(|_| {
                std::fs::rename(&self.tmp_path, &self.path).map_err(Dat2CsvError::from)
            });
            if let Err(e) = moved {
                let _ = std::fs::remove_file(&self.tmp_path);
                return Err(e);
            }
        }
        Ok(self.rows_written)
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CsvStreamWriter {
    fn drop(&mut self) {
        if self.writer.take().is_some() {
            let _ = std::fs::remove_file(&self.tmp_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn writes_rows_and_finalizes_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.csv");

        let mut writer = CsvStreamWriter::new(&out);
        writer.initialize().unwrap();
        writer.write_record(&fields(&["a", "b", "c"])).unwrap();
        writer.write_record(&fields(&["d", "e", "f"])).unwrap();
        let written = writer.finish().unwrap();

        assert_eq!(written, 2);
        let content = std::fs::read_to_string(&out).unwrap();
        assert_eq!(content, "a,b,c\nd,e,f\n");
        assert!(!dir.path().join("out.csv.tmp").exists());
    }

    #[test]
    fn quotes_fields_containing_commas_and_quotes() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("quoted.csv");

        let mut writer = CsvStreamWriter::new(&out);
        writer.initialize().unwrap();
        writer
            .write_record(&fields(&["plain", "has, comma", "has \"quote\"", "line\nbreak"]))
            .unwrap();
        writer.finish().unwrap();

        let content = std::fs::read_to_string(&out).unwrap();
        assert_eq!(
            content,
            "plain,\"has, comma\",\"has \"\"quote\"\"\",\"line\nbreak\"\n"
        );
    }

    #[test]
    fn writes_records_of_varying_arity() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("ragged.csv");

        let mut writer = CsvStreamWriter::new(&out);
        writer.initialize().unwrap();
        writer.write_record(&fields(&["a", "b", "c"])).unwrap();
        writer.write_record(&fields(&["d", "e"])).unwrap();
        writer.write_record(&fields(&["f"])).unwrap();
        let written = writer.finish().unwrap();

        assert_eq!(written, 3);
        let content = std::fs::read_to_string(&out).unwrap();
        assert_eq!(content, "a,b,c\nd,e\nf\n");
    }

    #[test]
    fn failed_finalize_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the output path makes the rename fail.
        let out = dir.path().join("blocked.csv");
        std::fs::create_dir(&out).unwrap();

        let mut writer = CsvStreamWriter::new(&out);
        writer.initialize().unwrap();
        writer.write_record(&fields(&["a", "b"])).unwrap();
        let result = writer.finish();

        assert!(result.is_err());
        assert!(!dir.path().join("blocked.csv.tmp").exists());
    }

    #[test]
    fn dropped_writer_leaves_no_output_or_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("aborted.csv");

        {
            let mut writer = CsvStreamWriter::new(&out);
            writer.initialize().unwrap();
            writer.write_record(&fields(&["a"])).unwrap();
        }

        assert!(!out.exists());
        assert!(!dir.path().join("aborted.csv.tmp").exists());
    }
}
