use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dat_processor::reassembler::{Reassembler, Record};
use crate::dat_processor::reader::DatStreamReader;
use crate::dat_processor::writer::CsvStreamWriter;
use crate::utils::config::ConversionOptions;
use crate::utils::errors::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub records_written: usize,
    pub arity_mismatches: usize,
    /// Column count the run settled on: the configured expectation, or the
    /// arity of the first emitted record.
    pub record_width: Option<usize>,
}

/// Drive the full pipeline: read physical lines, reassemble logical records,
/// write each one to CSV as it is recognized. Arity mismatches are warned
/// about and counted but the record is still written; deciding what to do
/// with malformed rows belongs downstream.
pub fn convert_dat_to_csv(
    input: &str,
    output: &str,
    options: &ConversionOptions,
) -> Result<ConversionReport> {
    options.validate()?;

    let reader = DatStreamReader::new(input);
    let mut reassembler = Reassembler::new(
        options.delimiter,
        options.strategy,
        options.expected_columns,
    )?;

    let lines = reader.line_iter()?;
    let mut writer = CsvStreamWriter::new(output);
    writer.initialize()?;

    let mut report = ConversionReport {
        records_written: 0,
        arity_mismatches: 0,
        record_width: reassembler.established_width(),
    };
    let mut last_line = 0;

    for result in lines {
        let (line_no, line) = result?;
        last_line = line_no;
        if let Some(record) = reassembler.push_line(&line) {
            emit(&mut writer, &mut report, record, line_no)?;
        }
    }

    if let Some(record) = reassembler.finish() {
        emit(&mut writer, &mut report, record, last_line)?;
    }

    writer.finish()?;
    info!(
        "Converted {} to {}: {} records, {} arity mismatches",
        input, output, report.records_written, report.arity_mismatches
    );
    Ok(report)
}

fn emit(
    writer: &mut CsvStreamWriter,
    report: &mut ConversionReport,
    record: Record,
    line_no: usize,
) -> Result<()> {
    let width = *report.record_width.get_or_insert(record.arity());
    if record.arity() != width {
        report.arity_mismatches += 1;
        warn!(
            "Record ending at line {} has {} fields, expected {}",
            line_no,
            record.arity(),
            width
        );
    }
    writer.write_record(&record.fields)?;
    report.records_written += 1;
    Ok(())
}
