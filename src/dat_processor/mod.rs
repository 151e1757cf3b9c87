pub mod analyzer;
pub mod convert;
pub mod reader;
pub mod reassembler;
pub mod writer;

pub use analyzer::{analyze_dat, analyze_lines, DatMetadata};
pub use convert::{convert_dat_to_csv, ConversionReport};
pub use reader::{get_file_size, DatStreamReader};
pub use reassembler::{reassemble, BoundaryStrategy, Reassembler, Record, RecordIter};
pub use writer::CsvStreamWriter;
