pub mod dat_processor;
pub mod utils;

pub use dat_processor::{
    analyze_dat, convert_dat_to_csv, reassemble, BoundaryStrategy, ConversionReport, DatMetadata,
    Reassembler, Record,
};
pub use utils::{parse_delimiter, AppConfig, ConversionOptions, Dat2CsvError, Result};
