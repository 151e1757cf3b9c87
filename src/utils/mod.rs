pub mod config;
pub mod errors;

pub use config::{parse_delimiter, AppConfig, ConversionOptions, DEFAULT_DELIMITER};
pub use errors::{Dat2CsvError, Result};
