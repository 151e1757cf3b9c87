use serde::{Deserialize, Serialize};

use crate::dat_processor::reassembler::BoundaryStrategy;
use crate::utils::errors::{Dat2CsvError, Result};

/// Cedilla. Chosen by the upstream export because it is vanishingly rare in
/// real field content; no escaping exists for values that do contain it.
pub const DEFAULT_DELIMITER: char = '¸';

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub conversion: ConversionDefaults,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionDefaults {
    pub delimiter: char,
    pub strategy: BoundaryStrategy,
    pub expected_columns: Option<usize>,
    pub probe_sample_lines: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            conversion: ConversionDefaults {
                delimiter: DEFAULT_DELIMITER,
                strategy: BoundaryStrategy::CountBased,
                expected_columns: None,
                probe_sample_lines: 10,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| Dat2CsvError::Config(e.to_string()))?;
        toml::from_str(&content).map_err(|e| Dat2CsvError::Config(e.to_string()))
    }

    pub fn load_or_default(path: Option<&str>) -> Self {
        if let Some(p) = path {
            Self::load_from_file(p).unwrap_or_default()
        } else {
            Self::default()
        }
    }
}

/// Settings for one conversion run, resolved from config file and CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOptions {
    pub delimiter: char,
    pub strategy: BoundaryStrategy,
    pub expected_columns: Option<usize>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            strategy: BoundaryStrategy::CountBased,
            expected_columns: None,
        }
    }
}

impl ConversionOptions {
    pub fn validate(&self) -> Result<()> {
        if self.expected_columns == Some(0) {
            return Err(Dat2CsvError::InvalidExpectedColumns);
        }
        if self.strategy == BoundaryStrategy::CountBased && self.expected_columns.is_none() {
            return Err(Dat2CsvError::MissingExpectedColumns);
        }
        Ok(())
    }
}

pub fn parse_delimiter(raw: &str) -> Result<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Err(Dat2CsvError::EmptyDelimiter),
        (Some(c), None) => Ok(c),
        (Some(_), Some(_)) => Err(Dat2CsvError::InvalidDelimiter(raw.to_string())),
    }
}
