//! Run configuration and fixed names.

use std::path::PathBuf;
use std::time::Duration;

/// Page holding the country GDP table.
pub const DEFAULT_URL: &str = "https://www.worldometers.info/gdp/gdp-by-country/";

/// SQLite file written when no path is given.
pub const DEFAULT_DB_PATH: &str = "gdp_data.db";

/// Table the dataset is written to.
pub const TABLE_NAME: &str = "country_gdp";

/// Label given to the cleaned GDP column.
pub const GDP_COLUMN: &str = "GDP_USD_2024";

/// Network timeout for the single page fetch.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Everything one ETL run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlConfig {
    pub url: String,
    pub db_path: PathBuf,
    pub table: String,
    pub timeout: Duration,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            table: TABLE_NAME.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
