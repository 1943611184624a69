//! Configuration file loading for aws-advisor
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `ADVISOR_` environment variables
//! 2. Explicitly passed config file
//! 3. Project root: `./advisor.toml` or `./.advisor.toml`
//! 4. Global: `<config dir>/aws-advisor/config.toml`
//! 5. Default values
//!
//! Tool server definitions live in a separate file (see [`servers`]).

mod error;
mod file_config;
mod loader;
pub mod servers;

pub use error::{ConfigError, ConfigValidationError};
pub use file_config::{
    DEFAULT_CATALOG_URL, FileCacheConfig, FileCatalogConfig, FileConfig, FileEstimationConfig,
    FileGatewayConfig, FileLoggingConfig,
};
pub use loader::ConfigLoader;
pub use servers::{ServerFileFormat, current_platform, load_server_file, parse_server_config};
