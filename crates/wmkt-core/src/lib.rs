pub mod app_config;
pub mod config;
pub mod listing;

pub use app_config::{AppConfig, Credentials, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use listing::{load_listing, ItemListing, ListingFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read listing file {path}: {source}")]
    ListingFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse listing file: {0}")]
    ListingFileParse(#[from] serde_yaml::Error),

    #[error("listing validation failed: {0}")]
    Validation(String),
}
