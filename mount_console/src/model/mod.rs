use poi_selector::PoiSelectorError;
use thiserror::Error;

use crate::config::ConfigError;

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[derive(Error, Debug, Clone)]
pub enum ConsoleError {
    #[error("ConfigError: {0}")]
    ConfigError(String),
    #[error("CatalogError: {0}")]
    CatalogError(String),
    #[error("ServerError: {0}")]
    ServerError(String),
    #[error("ServerConnectionError: {0}")]
    ServerConnectionError(String),
    #[error("TerminalError: {0}")]
    TerminalError(String),
}

impl From<ConfigError> for ConsoleError {
    fn from(e: ConfigError) -> Self {
        ConsoleError::ConfigError(e.to_string())
    }
}

impl From<PoiSelectorError> for ConsoleError {
    fn from(e: PoiSelectorError) -> Self {
        ConsoleError::CatalogError(e.to_string())
    }
}
