//! POI Selector
//!
//! Point-of-interest selection for a telescope mount keypad. An operator cycles
//! through a fixed catalog of celestial objects plus the Home, Unpark and Park
//! shortcuts, and confirming an entry dispatches the matching command to the mount.

use thiserror::Error;

pub mod catalog;
pub mod controller;
pub mod coordinates;
pub mod keypad;
pub mod menu;
pub mod mount;

pub use catalog::{Catalog, CatalogEntry, Selection};
pub use controller::{wrap, PoiController};
pub use coordinates::{Declination, RightAscension};
pub use keypad::{AnalogKeypad, AnalogSource, KeyId, Keypad};
pub use menu::Menu;
pub use mount::{Directions, Mount};

/// Result type alias for catalog loading operations.
pub type PoiSelectorResult<T> = Result<T, PoiSelectorError>;

/// Error types for catalog construction and loading.
///
/// Navigation and dispatch never fail; only building a catalog does.
#[derive(Error, Debug, Clone)]
pub enum PoiSelectorError {
    #[error("InvalidEntry: {0}")]
    InvalidEntry(String),
    #[error("ParseError: {0}")]
    ParseError(String),
    #[error("IoError: {0}")]
    IoError(String),
}
