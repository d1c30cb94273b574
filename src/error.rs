//! Error types for span construction and the data-exchange layer.
//!
//! Numeric edge cases in the geometry pass never surface here; they are
//! absorbed with safe defaults. These errors cover invalid input.

use thiserror::Error;

use crate::model::ElementId;

#[derive(Debug, Error)]
pub enum EngraveError {
    #[error("cannot add a '{child}' to a '{parent}'")]
    UnsupportedChild {
        child: &'static str,
        parent: &'static str,
    },
    #[error("element {0:?} is not part of this span")]
    UnknownElement(ElementId),
    #[error("invalid span document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid engraving config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngraveError>;
