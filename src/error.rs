//! Error types for the photo tree, its indexes and the reprojection pipeline.
//!
//! Missing data (no geographic tag on a file that is merely being indexed, no
//! spatial position, an entry absent from an index) is never an error: those
//! paths yield empty results. Errors are reserved for failures a caller has to
//! act on, and they carry the identity of the entry involved.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeoPhotoError {
    /// The storage backend failed to list a folder or read a file.
    #[error("Storage error at '{path}': {message}")]
    Storage { path: String, message: String },

    /// A photo's tags carry no usable longitude/latitude.
    #[error("There is no geographic tag in '{name}'")]
    NoGeographicTag { name: String },

    /// Invalid input (coordinates, identifiers, stored content).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The geographic-conversion service failed.
    #[error("Conversion service error: {0}")]
    Conversion(String),

    /// A parent folder was dropped while one of its entries was still in use.
    #[error("Parent folder of '{0}' is no longer available")]
    FolderGone(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl GeoPhotoError {
    /// Build a storage error for the entry at `path`.
    pub fn storage(path: impl Into<String>, message: impl ToString) -> Self {
        GeoPhotoError::Storage {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GeoPhotoError>;
