use std::path::PathBuf;

use thiserror::Error;

/// Why an asset could not be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// The file itself could not be fetched or read
    Transport,
    /// The file was read but its content is not a valid model
    Malformed,
    /// A texture or buffer referenced by the model is missing
    MissingResource,
}

/// Asset load failure with the raw detail kept for logs
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", self.message())]
pub struct LoadError {
    pub url: String,
    pub kind: LoadErrorKind,
    pub detail: String,
}

impl LoadError {
    pub fn new(url: impl Into<String>, kind: LoadErrorKind, detail: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind,
            detail: detail.into(),
        }
    }

    pub fn transport(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(url, LoadErrorKind::Transport, detail)
    }

    pub fn malformed(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(url, LoadErrorKind::Malformed, detail)
    }

    pub fn missing_resource(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(url, LoadErrorKind::MissingResource, name)
    }

    /// Human-readable text shown to the user
    pub fn message(&self) -> String {
        match self.kind {
            LoadErrorKind::Transport => {
                "Unable to retrieve this file. Check the file path and permissions.".to_string()
            }
            LoadErrorKind::Malformed => format!(
                "Unable to parse file content. Verify that this file is valid. Error: {}",
                self.detail
            ),
            LoadErrorKind::MissingResource => format!("Missing texture: {}", self.detail),
        }
    }
}

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("unsupported file extension: {url} (expected .gltf, .glb or .obj)")]
    UnsupportedExtension { url: String },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("viewer has been disposed")]
    Disposed,

    #[error("no model is loaded")]
    NoScene,

    #[error("failed to read configuration {path}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration")]
    ConfigParse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
