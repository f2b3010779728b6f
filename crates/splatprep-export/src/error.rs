use splatprep_3d::{io::colmap::ColmapError, sampling::SamplingError};
use splatprep_render::RenderError;

/// The category of an export failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad target or out of range options. Nothing was mutated.
    InvalidInput,
    /// The surface sampler returned no points or too few of them.
    SamplingFailure,
    /// A directory or file could not be written.
    IoFailure,
    /// The renderer failed.
    RenderFailure,
}

/// An error type for the export pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The job options or the target are not valid.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Point sampling produced nothing or fewer points than requested.
    #[error("Sampling failed: {0}")]
    SamplingFailure(String),

    /// Error creating directories or reading the config file.
    #[error("I/O failure. {0}")]
    IoFailure(#[from] std::io::Error),

    /// Error writing the COLMAP tables.
    #[error("Failed to write the COLMAP tables. {0}")]
    ColmapFailure(#[from] ColmapError),

    /// Error parsing the config file.
    #[error("Failed to parse the config file. {0}")]
    ConfigFailure(#[from] serde_json::Error),

    /// The renderer reported an error.
    #[error("Rendering failed. {0}")]
    RenderFailure(#[from] RenderError),
}

impl ExportError {
    /// The category of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExportError::InvalidInput(_) | ExportError::ConfigFailure(_) => ErrorKind::InvalidInput,
            ExportError::SamplingFailure(_) => ErrorKind::SamplingFailure,
            ExportError::IoFailure(_) | ExportError::ColmapFailure(_) => ErrorKind::IoFailure,
            ExportError::RenderFailure(_) => ErrorKind::RenderFailure,
        }
    }
}

impl From<SamplingError> for ExportError {
    fn from(err: SamplingError) -> Self {
        if err.is_invalid_input() {
            ExportError::InvalidInput(err.to_string())
        } else {
            ExportError::SamplingFailure(err.to_string())
        }
    }
}
