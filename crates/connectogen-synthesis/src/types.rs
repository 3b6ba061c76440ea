// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core types for network construction operations.
*/

use connectogen_structures::StructureError;

/// Result type for construction operations
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors that can occur during network construction
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Unknown segment group '{group}' on cell type '{cell_type}'")]
    UnknownSegmentGroup { cell_type: String, group: String },

    #[error("Segment group '{group}' on cell type '{cell_type}' resolves to no segments")]
    EmptySegmentGroup { cell_type: String, group: String },

    #[error("Unknown cell type '{0}': no morphology registered under that id")]
    UnknownCellType(String),

    #[error("Population '{0}' has unplaced instances; placement must run first")]
    MissingCoordinates(String),

    #[error(
        "Placement infeasible for population '{population}': placed {placed} of {requested} cells, gave up after {attempts} attempts"
    )]
    PlacementInfeasible {
        population: String,
        placed: usize,
        requested: usize,
        attempts: usize,
    },

    #[error("Bad parameters: {0}")]
    BadParameters(String),

    #[error("Malformed connectivity row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Convert from connectogen_structures::StructureError
impl From<StructureError> for BuildError {
    fn from(err: StructureError) -> Self {
        match &err {
            StructureError::BadParameters(msg) => BuildError::BadParameters(msg.clone()),
            _ => BuildError::Internal(err.to_string()),
        }
    }
}

impl From<toml::de::Error> for BuildError {
    fn from(err: toml::de::Error) -> Self {
        BuildError::Config(err.to_string())
    }
}
