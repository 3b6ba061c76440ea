use std::error::Error;
use std::fmt::{Display, Formatter};

/// Common error type for connectogen data operations.
///
/// Covers validation failures in the pure data layer. Errors raised while
/// running construction algorithms live in connectogen-synthesis.
///
/// # Examples
/// ```
/// use connectogen_structures::StructureError;
///
/// fn validate_size(size: usize) -> Result<(), StructureError> {
///     if size > 10_000_000 {
///         return Err(StructureError::BadParameters("size is implausibly large".into()));
///     }
///     Ok(())
/// }
///
/// assert!(validate_size(5).is_ok());
/// ```
#[derive(Debug)]
pub enum StructureError {
    /// Invalid parameters provided to a constructor
    BadParameters(String),
    /// A segment id was referenced but does not exist in the morphology
    UnknownSegment(u32),
    /// A segment group name was referenced but does not exist in the morphology
    UnknownGroup(String),
    /// An instance index was referenced outside a population's range
    InstanceOutOfRange { population: String, index: u64, size: usize },
    /// Internal error indicating a bug (please report)
    InternalError(String),
}

impl Display for StructureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StructureError::BadParameters(msg) => write!(f, "Bad Parameters: {}", msg),
            StructureError::UnknownSegment(id) => write!(f, "Unknown segment id: {}", id),
            StructureError::UnknownGroup(name) => write!(f, "Unknown segment group: {}", name),
            StructureError::InstanceOutOfRange { population, index, size } => write!(
                f,
                "Instance {} out of range for population '{}' of size {}",
                index, population, size
            ),
            StructureError::InternalError(msg) => write!(
                f,
                "Internal Error, please raise an issue on Github: {}",
                msg
            ),
        }
    }
}
impl Error for StructureError {}
