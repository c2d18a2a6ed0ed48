//! Error types for resource parameter validation.

use thiserror::Error;

/// Errors returned while validating host-supplied resource parameters.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ResourceParamsError {
    /// A required parameter key is absent.
    #[error("cannot add resource, {0} was not specified")]
    MissingParameter(&'static str),

    /// A required parameter is present but empty after trimming.
    #[error("cannot add resource, {0} must not be blank")]
    BlankParameter(&'static str),
}

impl ResourceParamsError {
    /// Returns the name of the offending parameter.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::MissingParameter(field) | Self::BlankParameter(field) => field,
        }
    }
}
