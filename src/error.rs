use crate::parameter::ParamKind;

/// Errors returned by parameter definitions, experiments and optimizers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a parameter definition or configuration is malformed.
    ///
    /// Raised at construction time (empty value lists, non-finite bounds,
    /// mismatched list lengths, ...) and never recovered from.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Returned when a queried value lies outside a parameter's domain.
    #[error("invalid value for {param}: {reason}")]
    InvalidValue {
        /// A description of the parameter definition that rejected the value.
        param: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Returned when a candidate does not match an experiment's parameter space.
    #[error("invalid candidate: {0}")]
    InvalidCandidate(String),

    /// Returned when an optimizer is bound to an experiment it cannot handle.
    #[error("optimizer '{optimizer}' does not support parameter '{param}' of type {kind}")]
    UnsupportedParameterType {
        /// The optimizer's name.
        optimizer: String,
        /// The name of the offending parameter.
        param: String,
        /// The concrete kind of the offending parameter definition.
        kind: ParamKind,
    },

    /// Returned when a warped coordinate slice has the wrong length.
    #[error("warp dimension mismatch: expected {expected} coordinates, got {got}")]
    WarpDimension {
        /// The definition's `warped_size`.
        expected: usize,
        /// The number of coordinates supplied.
        got: usize,
    },

    /// Returned when a wrapped optimizer panicked inside a queue backend.
    #[error("optimizer panicked: {0}")]
    OptimizerPanicked(String),

    /// Returned when an internal invariant is violated.
    #[error("internal error: {0}")]
    Internal(&'static str),

    /// Returned when reading or writing an experiment snapshot fails.
    #[cfg(feature = "serde")]
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_value(param: impl core::fmt::Display, reason: impl Into<String>) -> Self {
        Error::InvalidValue {
            param: param.to_string(),
            reason: reason.into(),
        }
    }
}
