//! Error types for effect calls.

use livefx_compute::ComputeError;
use thiserror::Error;

/// Result type for effect calls.
pub type EffectResult<T> = Result<T, EffectError>;

/// Failure of a host-facing effect call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EffectError {
    #[error("unknown effect id '{0}'")]
    UnknownEffectId(String),

    #[error(transparent)]
    Compute(#[from] ComputeError),

    #[error(transparent)]
    Core(#[from] livefx_core::Error),
}

/// Flat classification of an [`EffectError`] for host messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SchemaViolation,
    BufferSizeMismatch,
    PipelineBuildFailed,
    DeviceLost,
    OutOfDeviceMemory,
    ResourceLimitExceeded,
    UnknownEffectId,
    BackendNotAvailable,
    /// Geometry bookkeeping failed; indicates a bug, not bad input.
    Internal,
}

impl EffectError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownEffectId(_) => ErrorKind::UnknownEffectId,
            Self::Compute(e) => match e {
                ComputeError::PipelineBuildFailed { .. } => ErrorKind::PipelineBuildFailed,
                ComputeError::DeviceLost { .. } => ErrorKind::DeviceLost,
                ComputeError::OutOfDeviceMemory { .. } => ErrorKind::OutOfDeviceMemory,
                ComputeError::BackendNotAvailable(_) => ErrorKind::BackendNotAvailable,
                ComputeError::Core(core) => core_kind(core),
            },
            Self::Core(core) => core_kind(core),
        }
    }

    /// The offending field name or effect id, when there is one.
    pub fn subject(&self) -> Option<&str> {
        let core = match self {
            Self::UnknownEffectId(id) => return Some(id.as_str()),
            Self::Compute(ComputeError::PipelineBuildFailed { effect, .. })
            | Self::Compute(ComputeError::DeviceLost { effect })
            | Self::Compute(ComputeError::OutOfDeviceMemory { effect, .. }) => return Some(effect.as_str()),
            Self::Compute(ComputeError::BackendNotAvailable(_)) => return None,
            Self::Compute(ComputeError::Core(core)) | Self::Core(core) => core,
        };
        match core {
            livefx_core::Error::SchemaViolation { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }

    /// True if the caller may retry the call once.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Compute(e) if e.is_retryable())
    }
}

fn core_kind(e: &livefx_core::Error) -> ErrorKind {
    match e {
        livefx_core::Error::SchemaViolation { .. } => ErrorKind::SchemaViolation,
        livefx_core::Error::BufferSizeMismatch { .. } => ErrorKind::BufferSizeMismatch,
        livefx_core::Error::ResourceLimitExceeded { .. } => ErrorKind::ResourceLimitExceeded,
        livefx_core::Error::GeometryMismatch { .. } => ErrorKind::Internal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_flattens_nested_core() {
        let e = EffectError::Compute(ComputeError::Core(livefx_core::Error::schema("angle", "expected number")));
        assert_eq!(e.kind(), ErrorKind::SchemaViolation);
        assert_eq!(e.subject(), Some("angle"));
    }

    #[test]
    fn test_subject() {
        assert_eq!(EffectError::UnknownEffectId("nope".into()).subject(), Some("nope"));
        let lost = EffectError::from(ComputeError::DeviceLost { effect: "blur-v1".into() });
        assert_eq!(lost.kind(), ErrorKind::DeviceLost);
        assert_eq!(lost.subject(), Some("blur-v1"));
        assert!(lost.is_retryable());

        let size = EffectError::from(livefx_core::Error::BufferSizeMismatch { expected: 400, actual: 399 });
        assert_eq!(size.kind(), ErrorKind::BufferSizeMismatch);
        assert_eq!(size.subject(), None);
        assert!(!size.is_retryable());
    }
}
