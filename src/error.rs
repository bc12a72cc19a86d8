use thiserror::Error;

/// Failures of the internal-energy matrix construction.
///
/// `InvalidArgument` points at a programming error on the caller side, while
/// `SingularMatrix` marks a legitimate but degenerate parameter combination
/// (for example `alpha = beta = gamma = 0`) where falling back to a positive
/// `gamma` is usually the right reaction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnergyError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("regularized {size}x{size} matrix is numerically singular")]
    SingularMatrix { size: usize },
}

impl EnergyError {
    pub fn is_singular(&self) -> bool {
        matches!(self, EnergyError::SingularMatrix { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, EnergyError::InvalidArgument(_))
    }
}

pub type Result<T> = std::result::Result<T, EnergyError>;
