/// Crate-wide result type.
pub type GenomeResult<T> = Result<T, GenomeError>;

#[derive(thiserror::Error, Debug)]
/// Error type returned by genome, catalog and interpolation APIs.
///
/// Every variant is local and recoverable: no operation retries internally, and a failed
/// structural mutation leaves the genome untouched.
pub enum GenomeError {
    /// A transform, column or buffer index is outside the current logical bounds.
    #[error("invalid index: {0}")]
    InvalidIndex(String),

    /// A setter received a value outside its documented domain.
    #[error("range violation: {0}")]
    RangeViolation(String),

    /// Parameter keys do not match a variation kind's registered schema.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Two distinct variation kinds share a name.
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// JSON boundary failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped error from an external collaborator.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GenomeError {
    /// Build a [`GenomeError::InvalidIndex`] value.
    pub fn invalid_index(msg: impl Into<String>) -> Self {
        Self::InvalidIndex(msg.into())
    }

    /// Build a [`GenomeError::RangeViolation`] value.
    pub fn range(msg: impl Into<String>) -> Self {
        Self::RangeViolation(msg.into())
    }

    /// Build a [`GenomeError::SchemaMismatch`] value.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch(msg.into())
    }

    /// Build a [`GenomeError::DuplicateName`] value.
    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::DuplicateName(msg.into())
    }

    /// Build a [`GenomeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
