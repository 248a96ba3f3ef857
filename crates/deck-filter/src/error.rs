//! Error types for the filter registry

/// Registry errors
///
/// Unknown ids are never errors: mutating an absent filter is a `false`/`0`
/// no-op. The only failure is a rejected duplicate registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// Id already registered under [`DuplicatePolicy::Reject`](crate::DuplicatePolicy::Reject)
    #[error("filter id already registered: {0}")]
    DuplicateId(String),
}

impl FilterError {
    /// Id the error refers to
    #[inline]
    #[must_use]
    pub fn filter_id(&self) -> &str {
        match self {
            Self::DuplicateId(id) => id,
        }
    }
}
