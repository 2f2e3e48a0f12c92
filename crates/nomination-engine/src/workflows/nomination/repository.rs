use super::domain::{NominationId, NominationRecord};

/// Storage abstraction for nomination aggregates.
///
/// The aggregate (baseline, submissions, ratings and cached ranks) is written as one unit, so a
/// successful `replace` is the only way a change becomes visible. Implementations backed by a
/// relational store should perform `replace` inside a single transaction.
pub trait NominationRepository: Send + Sync {
    fn insert(&self, record: NominationRecord) -> Result<NominationRecord, RepositoryError>;
    fn fetch(&self, id: &NominationId) -> Result<Option<NominationRecord>, RepositoryError>;
    /// Stores `record` only if the stored revision still equals `expected_revision`.
    fn replace(
        &self,
        record: NominationRecord,
        expected_revision: u64,
    ) -> Result<(), RepositoryError>;
    /// Removes the aggregate together with its baseline, submissions and ratings.
    fn delete(&self, id: &NominationId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record was modified concurrently (expected revision {expected}, found {found})")]
    StaleRevision { expected: u64, found: u64 },
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
