use async_trait::async_trait;

use crate::error::AppError;
use crate::models::EnablementRecord;

/// An enablement record together with the storage version it was read at.
/// The version feeds back into `compare_and_swap` so concurrent writers
/// cannot silently overwrite each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedRecord {
    pub version: i64,
    pub record: EnablementRecord,
}

/// Versioned storage for per-organization enablement records.
///
/// Implemented against Postgres in production and in memory for tests. The
/// ledger service layers retry logic on top; the store itself only does a
/// single optimistic write.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Load the record for an organization, or `None` when the organization
    /// has no ledger entry yet.
    async fn load(&self, organization_id: &str) -> Result<Option<VersionedRecord>, AppError>;

    /// Write `record` only if the stored version still equals
    /// `expected_version` (`None` means "no row exists yet"). Returns `false`
    /// on a version conflict so the caller can reload and retry.
    async fn compare_and_swap(
        &self,
        organization_id: &str,
        expected_version: Option<i64>,
        record: &EnablementRecord,
    ) -> Result<bool, AppError>;
}
