use async_trait::async_trait;
use fields_core::models::EnablementRecord;
use fields_core::{AppError, LedgerStore, VersionedRecord};
use sqlx::{PgPool, Postgres};

/// Postgres-backed enablement ledger.
///
/// One row per organization with a monotonically increasing `version`; writes
/// are optimistic and fail cleanly on a version conflict instead of blocking.
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    #[tracing::instrument(skip(self), fields(db.table = "org_enablement", db.operation = "select"))]
    async fn load(&self, organization_id: &str) -> Result<Option<VersionedRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, (i64, serde_json::Value)>(
            "SELECT version, record FROM org_enablement WHERE organization_id = $1",
        )
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((version, record)) => {
                let record: EnablementRecord = serde_json::from_value(record)?;
                Ok(Some(VersionedRecord { version, record }))
            }
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "org_enablement", db.operation = "cas"))]
    async fn compare_and_swap(
        &self,
        organization_id: &str,
        expected_version: Option<i64>,
        record: &EnablementRecord,
    ) -> Result<bool, AppError> {
        let blob = serde_json::to_value(record)?;

        let result = match expected_version {
            // First write wins; a concurrent insert surfaces as zero rows.
            None => {
                sqlx::query(
                    "INSERT INTO org_enablement (organization_id, record, version) \
                     VALUES ($1, $2, 1) ON CONFLICT (organization_id) DO NOTHING",
                )
                .bind(organization_id)
                .bind(&blob)
                .execute(&self.pool)
                .await?
            }
            Some(version) => {
                sqlx::query(
                    "UPDATE org_enablement \
                     SET record = $2, version = version + 1, updated_on = now() \
                     WHERE organization_id = $1 AND version = $3",
                )
                .bind(organization_id)
                .bind(&blob)
                .bind(version)
                .execute(&self.pool)
                .await?
            }
        };

        Ok(result.rows_affected() == 1)
    }
}
