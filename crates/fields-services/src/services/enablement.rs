//! Per-organization enablement ledger.
//!
//! Each organization carries a record of enabled field ids plus a running
//! weight total. Enabling a scalar field costs 1; a master-list field costs
//! its level count. All mutations go through an optimistic
//! compare-and-swap loop so two concurrent enables cannot both land under the
//! budget and overshoot it.

use std::sync::Arc;

use fields_core::models::{CustomField, EnablementRecord};
use fields_core::{AppError, LedgerStore};

pub struct EnablementLedger {
    store: Arc<dyn LedgerStore>,
    max_enabled: i64,
    cas_retries: u32,
}

impl EnablementLedger {
    pub fn new(store: Arc<dyn LedgerStore>, max_enabled: i64, cas_retries: u32) -> Self {
        Self {
            store,
            max_enabled,
            cas_retries,
        }
    }

    /// Add `field` to its organization's record, charging its weight against
    /// the budget. An id already in the record is a no-op success without a
    /// second charge; only a budget overflow fails.
    #[tracing::instrument(skip(self, field), fields(custom_field_id = %field.custom_field_id, organization_id = %organization_id))]
    pub async fn enable(
        &self,
        organization_id: &str,
        field: &CustomField,
    ) -> Result<EnablementRecord, AppError> {
        let weight = field.weight();
        self.mutate(organization_id, |existing| {
            let mut record = existing.unwrap_or_default();
            if record.contains(&field.custom_field_id) {
                // Already charged; re-enabling after an update must not
                // double-count.
                return Ok(record);
            }
            if record.custom_fields_count + weight > self.max_enabled {
                return Err(AppError::CapacityExceeded {
                    limit: self.max_enabled,
                });
            }
            record.custom_field_ids.push(field.custom_field_id.clone());
            record.custom_fields_count += weight;
            Ok(record)
        })
        .await
    }

    /// Remove `field` from its organization's record, refunding its weight.
    /// An id that is not in the record is a no-op success and writes nothing.
    /// The count never goes below zero even if records predate weight
    /// accounting.
    #[tracing::instrument(skip(self, field), fields(custom_field_id = %field.custom_field_id, organization_id = %organization_id))]
    pub async fn disable(
        &self,
        organization_id: &str,
        field: &CustomField,
    ) -> Result<EnablementRecord, AppError> {
        let weight = field.weight();

        let Some(current) = self.store.load(organization_id).await? else {
            return Ok(EnablementRecord::default());
        };
        if !current.record.contains(&field.custom_field_id) {
            return Ok(current.record);
        }

        self.mutate(organization_id, |existing| {
            let mut record = existing.unwrap_or_default();
            // A concurrent disable may have removed the id already; only
            // refund once.
            if record.contains(&field.custom_field_id) {
                record
                    .custom_field_ids
                    .retain(|id| id != &field.custom_field_id);
                record.custom_fields_count = (record.custom_fields_count - weight).max(0);
            }
            Ok(record)
        })
        .await
    }

    /// Flip the organization's popup flag. The organization must already have
    /// a ledger record, and repeating the current value is rejected.
    #[tracing::instrument(skip(self), fields(organization_id = %organization_id))]
    pub async fn set_popup_enabled(
        &self,
        organization_id: &str,
        enabled: bool,
    ) -> Result<EnablementRecord, AppError> {
        self.mutate(organization_id, |existing| {
            let mut record = existing
                .ok_or_else(|| AppError::OrganizationNotFound(organization_id.to_string()))?;
            if record.is_popup_enabled == Some(enabled) {
                return Err(AppError::AlreadyInState(format!(
                    "popup is already {}",
                    if enabled { "enabled" } else { "disabled" }
                )));
            }
            record.is_popup_enabled = Some(enabled);
            Ok(record)
        })
        .await
    }

    pub async fn record(&self, organization_id: &str) -> Result<Option<EnablementRecord>, AppError> {
        Ok(self
            .store
            .load(organization_id)
            .await?
            .map(|versioned| versioned.record))
    }

    /// Load-apply-swap loop. `apply` sees the current record (or `None`) and
    /// returns the new one; a version conflict reloads and retries.
    async fn mutate<F>(
        &self,
        organization_id: &str,
        mut apply: F,
    ) -> Result<EnablementRecord, AppError>
    where
        F: FnMut(Option<EnablementRecord>) -> Result<EnablementRecord, AppError>,
    {
        for attempt in 0..=self.cas_retries {
            let versioned = self.store.load(organization_id).await?;
            let expected_version = versioned.as_ref().map(|v| v.version);
            let updated = apply(versioned.map(|v| v.record))?;

            if self
                .store
                .compare_and_swap(organization_id, expected_version, &updated)
                .await?
            {
                return Ok(updated);
            }
            tracing::debug!(organization_id, attempt, "ledger version conflict, retrying");
        }

        Err(AppError::Internal(format!(
            "enablement ledger for organization {} kept changing under us",
            organization_id
        )))
    }
}
