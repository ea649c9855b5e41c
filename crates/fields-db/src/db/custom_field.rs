use fields_core::{models::CustomField, AppError};
use sqlx::{PgPool, Postgres};

/// Repository for custom-field definitions.
///
/// The full attribute bag lives in the `document` JSONB column;
/// `is_mandatory` and `is_active` are mirrored out as columns so listing and
/// soft-delete filters never parse JSON.
#[derive(Clone)]
pub struct CustomFieldRepository {
    pool: PgPool,
}

impl CustomFieldRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace a field definition. The document is stored as given;
    /// callers stamp audit keys before saving.
    #[tracing::instrument(skip(self, field), fields(db.table = "custom_fields", db.operation = "upsert", db.record_id = %field.custom_field_id))]
    pub async fn save(&self, field: &CustomField) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO custom_fields (custom_field_id, document, is_mandatory, is_active, created_on, updated_on)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (custom_field_id)
            DO UPDATE SET document = EXCLUDED.document,
                          is_mandatory = EXCLUDED.is_mandatory,
                          is_active = EXCLUDED.is_active,
                          updated_on = EXCLUDED.updated_on
            "#,
        )
        .bind(&field.custom_field_id)
        .bind(&field.document)
        .bind(field.is_mandatory)
        .bind(field.is_active)
        .bind(field.created_on)
        .bind(field.updated_on)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a field by id, active documents only. Soft-deleted fields read
    /// as absent.
    #[tracing::instrument(skip(self), fields(db.table = "custom_fields", db.operation = "select", db.record_id = %custom_field_id))]
    pub async fn find_active_by_id(
        &self,
        custom_field_id: &str,
    ) -> Result<Option<CustomField>, AppError> {
        let field = sqlx::query_as::<Postgres, CustomField>(
            "SELECT custom_field_id, document, is_mandatory, is_active, created_on, updated_on \
             FROM custom_fields WHERE custom_field_id = $1 AND is_active = TRUE",
        )
        .bind(custom_field_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(field)
    }

}
