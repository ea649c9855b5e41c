//! Search-index abstraction.
//!
//! Read paths (search, and lookups that must see soft-deleted filtering) go
//! through the index; Postgres stays the source of truth and every write is
//! mirrored here. Implemented by Elasticsearch over HTTP and by an in-memory
//! map for tests and single-node deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use fields_core::models::{SearchCriteria, SearchResult};
use fields_core::AppError;
use serde_json::{json, Value as JsonValue};
use tokio::sync::RwLock;

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Index or replace the document under `id`.
    async fn index_document(&self, id: &str, document: &JsonValue) -> Result<(), AppError>;

    /// Remove the document under `id`. Removing an absent document is not an
    /// error.
    async fn delete_document(&self, id: &str) -> Result<(), AppError>;

    async fn search(&self, criteria: &SearchCriteria) -> Result<SearchResult, AppError>;
}

/// Elasticsearch-backed index.
pub struct ElasticSearchIndex {
    client: reqwest::Client,
    base_url: String,
    index_name: String,
}

impl ElasticSearchIndex {
    pub fn new(base_url: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            index_name: index_name.into(),
        }
    }

    fn doc_url(&self, id: &str) -> String {
        format!("{}/{}/_doc/{}", self.base_url, self.index_name, id)
    }

    /// Create the index if it does not exist yet. Called once at startup.
    pub async fn ensure_index(&self) -> Result<(), AppError> {
        let url = format!("{}/{}", self.base_url, self.index_name);
        let response = self
            .client
            .put(&url)
            .json(&json!({"settings": {"number_of_shards": 1}}))
            .send()
            .await
            .map_err(|e| AppError::SearchIndex(e.to_string()))?;

        // 400 resource_already_exists_exception means a previous boot made it.
        if response.status().is_success() || response.status() == reqwest::StatusCode::BAD_REQUEST {
            Ok(())
        } else {
            Err(AppError::SearchIndex(format!(
                "index creation failed with status {}",
                response.status()
            )))
        }
    }

    fn build_query(criteria: &SearchCriteria) -> JsonValue {
        let mut filters = Vec::new();
        for (key, value) in &criteria.filter_criteria_map {
            let clause = match value {
                JsonValue::Array(values) => json!({"terms": {key.clone(): values}}),
                other => json!({"term": {key.clone(): other}}),
            };
            filters.push(clause);
        }

        let mut body = json!({
            "from": criteria.page_number * criteria.page_size,
            "size": criteria.page_size,
            "query": {"bool": {"filter": filters}},
        });

        if let Some(order_by) = &criteria.order_by {
            let direction = criteria.order_direction.as_deref().unwrap_or("asc");
            body["sort"] = json!([{order_by.clone(): {"order": direction}}]);
        }
        if !criteria.requested_fields.is_empty() {
            body["_source"] = json!(criteria.requested_fields);
        }

        body
    }
}

#[async_trait]
impl SearchIndex for ElasticSearchIndex {
    #[tracing::instrument(skip(self, document), fields(index = %self.index_name, doc_id = %id))]
    async fn index_document(&self, id: &str, document: &JsonValue) -> Result<(), AppError> {
        let response = self
            .client
            .put(self.doc_url(id))
            .json(document)
            .send()
            .await
            .map_err(|e| AppError::SearchIndex(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AppError::SearchIndex(format!(
                "indexing failed with status {}",
                response.status()
            )))
        }
    }

    #[tracing::instrument(skip(self), fields(index = %self.index_name, doc_id = %id))]
    async fn delete_document(&self, id: &str) -> Result<(), AppError> {
        let response = self
            .client
            .delete(self.doc_url(id))
            .send()
            .await
            .map_err(|e| AppError::SearchIndex(e.to_string()))?;

        if response.status().is_success() || response.status() == reqwest::StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(AppError::SearchIndex(format!(
                "delete failed with status {}",
                response.status()
            )))
        }
    }

    #[tracing::instrument(skip(self, criteria), fields(index = %self.index_name))]
    async fn search(&self, criteria: &SearchCriteria) -> Result<SearchResult, AppError> {
        let url = format!("{}/{}/_search", self.base_url, self.index_name);
        let response = self
            .client
            .post(&url)
            .json(&Self::build_query(criteria))
            .send()
            .await
            .map_err(|e| AppError::SearchIndex(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::SearchIndex(format!(
                "search failed with status {}",
                response.status()
            )));
        }

        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| AppError::SearchIndex(e.to_string()))?;

        let total_count = body["hits"]["total"]["value"].as_u64().unwrap_or(0);
        let data = body["hits"]["hits"]
            .as_array()
            .map(|hits| {
                hits.iter()
                    .filter_map(|hit| hit.get("_source").cloned())
                    .collect()
            })
            .unwrap_or_default();

        Ok(SearchResult { total_count, data })
    }
}

/// In-memory index with the same filter semantics as the Elasticsearch
/// backend. Used by tests and single-node setups without Elasticsearch.
#[derive(Default)]
pub struct InMemorySearchIndex {
    documents: RwLock<HashMap<String, JsonValue>>,
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(document: &JsonValue, key: &str, filter: &JsonValue) -> bool {
        let Some(value) = document.get(key) else {
            return false;
        };
        match filter {
            JsonValue::Array(any_of) => any_of.iter().any(|candidate| candidate == value),
            other => other == value,
        }
    }

    fn sort_key(document: &JsonValue, key: &str) -> String {
        match document.get(key) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

#[async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn index_document(&self, id: &str, document: &JsonValue) -> Result<(), AppError> {
        self.documents
            .write()
            .await
            .insert(id.to_string(), document.clone());
        Ok(())
    }

    async fn delete_document(&self, id: &str) -> Result<(), AppError> {
        self.documents.write().await.remove(id);
        Ok(())
    }

    async fn search(&self, criteria: &SearchCriteria) -> Result<SearchResult, AppError> {
        let documents = self.documents.read().await;

        let mut hits: Vec<JsonValue> = documents
            .values()
            .filter(|doc| {
                criteria
                    .filter_criteria_map
                    .iter()
                    .all(|(key, filter)| Self::matches(doc, key, filter))
            })
            .cloned()
            .collect();

        if let Some(order_by) = &criteria.order_by {
            hits.sort_by_key(|doc| Self::sort_key(doc, order_by));
            if criteria.order_direction.as_deref() == Some("desc") {
                hits.reverse();
            }
        } else {
            // Deterministic order for pagination.
            hits.sort_by_key(|doc| Self::sort_key(doc, "customFieldId"));
        }

        let total_count = hits.len() as u64;
        let mut page: Vec<JsonValue> = hits
            .into_iter()
            .skip(criteria.page_number * criteria.page_size)
            .take(criteria.page_size)
            .collect();

        if !criteria.requested_fields.is_empty() {
            for doc in &mut page {
                if let Some(map) = doc.as_object_mut() {
                    map.retain(|key, _| criteria.requested_fields.iter().any(|f| f == key));
                }
            }
        }

        Ok(SearchResult {
            total_count,
            data: page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn filters(pairs: &[(&str, JsonValue)]) -> Map<String, JsonValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    async fn seeded_index() -> InMemorySearchIndex {
        let index = InMemorySearchIndex::new();
        index
            .index_document(
                "cf-1",
                &json!({"customFieldId": "cf-1", "organizationId": "org-a", "isActive": true, "name": "Department"}),
            )
            .await
            .unwrap();
        index
            .index_document(
                "cf-2",
                &json!({"customFieldId": "cf-2", "organizationId": "org-a", "isActive": false, "name": "Grade"}),
            )
            .await
            .unwrap();
        index
            .index_document(
                "cf-3",
                &json!({"customFieldId": "cf-3", "organizationId": "org-b", "isActive": true, "name": "Region"}),
            )
            .await
            .unwrap();
        index
    }

    #[tokio::test]
    async fn test_scalar_filter_is_exact_match() {
        let index = seeded_index().await;
        let result = index
            .search(&SearchCriteria::with_filters(filters(&[(
                "organizationId",
                json!("org-a"),
            )])))
            .await
            .unwrap();
        assert_eq!(result.total_count, 2);
    }

    #[tokio::test]
    async fn test_array_filter_matches_any() {
        let index = seeded_index().await;
        let result = index
            .search(&SearchCriteria::with_filters(filters(&[(
                "organizationId",
                json!(["org-a", "org-b"]),
            )])))
            .await
            .unwrap();
        assert_eq!(result.total_count, 3);
    }

    #[tokio::test]
    async fn test_filters_combine_with_and() {
        let index = seeded_index().await;
        let result = index
            .search(&SearchCriteria::with_filters(filters(&[
                ("organizationId", json!("org-a")),
                ("isActive", json!(true)),
            ])))
            .await
            .unwrap();
        assert_eq!(result.total_count, 1);
        assert_eq!(result.data[0]["customFieldId"], json!("cf-1"));
    }

    #[tokio::test]
    async fn test_requested_fields_projection() {
        let index = seeded_index().await;
        let mut criteria =
            SearchCriteria::with_filters(filters(&[("customFieldId", json!("cf-1"))]));
        criteria.requested_fields = vec!["name".to_string()];
        let result = index.search(&criteria).await.unwrap();
        assert_eq!(result.data[0], json!({"name": "Department"}));
    }

    #[tokio::test]
    async fn test_pagination_and_total_count() {
        let index = seeded_index().await;
        let mut criteria = SearchCriteria::default();
        criteria.page_size = 2;
        criteria.page_number = 1;
        criteria.order_by = Some("customFieldId".to_string());
        let result = index.search(&criteria).await.unwrap();
        // Total reflects all matches, not just the returned page.
        assert_eq!(result.total_count, 3);
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0]["customFieldId"], json!("cf-3"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let index = seeded_index().await;
        index.delete_document("cf-1").await.unwrap();
        index.delete_document("cf-1").await.unwrap();
        let result = index.search(&SearchCriteria::default()).await.unwrap();
        assert_eq!(result.total_count, 2);
    }

    #[test]
    fn test_elastic_query_shape() {
        let mut criteria = SearchCriteria::with_filters(filters(&[
            ("organizationId", json!("org-a")),
            ("status", json!(["Active", "Draft"])),
        ]));
        criteria.order_by = Some("createdOn".to_string());
        criteria.order_direction = Some("desc".to_string());
        criteria.page_number = 2;
        criteria.page_size = 10;

        let body = ElasticSearchIndex::build_query(&criteria);
        assert_eq!(body["from"], json!(20));
        assert_eq!(body["size"], json!(10));
        assert_eq!(body["sort"][0]["createdOn"]["order"], json!("desc"));
        let clauses = body["query"]["bool"]["filter"].as_array().unwrap();
        assert!(clauses.contains(&json!({"term": {"organizationId": "org-a"}})));
        assert!(clauses.contains(&json!({"terms": {"status": ["Active", "Draft"]}})));
    }
}
