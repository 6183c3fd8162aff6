//! The document-store capability the rollup pipeline consumes.

use async_trait::async_trait;
use chrono::NaiveDate;

use worklog_shared::{ContentNode, Properties, PropertyValue, RawRecord, RecordId, Result};

/// Exact-match condition on a select or text property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub equals: String,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, equals: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            equals: equals.into(),
        }
    }
}

/// Records of one collection whose `date_field` lies in `[start, end]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRangeQuery {
    pub collection: String,
    pub date_field: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Conjoined with the date range when present.
    pub filter: Option<FieldFilter>,
}

/// The store operations the pipeline depends on.
///
/// Implementations perform no retries; a failed call surfaces as
/// [`WorklogError::Storage`](worklog_shared::WorklogError::Storage).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Property-only fetch, ascending by the query's date field.
    async fn query_by_date_range(&self, query: &DateRangeQuery) -> Result<Vec<RawRecord>>;

    /// Content body of a record, in stored order. Unknown ids yield no nodes.
    async fn fetch_content_blocks(&self, id: &RecordId) -> Result<Vec<ContentNode>>;

    /// Create a record with its content body; either both land or neither does.
    async fn create_record(
        &self,
        collection: &str,
        properties: &Properties,
        content: &[ContentNode],
    ) -> Result<RecordId>;

    /// Collection a record belongs to, or `None` for an unknown id.
    async fn record_collection(&self, id: &RecordId) -> Result<Option<String>>;

    /// Overwrite one property of an existing record.
    async fn update_field(&self, id: &RecordId, field: &str, value: PropertyValue) -> Result<()>;
}
