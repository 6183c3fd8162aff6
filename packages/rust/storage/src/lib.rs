//! libSQL-backed document store for work-log records.
//!
//! The [`Storage`] struct wraps a local libSQL database holding every tier's
//! records (properties as JSON) and their content blocks, and implements the
//! [`DocumentStore`] capability the rollup pipeline is written against.

mod migrations;
mod store;

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database, params};
use tracing::{debug, instrument};

use worklog_shared::{
    ContentNode, Properties, PropertyValue, RawRecord, RecordId, Result, WorklogError,
};

pub use store::{DateRangeQuery, DocumentStore, FieldFilter};

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

fn storage_err(e: impl std::fmt::Display) -> WorklogError {
    WorklogError::Storage(e.to_string())
}

/// SQLite JSON path selecting the value of a property.
fn value_path(field: &str) -> String {
    format!("$.\"{}\".value", field.replace('"', "\\\""))
}

impl Storage {
    /// Open or create a database at `path`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| WorklogError::io(parent, e))?;
            }
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(storage_err)?;

        let conn = db.connect().map_err(storage_err)?;

        let storage = Self { db, conn };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        WorklogError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Number of records in a collection.
    pub async fn count_records(&self, collection: &str) -> Result<u64> {
        let mut rows = self
            .conn
            .query(
                "SELECT COUNT(*) FROM records WHERE collection = ?1",
                params![collection],
            )
            .await
            .map_err(storage_err)?;

        match rows.next().await.map_err(storage_err)? {
            Some(row) => Ok(row.get::<i64>(0).map_err(storage_err)? as u64),
            None => Ok(0),
        }
    }

    /// Load one record's properties.
    pub async fn get_properties(&self, id: &RecordId) -> Result<Option<Properties>> {
        let mut rows = self
            .conn
            .query(
                "SELECT properties_json FROM records WHERE id = ?1",
                params![id.as_str()],
            )
            .await
            .map_err(storage_err)?;

        match rows.next().await.map_err(storage_err)? {
            Some(row) => {
                let json: String = row.get(0).map_err(storage_err)?;
                Ok(Some(decode_properties(&json)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl DocumentStore for Storage {
    #[instrument(skip_all, fields(collection = %query.collection, start = %query.start, end = %query.end))]
    async fn query_by_date_range(&self, query: &DateRangeQuery) -> Result<Vec<RawRecord>> {
        let date_path = value_path(&query.date_field);
        let start = query.start.to_string();
        let end = query.end.to_string();

        let mut rows = match &query.filter {
            None => self
                .conn
                .query(
                    "SELECT id, properties_json FROM records
                     WHERE collection = ?1
                       AND json_extract(properties_json, ?2) BETWEEN ?3 AND ?4
                     ORDER BY json_extract(properties_json, ?2) ASC, created_at ASC, rowid ASC",
                    params![
                        query.collection.as_str(),
                        date_path.as_str(),
                        start.as_str(),
                        end.as_str()
                    ],
                )
                .await,
            Some(filter) => {
                let filter_path = value_path(&filter.field);
                self.conn
                    .query(
                        "SELECT id, properties_json FROM records
                         WHERE collection = ?1
                           AND json_extract(properties_json, ?2) BETWEEN ?3 AND ?4
                           AND json_extract(properties_json, ?5) = ?6
                         ORDER BY json_extract(properties_json, ?2) ASC, created_at ASC, rowid ASC",
                        params![
                            query.collection.as_str(),
                            date_path.as_str(),
                            start.as_str(),
                            end.as_str(),
                            filter_path.as_str(),
                            filter.equals.as_str()
                        ],
                    )
                    .await
            }
        }
        .map_err(storage_err)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(storage_err)? {
            let id: String = row.get(0).map_err(storage_err)?;
            let json: String = row.get(1).map_err(storage_err)?;
            results.push(RawRecord {
                id: Some(RecordId(id)),
                properties: decode_properties(&json)?,
            });
        }

        debug!(matched = results.len(), "date range query complete");
        Ok(results)
    }

    async fn fetch_content_blocks(&self, id: &RecordId) -> Result<Vec<ContentNode>> {
        let mut rows = self
            .conn
            .query(
                "SELECT kind, level, text FROM content_blocks
                 WHERE record_id = ?1 ORDER BY position",
                params![id.as_str()],
            )
            .await
            .map_err(storage_err)?;

        let mut nodes = Vec::new();
        while let Some(row) = rows.next().await.map_err(storage_err)? {
            let kind: String = row.get(0).map_err(storage_err)?;
            let level: Option<u8> = row.get::<i64>(1).ok().map(|v| v as u8);
            let text: String = row.get(2).map_err(storage_err)?;
            nodes.push(ContentNode::from_parts(&kind, level, text)?);
        }
        Ok(nodes)
    }

    #[instrument(skip(self, properties, content), fields(blocks = content.len()))]
    async fn create_record(
        &self,
        collection: &str,
        properties: &Properties,
        content: &[ContentNode],
    ) -> Result<RecordId> {
        let id = RecordId::generate();
        let now = Utc::now().to_rfc3339();
        let json = serde_json::to_string(properties).map_err(storage_err)?;

        let tx = self.conn.transaction().await.map_err(storage_err)?;

        tx.execute(
            "INSERT INTO records (id, collection, properties_json, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![id.as_str(), collection, json.as_str(), now.as_str()],
        )
        .await
        .map_err(storage_err)?;

        for (position, node) in content.iter().enumerate() {
            let level = match node {
                ContentNode::Heading { level, .. } => Some(i64::from(*level)),
                _ => None,
            };
            tx.execute(
                "INSERT INTO content_blocks (record_id, position, kind, level, text)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id.as_str(),
                    position as i64,
                    node.kind(),
                    level,
                    node.text()
                ],
            )
            .await
            .map_err(storage_err)?;
        }

        tx.commit().await.map_err(storage_err)?;

        debug!(%id, "record created");
        Ok(id)
    }

    async fn record_collection(&self, id: &RecordId) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT collection FROM records WHERE id = ?1",
                params![id.as_str()],
            )
            .await
            .map_err(storage_err)?;

        match rows.next().await.map_err(storage_err)? {
            Some(row) => Ok(Some(row.get::<String>(0).map_err(storage_err)?)),
            None => Ok(None),
        }
    }

    async fn update_field(&self, id: &RecordId, field: &str, value: PropertyValue) -> Result<()> {
        let mut properties = self
            .get_properties(id)
            .await?
            .ok_or_else(|| WorklogError::Storage(format!("record {id} not found")))?;

        properties.insert(field.to_string(), value);
        let json = serde_json::to_string(&properties).map_err(storage_err)?;

        self.conn
            .execute(
                "UPDATE records SET properties_json = ?1 WHERE id = ?2",
                params![json.as_str(), id.as_str()],
            )
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}

fn decode_properties(json: &str) -> Result<Properties> {
    serde_json::from_str(json)
        .map_err(|e| WorklogError::Storage(format!("corrupt properties: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;
    use worklog_shared::fields;

    /// Create a temp file storage for testing.
    async fn test_storage() -> Storage {
        let tmp = std::env::temp_dir().join(format!("worklog_test_{}.db", Uuid::now_v7()));
        Storage::open(&tmp).await.expect("open test db")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily(title: &str, logged: NaiveDate, status: &str) -> Properties {
        let mut props = Properties::new();
        props.insert(fields::TITLE.into(), PropertyValue::Text(title.into()));
        props.insert(fields::LOGGED_DATE.into(), PropertyValue::Date(logged));
        props.insert(fields::STATUS.into(), PropertyValue::Select(status.into()));
        props
    }

    fn range(collection: &str, start: NaiveDate, end: NaiveDate) -> DateRangeQuery {
        DateRangeQuery {
            collection: collection.into(),
            date_field: fields::LOGGED_DATE.into(),
            start,
            end,
            filter: None,
        }
    }

    fn titles(records: &[RawRecord]) -> Vec<&str> {
        records
            .iter()
            .map(|r| r.properties[fields::TITLE].as_text().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let storage = test_storage().await;
        let version = storage.get_schema_version().await;
        assert_eq!(version, 1);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let tmp = std::env::temp_dir().join(format!("worklog_test_{}.db", Uuid::now_v7()));
        let _s1 = Storage::open(&tmp).await.expect("first open");
        drop(_s1);
        let s2 = Storage::open(&tmp).await.expect("second open");
        assert_eq!(s2.get_schema_version().await, 1);
    }

    #[tokio::test]
    async fn range_query_is_inclusive_and_sorted() {
        let storage = test_storage().await;
        for (title, day) in [("late", 9), ("early", 3), ("outside", 10), ("mid", 5)] {
            storage
                .create_record("daily", &daily(title, date(2025, 11, day), "Logged"), &[])
                .await
                .expect("create");
        }

        let found = storage
            .query_by_date_range(&range("daily", date(2025, 11, 3), date(2025, 11, 9)))
            .await
            .expect("query");

        assert_eq!(titles(&found), vec!["early", "mid", "late"]);
        assert!(found.iter().all(|r| r.id.is_some()));
    }

    #[tokio::test]
    async fn range_query_scopes_to_collection_and_filter() {
        let storage = test_storage().await;
        let day = date(2025, 11, 4);
        storage
            .create_record("daily", &daily("logged", day, "Logged"), &[])
            .await
            .unwrap();
        storage
            .create_record("daily", &daily("published", day, "Published"), &[])
            .await
            .unwrap();
        storage
            .create_record("other", &daily("elsewhere", day, "Logged"), &[])
            .await
            .unwrap();

        let all = storage
            .query_by_date_range(&range("daily", day, day))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let mut filtered = range("daily", day, day);
        filtered.filter = Some(FieldFilter::new(fields::STATUS, "Published"));
        let found = storage.query_by_date_range(&filtered).await.unwrap();
        assert_eq!(titles(&found), vec!["published"]);
    }

    #[tokio::test]
    async fn content_blocks_keep_order() {
        let storage = test_storage().await;
        let content = vec![
            ContentNode::heading(2, "📝 상세 컨텍스트"),
            ContentNode::paragraph("line1\nline2"),
            ContentNode::bullet("b"),
            ContentNode::numbered("n"),
            ContentNode::heading(3, "h3"),
        ];
        let id = storage
            .create_record("daily", &daily("t", date(2025, 1, 1), "Logged"), &content)
            .await
            .unwrap();

        let fetched = storage.fetch_content_blocks(&id).await.unwrap();
        assert_eq!(fetched, content);

        let none = storage
            .fetch_content_blocks(&RecordId::from("missing"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn relation_properties_roundtrip() {
        let storage = test_storage().await;
        let mut props = Properties::new();
        props.insert(
            fields::PERIOD_START.into(),
            PropertyValue::Date(date(2025, 11, 3)),
        );
        props.insert(
            fields::SOURCE_LOGS.into(),
            PropertyValue::relation(["a", "b"].map(RecordId::from)),
        );
        let id = storage.create_record("weekly", &props, &[]).await.unwrap();

        let loaded = storage.get_properties(&id).await.unwrap().unwrap();
        assert_eq!(loaded, props);
        assert_eq!(storage.count_records("weekly").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_field_overwrites_one_property() {
        let storage = test_storage().await;
        let id = storage
            .create_record("daily", &daily("t", date(2025, 2, 2), "Logged"), &[])
            .await
            .unwrap();

        storage
            .update_field(&id, fields::STATUS, PropertyValue::Select("Published".into()))
            .await
            .expect("update");

        let props = storage.get_properties(&id).await.unwrap().unwrap();
        assert_eq!(props[fields::STATUS].as_text(), Some("Published"));
        assert_eq!(props[fields::TITLE].as_text(), Some("t"));
    }

    #[tokio::test]
    async fn record_collection_lookup() {
        let storage = test_storage().await;
        let id = storage
            .create_record("daily", &daily("t", date(2025, 2, 2), "Logged"), &[])
            .await
            .unwrap();

        assert_eq!(
            storage.record_collection(&id).await.unwrap().as_deref(),
            Some("daily")
        );
        assert_eq!(
            storage.record_collection(&RecordId::from("nope")).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn update_unknown_record_fails() {
        let storage = test_storage().await;
        let err = storage
            .update_field(
                &RecordId::from("nope"),
                fields::STATUS,
                PropertyValue::Select("Published".into()),
            )
            .await
            .unwrap_err();
        assert!(err.is_backend_failure());
        assert!(err.to_string().contains("not found"));
    }
}
