//! SQL migration definitions for the work-log database.
//!
//! Migrations are applied in order on database open. Each migration records
//! its version in `schema_migrations` so reopening a database is a no-op.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: records, content_blocks",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version   INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Records of every tier; properties are a JSON object keyed by field name
CREATE TABLE IF NOT EXISTS records (
    id              TEXT PRIMARY KEY,
    collection      TEXT NOT NULL,
    properties_json TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_records_collection ON records(collection);

-- Ordered content body of a record
CREATE TABLE IF NOT EXISTS content_blocks (
    record_id TEXT NOT NULL REFERENCES records(id) ON DELETE CASCADE,
    position  INTEGER NOT NULL,
    kind      TEXT NOT NULL,
    level     INTEGER,
    text      TEXT NOT NULL,
    PRIMARY KEY (record_id, position)
);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
