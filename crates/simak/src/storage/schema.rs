//! `SQLite` schema definitions for simak.
//!
//! The register keeps every value as a string under a string key. Long-lived
//! values and session values live in separate tables so the session scope can
//! expire without touching case data.

/// SQL statement to create the long-lived key/value table.
pub const CREATE_LOCAL_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS local_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create the session-scoped key/value table.
pub const CREATE_SESSION_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS session_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    touched_at TEXT NOT NULL
)
";

/// SQL statement to create an index on `touched_at` for session expiry.
pub const CREATE_SESSION_TOUCHED_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_session_touched ON session_store(touched_at)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_LOCAL_TABLE,
    CREATE_SESSION_TABLE,
    CREATE_SESSION_TOUCHED_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_store_tables_are_key_value() {
        for table in [CREATE_LOCAL_TABLE, CREATE_SESSION_TABLE] {
            assert!(table.contains("key TEXT PRIMARY KEY"));
            assert!(table.contains("value TEXT NOT NULL"));
        }
        assert!(CREATE_SESSION_TABLE.contains("touched_at TEXT NOT NULL"));
    }
}
