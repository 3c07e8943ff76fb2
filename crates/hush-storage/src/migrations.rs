use rusqlite::Connection;

use crate::error::StorageError;
use crate::models::FILTER_TABLE;

/// Initialize the filter table
///
/// Safe to call repeatedly; the table is only created when missing.
///
/// # Errors
///
/// Returns an error if table creation fails
pub fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {FILTER_TABLE} (
                id INTEGER PRIMARY KEY NOT NULL,
                key TEXT NOT NULL UNIQUE,
                value TEXT
            )"
        ),
        [],
    )?;

    log::debug!("Filter table ready: {FILTER_TABLE}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [FILTER_TABLE],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
