use crate::Database;
use crate::models::MessageRow;
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Messages --

    /// Create or overwrite the owner's message in a single statement.
    pub fn upsert_message(&self, owner: &str, text: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (owner, text) VALUES (?1, ?2)
                 ON CONFLICT(owner) DO UPDATE SET text = excluded.text, updated_at = datetime('now')",
                (owner, text),
            )?;
            Ok(())
        })
    }

    /// Returns true if a row was removed.
    pub fn delete_message(&self, owner: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM messages WHERE owner = ?1", [owner])?;
            Ok(removed > 0)
        })
    }

    pub fn get_message(&self, owner: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message(conn, owner))
    }

    pub fn count_messages(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }
}

fn query_message(conn: &Connection, owner: &str) -> Result<Option<MessageRow>> {
    let mut stmt = conn.prepare("SELECT owner, text, updated_at FROM messages WHERE owner = ?1")?;

    let row = stmt
        .query_row([owner], |row| {
            Ok(MessageRow {
                owner: row.get(0)?,
                text: row.get(1)?,
                updated_at: row.get(2)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
