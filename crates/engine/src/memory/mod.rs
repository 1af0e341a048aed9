use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Result;
use rusqlite::Connection;
use wello_shared::{Role, ThreadId};

/// One stored turn of a conversation thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Clone)]
pub struct Db {
    db: Arc<Mutex<Connection>>,
}

impl Db {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::configure(&conn)?;

        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    /// Private in-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure(&conn)?;

        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    fn configure(conn: &Connection) -> Result<()> {
        // Wait up to 5 seconds if the database is locked
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Self::create_tables(conn)
    }

    fn create_tables(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            -- Conversation threads, keyed by the client-minted id
            CREATE TABLE IF NOT EXISTS threads (
                id TEXT PRIMARY KEY,
                created INTEGER NOT NULL,
                last_accessed INTEGER NOT NULL
            );

            -- Messages, ordered within their thread
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                thread_id TEXT NOT NULL,
                role TEXT NOT NULL,
                message TEXT NOT NULL,
                m_order INTEGER NOT NULL,
                created INTEGER NOT NULL,
                FOREIGN KEY (thread_id) REFERENCES threads(id)
                    ON DELETE CASCADE
                    ON UPDATE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_messages_thread ON messages(thread_id);
        ",
        )?;
        Ok(())
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db.lock().map_err(|e| anyhow::anyhow!("Lock error: {}", e))
    }

    /// Create the thread row on first sight and bump its access time.
    pub fn touch_thread(&self, thread_id: &ThreadId) -> Result<()> {
        let conn = self.lock()?;
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;

        conn.execute(
            "INSERT OR IGNORE INTO threads (id, created, last_accessed) VALUES (?1, ?2, ?2)",
            rusqlite::params![thread_id.as_str(), now],
        )?;
        conn.execute(
            "UPDATE threads SET last_accessed = ?1 WHERE id = ?2",
            rusqlite::params![now, thread_id.as_str()],
        )?;

        Ok(())
    }

    /// Append a message to a thread.
    pub fn append_message(&self, thread_id: &ThreadId, role: Role, content: &str) -> Result<()> {
        let conn = self.lock()?;
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;

        conn.execute(
            "INSERT INTO messages (thread_id, role, message, m_order, created)
             VALUES (?1, ?2, ?3,
                     COALESCE((SELECT MAX(m_order) FROM messages WHERE thread_id = ?1), 0) + 1,
                     ?4)",
            rusqlite::params![thread_id.as_str(), role.as_str(), content, now],
        )?;

        Ok(())
    }

    /// Get all messages for a thread, oldest first.
    pub fn history(&self, thread_id: &ThreadId) -> Result<Vec<StoredMessage>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT role, message FROM messages
             WHERE thread_id = ?1
             ORDER BY m_order",
        )?;

        let rows = stmt.query_map(rusqlite::params![thread_id.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut messages = Vec::new();
        for row in rows {
            let (role, content) = row?;
            let role = Role::from_str(&role)
                .ok_or_else(|| anyhow::anyhow!("Unknown role in history: {}", role))?;
            messages.push(StoredMessage { role, content });
        }
        Ok(messages)
    }
}
