// SQLite prediction log

use crate::model::Mood;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;

/// One logged generation request. Sequences are stored as comma-joined
/// chord names, the same shape they travel over the wire.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRecord {
    pub id: i64,
    pub mood: String,
    pub input_sequence: String,
    pub generated_progression: String,
    pub timestamp: String,
}

/// Append-only log of successful generations.
///
/// Wraps Connection in a parking_lot::Mutex since rusqlite::Connection is
/// not Sync; the single lock also serializes concurrent appends so records
/// never interleave. parking_lot avoids mutex poisoning on panic.
pub struct PredictionLog {
    conn: Mutex<Connection>,
}

impl PredictionLog {
    /// Open or create the log database.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let log = Self {
            conn: Mutex::new(conn),
        };
        log.init_schema()?;
        Ok(log)
    }

    /// Open an in-memory log (fallback when the file database fails).
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let log = Self {
            conn: Mutex::new(conn),
        };
        log.init_schema()?;

        log::warn!("Using in-memory prediction log - records will not persist across restarts");

        Ok(log)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS predictions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                mood TEXT NOT NULL,
                input_sequence TEXT NOT NULL,
                generated_progression TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_predictions_timestamp
                ON predictions(timestamp DESC);
        "#,
        )?;
        Ok(())
    }

    /// Append a record for a completed generation.
    pub fn append(
        &self,
        mood: Mood,
        input: &[String],
        progression: &[String],
    ) -> anyhow::Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT INTO predictions (mood, input_sequence, generated_progression, timestamp)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                mood.as_str(),
                input.join(","),
                progression.join(","),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// All records, most recent first.
    pub fn all_records(&self) -> anyhow::Result<Vec<PredictionRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, mood, input_sequence, generated_progression, timestamp
            FROM predictions
            ORDER BY timestamp DESC, id DESC
            "#,
        )?;

        let mut records = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            records.push(PredictionRecord {
                id: row.get(0)?,
                mood: row.get(1)?,
                input_sequence: row.get(2)?,
                generated_progression: row.get(3)?,
                timestamp: row.get(4)?,
            });
        }
        Ok(records)
    }
}
