//! Offline heartbeat queue.
//!
//! Heartbeats the API did not accept are parked in a local single-file
//! SQLite database and drained on later invocations. The store is one table
//! keyed by an opaque sortable string, so iteration order is insertion order
//! and the drain is FIFO.
//!
//! Concurrent invocations are serialized by SQLite's file lock. A writer that
//! cannot take the lock within [`LOCK_WAIT_MS`] fails with [`QueueError::Busy`]
//! and leaves its heartbeats with the caller; the queue never drops data on
//! contention.

mod error;
mod stored;

pub use error::{QueueError, Result};

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection, OpenFlags};
use tracing::debug;

use pulse_heartbeat::Heartbeat;
use stored::StoredHeartbeat;

/// How long a call waits for the file lock before failing with `Busy`.
pub const LOCK_WAIT_MS: u32 = 30_000;

/// File name of the queue database in the user's data directory.
pub const QUEUE_FILE_NAME: &str = "offline_heartbeats.db";

/// Handle to the on-disk queue.
///
/// Each operation opens its own connection and runs inside one transaction,
/// so a crash mid-call leaves the file in its prior state.
#[derive(Debug, Clone)]
pub struct Queue {
    path: PathBuf,
}

impl Queue {
    /// Create a handle for the queue file at `path`.
    ///
    /// The file and its table are created lazily on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The queue file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append heartbeats in order, all within one transaction.
    ///
    /// Queue ids are zero-padded nanosecond timestamps with a process-wide
    /// sequence suffix; lexicographic id order equals insertion order.
    pub fn push_many(&self, heartbeats: Vec<Heartbeat>) -> Result<()> {
        if heartbeats.is_empty() {
            return Ok(());
        }

        debug!("storing {} heartbeat(s) in offline queue", heartbeats.len());

        let mut conn = self.open()?;
        let tx = conn.transaction()?;

        let base = unix_nanos();
        for heartbeat in heartbeats {
            let seq = NEXT_SEQ.fetch_add(1, Ordering::Relaxed);
            let id = format!("{base:020}-{seq:06}");
            let body = serde_json::to_string(&StoredHeartbeat::from(heartbeat))?;
            tx.execute(
                "INSERT INTO heartbeats (id, heartbeat) VALUES (?1, ?2)",
                params![id, body],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Remove and return up to `limit` heartbeats, oldest first.
    ///
    /// Rows that fail to decode are deleted and skipped so a poisoned entry
    /// cannot stall the queue; the pop keeps fetching until it has `limit`
    /// good rows or the table is empty.
    pub fn pop_many(&self, limit: usize) -> Result<Vec<Heartbeat>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.open()?;
        let tx = conn.transaction()?;

        let mut popped = Vec::new();

        while popped.len() < limit {
            let batch: Vec<(String, String)> = {
                let mut stmt = tx.prepare(
                    "SELECT id, heartbeat FROM heartbeats ORDER BY id LIMIT ?1",
                )?;
                let rows = stmt.query_map(params![(limit - popped.len()) as i64], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;
                rows.collect::<std::result::Result<_, _>>()?
            };

            if batch.is_empty() {
                break;
            }

            for (id, body) in batch {
                tx.execute("DELETE FROM heartbeats WHERE id = ?1", params![id])?;

                match serde_json::from_str::<StoredHeartbeat>(&body) {
                    Ok(stored) => popped.push(stored.into()),
                    Err(err) => {
                        debug!("discarding invalid offline heartbeat {id}: {err}");
                    }
                }
            }
        }

        tx.commit()?;

        debug!("popped {} heartbeat(s) from offline queue", popped.len());
        Ok(popped)
    }

    /// Number of stored heartbeats.
    pub fn count(&self) -> Result<usize> {
        let conn = self.open()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM heartbeats", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(QueueError::Io)?;
            }
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;

        let conn = Connection::open_with_flags(&self.path, flags)?;
        conn.pragma_update(None, "busy_timeout", LOCK_WAIT_MS)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS heartbeats (
                id TEXT PRIMARY KEY,
                heartbeat TEXT NOT NULL
             );",
        )?;

        Ok(conn)
    }
}

// Disambiguates rows pushed within one timestamp tick; process-wide so
// consecutive pushes in one invocation stay ordered.
static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

fn unix_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
