//! SQLite persistence for merged action logs — the concrete analytics sink
//! behind the recorder. The store only ever receives snapshots; the live
//! log stays with the recorder.

use rusqlite::{Connection, params};
use std::path::Path;
use uuid::Uuid;

use super::actions::{ActionKind, CodingAction};
use crate::error::PairviewError;

/// Current schema version (must match MIGRATIONS.len())
const SCHEMA_VERSION: usize = 1;

/// Database migrations - each migration upgrades the schema by one version
/// Migration at index N upgrades from version N to version N+1
const MIGRATIONS: &[&str] = &[
    // Migration 0 -> 1: Initial schema with actions table
    r#"
    CREATE TABLE actions (
        session_id TEXT NOT NULL,
        seq INTEGER NOT NULL,
        kind TEXT NOT NULL,
        content TEXT NOT NULL,
        timestamp INTEGER NOT NULL,
        duration INTEGER NOT NULL,
        extra TEXT,
        PRIMARY KEY (session_id, seq)
    );

    CREATE INDEX idx_actions_session_id
        ON actions(session_id);
    CREATE INDEX idx_actions_timestamp
        ON actions(timestamp);
    "#,
    // Future migrations go here as new entries
];

/// Owned handle over the action database
pub struct ActionStore {
    conn: Connection,
}

impl ActionStore {
    /// Open (and migrate) the store at `path`
    pub fn open(path: &Path) -> Result<Self, PairviewError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // WAL mode keeps concurrent readers cheap
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let mut store = ActionStore { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// In-memory store for tests
    pub fn open_in_memory() -> Result<Self, PairviewError> {
        let conn = Connection::open_in_memory()?;
        let mut store = ActionStore { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&mut self) -> Result<(), PairviewError> {
        let current_version: usize =
            self.conn
                .query_row("PRAGMA user_version", [], |row| row.get::<_, i64>(0))? as usize;

        if current_version > SCHEMA_VERSION {
            return Err(PairviewError::Generic(format!(
                "Database schema version {} is newer than supported version {}",
                current_version, SCHEMA_VERSION
            )));
        }

        for (idx, migration) in MIGRATIONS.iter().enumerate().skip(current_version) {
            self.conn.execute_batch(migration)?;
            self.conn
                .pragma_update(None, "user_version", (idx + 1) as i64)?;
        }

        Ok(())
    }

    /// Replace the stored log for `session_id` with `actions`
    pub fn save_actions(
        &mut self,
        session_id: &Uuid,
        actions: &[CodingAction],
    ) -> Result<(), PairviewError> {
        let tx = self.conn.transaction()?;
        let sid = session_id.to_string();

        tx.execute("DELETE FROM actions WHERE session_id = ?1", params![sid])?;
        for (seq, action) in actions.iter().enumerate() {
            let extra = action
                .extra
                .as_ref()
                .map(|value| serde_json::to_string(value))
                .transpose()?;
            tx.execute(
                "INSERT INTO actions (session_id, seq, kind, content, timestamp, duration, extra)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    sid,
                    seq as i64,
                    action.kind.as_str(),
                    action.content,
                    action.timestamp as i64,
                    action.duration as i64,
                    extra,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Load a stored log in recorded order
    pub fn load_actions(&self, session_id: &Uuid) -> Result<Vec<CodingAction>, PairviewError> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, content, timestamp, duration, extra
             FROM actions WHERE session_id = ?1 ORDER BY seq",
        )?;

        let rows = stmt.query_map(params![session_id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;

        let mut actions = Vec::new();
        for row in rows {
            let (kind_name, content, timestamp, duration, extra_raw) = row?;
            let kind = ActionKind::from_str(&kind_name).ok_or_else(|| {
                PairviewError::Generic(format!("Unknown action kind in store: {}", kind_name))
            })?;
            let extra = match extra_raw {
                Some(raw) => Some(serde_json::from_str(&raw)?),
                None => None,
            };
            actions.push(CodingAction {
                kind,
                content,
                timestamp: timestamp as u64,
                duration: duration as u64,
                extra,
            });
        }

        Ok(actions)
    }

    /// Distinct session ids with stored actions
    pub fn session_ids(&self) -> Result<Vec<String>, PairviewError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT session_id FROM actions ORDER BY session_id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// Delete a stored session; returns the number of rows removed
    pub fn delete_session(&mut self, session_id: &Uuid) -> Result<usize, PairviewError> {
        let deleted = self.conn.execute(
            "DELETE FROM actions WHERE session_id = ?1",
            params![session_id.to_string()],
        )?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_actions() -> Vec<CodingAction> {
        vec![
            CodingAction::new(ActionKind::Type, "fn main", 1_000).with_duration(40),
            CodingAction {
                kind: ActionKind::Wait,
                content: String::new(),
                timestamp: 1_040,
                duration: 3_200,
                extra: None,
            },
            CodingAction {
                kind: ActionKind::Select,
                content: "fn main".to_string(),
                timestamp: 4_240,
                duration: 12,
                extra: Some(serde_json::json!({"lines": 1})),
            },
        ]
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let mut store = ActionStore::open_in_memory().unwrap();
        let session = Uuid::new_v4();
        let actions = sample_actions();

        store.save_actions(&session, &actions).unwrap();
        let loaded = store.load_actions(&session).unwrap();
        assert_eq!(loaded, actions);
    }

    #[test]
    fn test_save_replaces_previous_log() {
        let mut store = ActionStore::open_in_memory().unwrap();
        let session = Uuid::new_v4();

        store.save_actions(&session, &sample_actions()).unwrap();
        let shorter = vec![CodingAction::new(ActionKind::Paste, "x", 9_000)];
        store.save_actions(&session, &shorter).unwrap();

        let loaded = store.load_actions(&session).unwrap();
        assert_eq!(loaded, shorter);
    }

    #[test]
    fn test_load_unknown_session_is_empty() {
        let store = ActionStore::open_in_memory().unwrap();
        assert!(store.load_actions(&Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn test_session_ids_and_delete() {
        let mut store = ActionStore::open_in_memory().unwrap();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        store.save_actions(&first, &sample_actions()).unwrap();
        store.save_actions(&second, &sample_actions()).unwrap();
        assert_eq!(store.session_ids().unwrap().len(), 2);

        let deleted = store.delete_session(&first).unwrap();
        assert_eq!(deleted, 3);
        assert_eq!(store.session_ids().unwrap().len(), 1);
        assert!(store.load_actions(&first).unwrap().is_empty());
    }

    #[test]
    fn test_open_on_disk_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actions").join("log.db");
        let session = Uuid::new_v4();

        {
            let mut store = ActionStore::open(&path).unwrap();
            store.save_actions(&session, &sample_actions()).unwrap();
        }

        let store = ActionStore::open(&path).unwrap();
        let loaded = store.load_actions(&session).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].kind, ActionKind::Type);
    }
}
