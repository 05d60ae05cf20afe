//! SQLite storage backend

use super::traits::{OpenStore, RelationStore, StoreError, StoreResult};
use crate::graph::{ObjectKey, Relation, Snapshot};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed relation store
///
/// Uses a single database file with tables for objects, relationships, and
/// snapshots. Thread-safe via internal mutex on the connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Initialize the database schema
    fn init_schema(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(
            r#"
            -- Object identity rows
            CREATE TABLE IF NOT EXISTS objects (
                object_type TEXT NOT NULL,
                id INTEGER NOT NULL,
                PRIMARY KEY (object_type, id)
            );

            -- Directed mappings between objects (or snapshot stand-ins)
            CREATE TABLE IF NOT EXISTS relationships (
                source_type TEXT NOT NULL,
                source_id INTEGER NOT NULL,
                destination_type TEXT NOT NULL,
                destination_id INTEGER NOT NULL,
                PRIMARY KEY (source_type, source_id, destination_type, destination_id)
            );

            -- Both edge directions are queried equally often
            CREATE INDEX IF NOT EXISTS idx_relationships_source
                ON relationships(source_type, source_id);
            CREATE INDEX IF NOT EXISTS idx_relationships_destination
                ON relationships(destination_type, destination_id);

            -- Captured copies of objects under a scope parent
            CREATE TABLE IF NOT EXISTS snapshots (
                id INTEGER PRIMARY KEY,
                parent_type TEXT NOT NULL,
                parent_id INTEGER NOT NULL,
                child_type TEXT NOT NULL,
                child_id INTEGER NOT NULL,
                captured_at TEXT NOT NULL,
                UNIQUE (parent_type, parent_id, child_type, child_id)
            );

            CREATE INDEX IF NOT EXISTS idx_snapshots_parent
                ON snapshots(parent_type, parent_id);
            CREATE INDEX IF NOT EXISTS idx_snapshots_child
                ON snapshots(child_type, child_id);

            -- Enable WAL mode for concurrent reads during writes
            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    /// Deserialize a snapshot from database columns
    fn row_to_snapshot(
        id: i64,
        parent_type: String,
        parent_id: i64,
        child_type: String,
        child_id: i64,
        captured_at: String,
    ) -> StoreResult<Snapshot> {
        use chrono::DateTime;

        Ok(Snapshot {
            id,
            parent: ObjectKey::new(parent_type, parent_id),
            child: ObjectKey::new(child_type, child_id),
            captured_at: DateTime::parse_from_rfc3339(&captured_at)
                .map_err(|e| StoreError::DateParse(e.to_string()))?
                .with_timezone(&chrono::Utc),
        })
    }

    /// Build a `(type, id) IN (VALUES ...)` fragment plus its parameters
    fn key_values_clause(keys: &[ObjectKey]) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let placeholders: Vec<&str> = keys.iter().map(|_| "(?, ?)").collect();
        let clause = format!("(VALUES {})", placeholders.join(","));
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::with_capacity(keys.len() * 2);
        for key in keys {
            params_vec.push(Box::new(key.object_type.clone()));
            params_vec.push(Box::new(key.id));
        }
        (clause, params_vec)
    }

    // === Write Operations ===
    //
    // The scoring core never writes; these exist for the importer and for
    // test fixtures, so they live on the concrete store rather than the
    // `RelationStore` trait.

    /// Insert an object row (idempotent)
    pub fn save_object(&self, key: &ObjectKey) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO objects (object_type, id) VALUES (?1, ?2)",
            params![key.object_type, key.id],
        )?;
        Ok(())
    }

    /// Insert a relationship row (idempotent)
    pub fn save_relation(&self, relation: &Relation) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT OR IGNORE INTO relationships
                (source_type, source_id, destination_type, destination_id)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                relation.source.object_type,
                relation.source.id,
                relation.destination.object_type,
                relation.destination.id,
            ],
        )?;
        Ok(())
    }

    /// Insert a snapshot row; an existing row for the same (parent, child)
    /// pair or id is left untouched
    pub fn save_snapshot(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT OR IGNORE INTO snapshots
                (id, parent_type, parent_id, child_type, child_id, captured_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                snapshot.id,
                snapshot.parent.object_type,
                snapshot.parent.id,
                snapshot.child.object_type,
                snapshot.child.id,
                snapshot.captured_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl RelationStore for SqliteStore {
    fn object_exists(&self, key: &ObjectKey) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let row: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM objects WHERE object_type = ?1 AND id = ?2",
                params![key.object_type, key.id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(row.is_some())
    }

    fn ids_of_type(&self, object_type: &str) -> StoreResult<Vec<i64>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id FROM objects WHERE object_type = ?1 ORDER BY id")?;
        let ids = stmt
            .query_map(params![object_type], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn relations_of(&self, keys: &[ObjectKey]) -> StoreResult<Vec<Relation>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn.lock().unwrap();

        // The clause appears twice in the SQL, so the parameters do too
        let (clause, mut params_vec) = Self::key_values_clause(keys);
        let (_, second) = Self::key_values_clause(keys);
        params_vec.extend(second);

        let sql = format!(
            r#"
            SELECT source_type, source_id, destination_type, destination_id
            FROM relationships
            WHERE (source_type, source_id) IN {clause}
               OR (destination_type, destination_id) IN {clause}
            "#,
        );

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|b| b.as_ref()).collect();

        let rows = stmt.query_map(params_refs.as_slice(), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut relations = Vec::new();
        for row in rows {
            let (source_type, source_id, destination_type, destination_id) = row?;
            relations.push(Relation::new(
                ObjectKey::new(source_type, source_id),
                ObjectKey::new(destination_type, destination_id),
            ));
        }
        Ok(relations)
    }

    fn snapshots_by_id(&self, ids: &[i64]) -> StoreResult<Vec<Snapshot>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn.lock().unwrap();
        let placeholders: Vec<&str> = ids.iter().map(|_| "?").collect();
        let sql = format!(
            "SELECT id, parent_type, parent_id, child_type, child_id, captured_at
             FROM snapshots WHERE id IN ({})",
            placeholders.join(",")
        );

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            ids.iter().map(|id| id as &dyn rusqlite::ToSql).collect();

        let rows = stmt.query_map(params_refs.as_slice(), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut snapshots = Vec::new();
        for row in rows {
            let (id, parent_type, parent_id, child_type, child_id, captured_at) = row?;
            snapshots.push(Self::row_to_snapshot(
                id,
                parent_type,
                parent_id,
                child_type,
                child_id,
                captured_at,
            )?);
        }
        Ok(snapshots)
    }

    fn snapshots_touching(&self, keys: &[ObjectKey]) -> StoreResult<Vec<Snapshot>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn.lock().unwrap();

        let (clause, mut params_vec) = Self::key_values_clause(keys);
        let (_, second) = Self::key_values_clause(keys);
        params_vec.extend(second);

        let sql = format!(
            r#"
            SELECT id, parent_type, parent_id, child_type, child_id, captured_at
            FROM snapshots
            WHERE (parent_type, parent_id) IN {clause}
               OR (child_type, child_id) IN {clause}
            "#,
        );

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|b| b.as_ref()).collect();

        let rows = stmt.query_map(params_refs.as_slice(), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut snapshots = Vec::new();
        for row in rows {
            let (id, parent_type, parent_id, child_type, child_id, captured_at) = row?;
            snapshots.push(Self::row_to_snapshot(
                id,
                parent_type,
                parent_id,
                child_type,
                child_id,
                captured_at,
            )?);
        }
        Ok(snapshots)
    }

    fn snapshot_of(&self, parent: &ObjectKey, child: &ObjectKey) -> StoreResult<Option<i64>> {
        let conn = self.conn.lock().unwrap();
        let id = conn
            .query_row(
                "SELECT id FROM snapshots
                 WHERE parent_type = ?1 AND parent_id = ?2
                   AND child_type = ?3 AND child_id = ?4",
                params![parent.object_type, parent.id, child.object_type, child.id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id)
    }
}
