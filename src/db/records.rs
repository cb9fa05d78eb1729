//! Generic row store
//!
//! Movies and directors share one CRUD implementation. A type opts in by
//! implementing [`Record`], which names its table and columns and converts
//! between rows and values; [`RecordStore`] supplies the statements.

use super::{Database, StoreError};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, OptionalExtension, Row};
use serde::Serialize;
use std::marker::PhantomData;
use tracing::info;

/// A table-backed entity with an integer primary key named `id`.
pub trait Record: Serialize + Send + Sync + Sized + 'static {
    /// Singular noun used in log lines and error messages.
    const NAME: &'static str;
    const TABLE: &'static str;
    /// `CREATE TABLE IF NOT EXISTS` statement for [`Self::TABLE`].
    const SCHEMA: &'static str;
    /// Non-key columns, in the order [`Record::bind`] produces values.
    const COLUMNS: &'static [&'static str];

    /// Validated field values without a key.
    type Draft: Send + 'static;

    /// Build from a row selected as `id, COLUMNS...`.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn bind(draft: &Self::Draft) -> Vec<Value>;

    fn with_id(id: i64, draft: Self::Draft) -> Self;
}

/// CRUD over one [`Record`] table.
pub struct RecordStore<R> {
    db: Database,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for RecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _record: PhantomData,
        }
    }
}

fn select_columns<R: Record>() -> String {
    std::iter::once("id")
        .chain(R::COLUMNS.iter().copied())
        .collect::<Vec<_>>()
        .join(", ")
}

fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl<R: Record> RecordStore<R> {
    /// Wrap `db`, creating the table when it does not exist yet.
    pub async fn new(db: Database) -> Result<Self, StoreError> {
        db.lock().await.execute(R::SCHEMA, [])?;
        Ok(Self {
            db,
            _record: PhantomData,
        })
    }

    /// Insert `drafts` when the table holds no rows. Returns how many were written.
    pub async fn seed_if_empty(&self, drafts: Vec<R::Draft>) -> Result<usize, StoreError> {
        let mut conn = self.db.lock().await;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(id) FROM {}", R::TABLE),
            [],
            |row| row.get(0),
        )?;
        if count > 0 {
            return Ok(0);
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            R::TABLE,
            R::COLUMNS.join(", "),
            placeholders(R::COLUMNS.len())
        );
        let tx = conn.transaction()?;
        for draft in &drafts {
            tx.execute(&sql, params_from_iter(R::bind(draft)))?;
        }
        tx.commit()?;

        info!(table = R::TABLE, rows = drafts.len(), "Seeded empty table");
        Ok(drafts.len())
    }

    pub async fn list(&self) -> Result<Vec<R>, StoreError> {
        let conn = self.db.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY id",
            select_columns::<R>(),
            R::TABLE
        ))?;
        let rows = stmt
            .query_map([], |row| R::from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub async fn get(&self, id: i64) -> Result<Option<R>, StoreError> {
        let conn = self.db.lock().await;
        let record = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE id = ?1",
                    select_columns::<R>(),
                    R::TABLE
                ),
                [id],
                |row| R::from_row(row),
            )
            .optional()?;
        Ok(record)
    }

    pub async fn insert(&self, draft: R::Draft) -> Result<R, StoreError> {
        let conn = self.db.lock().await;
        conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES ({})",
                R::TABLE,
                R::COLUMNS.join(", "),
                placeholders(R::COLUMNS.len())
            ),
            params_from_iter(R::bind(&draft)),
        )?;
        let id = conn.last_insert_rowid();

        info!(record = R::NAME, id, "Created");
        Ok(R::with_id(id, draft))
    }

    /// Overwrite every column of row `id`. `None` when the row does not exist.
    pub async fn update(&self, id: i64, draft: R::Draft) -> Result<Option<R>, StoreError> {
        let assignments = R::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{col} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let mut values = R::bind(&draft);
        values.push(Value::Integer(id));

        let conn = self.db.lock().await;
        let changed = conn.execute(
            &format!(
                "UPDATE {} SET {} WHERE id = ?{}",
                R::TABLE,
                assignments,
                values.len()
            ),
            params_from_iter(values),
        )?;
        if changed == 0 {
            return Ok(None);
        }

        info!(record = R::NAME, id, "Updated");
        Ok(Some(R::with_id(id, draft)))
    }

    /// Delete row `id`. `false` when nothing was deleted.
    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.db.lock().await;
        let changed = conn.execute(&format!("DELETE FROM {} WHERE id = ?1", R::TABLE), [id])?;
        if changed > 0 {
            info!(record = R::NAME, id, "Deleted");
        }
        Ok(changed > 0)
    }
}
