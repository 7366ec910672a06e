mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::models::numeric::coerce_str;
use crate::models::*;
use crate::repo::{BillRepository, CategoryRepository, RepoError, RepoResult, Store};

const CATEGORY_COLUMNS: &str =
    "id, name, category_type, percentage_limit, amount, actual_amount, user_id, description";
const BILL_COLUMNS: &str = "id, bill_type, amount, date, category_id, user_id, description";

/// Local SQLite store. Stands in for the REST backend when running offline.
pub(crate) struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        db.migrate().context("Database migration failed")?;
        tracing::debug!(path = %path.display(), "opened local database");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn, path: None };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(version = schema::CURRENT_VERSION, "created database schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(
                from = current,
                to = schema::CURRENT_VERSION,
                "migrated database schema"
            );
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn get_category_by_id(&self, id: i64) -> RepoResult<Option<Category>> {
        let result = self.conn.query_row(
            &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"),
            params![id],
            category_from_row,
        );
        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Recompute every category's `actual_amount` for `user_id` as the sum of
    /// its bills. Returns how many categories changed.
    pub(crate) fn sync_actual_amounts(&mut self, user_id: i64) -> RepoResult<usize> {
        let categories = self.list(user_id)?;
        let mut accrued: HashMap<i64, Decimal> = HashMap::new();
        for bill in self.list_bills(user_id)? {
            let entry = accrued.entry(bill.category_id).or_default();
            *entry = entry.saturating_add(bill.amount);
        }

        let tx = self.conn.transaction()?;
        let mut changed = 0;
        for cat in &categories {
            let Some(id) = cat.id else { continue };
            let actual = accrued.get(&id).copied().unwrap_or(Decimal::ZERO);
            if actual != cat.actual_amount {
                tx.execute(
                    "UPDATE categories SET actual_amount = ?1 WHERE id = ?2",
                    params![actual.to_string(), id],
                )?;
                changed += 1;
            }
        }
        tx.commit()?;
        tracing::info!(user_id, changed, "synced actual amounts from bills");
        Ok(changed)
    }

    pub(crate) fn bill_count_for_category(&self, category_id: i64) -> RepoResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM bills WHERE category_id = ?1",
            params![category_id],
            |row| row.get(0),
        )?)
    }
}

fn category_type_from(idx: usize, raw: &str) -> rusqlite::Result<CategoryType> {
    CategoryType::parse(raw).ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(idx, raw.to_string(), rusqlite::types::Type::Text)
    })
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        category_type: category_type_from(2, &row.get::<_, String>(2)?)?,
        percentage_limit: coerce_str(&row.get::<_, String>(3)?),
        amount: coerce_str(&row.get::<_, String>(4)?),
        actual_amount: coerce_str(&row.get::<_, String>(5)?),
        user_id: row.get(6)?,
        description: row.get(7)?,
    })
}

fn bill_from_row(row: &Row<'_>) -> rusqlite::Result<Bill> {
    Ok(Bill {
        id: Some(row.get(0)?),
        bill_type: category_type_from(1, &row.get::<_, String>(1)?)?,
        amount: coerce_str(&row.get::<_, String>(2)?),
        date: row.get(3)?,
        category_id: row.get(4)?,
        user_id: row.get(5)?,
        description: row.get(6)?,
    })
}

impl CategoryRepository for Database {
    fn list(&self, user_id: i64) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE user_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![user_id], category_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn create(&self, category: &Category) -> RepoResult<Category> {
        self.conn.execute(
            "INSERT INTO categories (name, category_type, percentage_limit, amount, actual_amount, user_id, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                category.name,
                category.category_type.code(),
                category.percentage_limit.to_string(),
                category.amount.to_string(),
                category.actual_amount.to_string(),
                category.user_id,
                category.description,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        let mut created = category.clone();
        created.id = Some(self.conn.last_insert_rowid());
        Ok(created)
    }

    fn update(&self, category: &Category) -> RepoResult<Category> {
        let id = category.id.ok_or(RepoError::MissingId("category"))?;
        let changed = self.conn.execute(
            "UPDATE categories
             SET name = ?1, category_type = ?2, percentage_limit = ?3, amount = ?4,
                 actual_amount = ?5, user_id = ?6, description = ?7
             WHERE id = ?8",
            params![
                category.name,
                category.category_type.code(),
                category.percentage_limit.to_string(),
                category.amount.to_string(),
                category.actual_amount.to_string(),
                category.user_id,
                category.description,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "category",
                id,
            });
        }
        Ok(category.clone())
    }

    fn delete(&self, id: i64) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "category",
                id,
            });
        }
        Ok(())
    }
}

impl BillRepository for Database {
    fn list_bills(&self, user_id: i64) -> RepoResult<Vec<Bill>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BILL_COLUMNS} FROM bills WHERE user_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![user_id], bill_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn create_bill(&self, bill: &Bill) -> RepoResult<Bill> {
        self.conn.execute(
            "INSERT INTO bills (bill_type, amount, date, category_id, user_id, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                bill.bill_type.code(),
                bill.amount.to_string(),
                bill.date,
                bill.category_id,
                bill.user_id,
                bill.description,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        let mut created = bill.clone();
        created.id = Some(self.conn.last_insert_rowid());
        Ok(created)
    }

    fn update_bill(&self, bill: &Bill) -> RepoResult<Bill> {
        let id = bill.id.ok_or(RepoError::MissingId("bill"))?;
        let changed = self.conn.execute(
            "UPDATE bills
             SET bill_type = ?1, amount = ?2, date = ?3, category_id = ?4, user_id = ?5, description = ?6
             WHERE id = ?7",
            params![
                bill.bill_type.code(),
                bill.amount.to_string(),
                bill.date,
                bill.category_id,
                bill.user_id,
                bill.description,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "bill", id });
        }
        Ok(bill.clone())
    }

    fn delete_bill(&self, id: i64) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM bills WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "bill", id });
        }
        Ok(())
    }
}

impl Store for Database {
    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("local {}", path.display()),
            None => "local (in memory)".to_string(),
        }
    }
}
