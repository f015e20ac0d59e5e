use chrono::Utc;
use rusqlite::{params, Row};

use kanban_core::column::{Column, CreateColumn};
use kanban_core::id::new_id;

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_column(row: &Row) -> rusqlite::Result<Column> {
    Ok(Column {
        id: row.get("id")?,
        name: row.get("name")?,
        color: row.get("color")?,
    })
}

impl SqliteDatabase {
    pub fn create_column_sync(&self, input: &CreateColumn) -> Result<Column, DbError> {
        self.with_conn(|conn| {
            let id = new_id();
            conn.execute(
                "INSERT INTO columns (id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![id, input.name, input.color, Utc::now()],
            )
            .to_db()?;
            conn.query_row(
                "SELECT id, name, color FROM columns WHERE id = ?1",
                params![id],
                row_to_column,
            )
            .to_db()
        })
    }

    pub fn get_column_sync(&self, id: &str) -> Result<Column, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, name, color FROM columns WHERE id = ?1",
                params![id],
                row_to_column,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("column {id}")),
                other => DbError::Internal(other.to_string()),
            })
        })
    }

    pub fn list_columns_sync(&self) -> Result<Vec<Column>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, name, color FROM columns ORDER BY rowid")
                .to_db()?;
            let columns = stmt
                .query_map([], row_to_column)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(columns)
        })
    }
}
