use rusqlite::params;

use crate::db::models::Category;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// All categories, for the navigation bar and the upload form.
pub fn list(pool: &DbPool) -> AppResult<Vec<Category>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare("SELECT id, title FROM categories ORDER BY title")?;
    let categories = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                title: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(categories)
}

pub fn get(pool: &DbPool, id: &str) -> AppResult<Option<Category>> {
    let conn = pool.get()?;
    let result = conn.query_row(
        "SELECT id, title FROM categories WHERE id = ?1",
        params![id],
        |row| {
            Ok(Category {
                id: row.get(0)?,
                title: row.get(1)?,
            })
        },
    );

    match result {
        Ok(category) => Ok(Some(category)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(AppError::Database(e)),
    }
}
