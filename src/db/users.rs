use rusqlite::params;

use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// Insert a new user. Returns the generated id, or `None` when the
/// username is already taken (unique constraint).
pub fn create(pool: &DbPool, username: &str, password_hash: &str) -> AppResult<Option<String>> {
    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();

    let result = conn.execute(
        "INSERT INTO users (id, username, password_hash) VALUES (?1, ?2, ?3)",
        params![id, username, password_hash],
    );

    match result {
        Ok(_) => Ok(Some(id)),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Ok(None)
        }
        Err(e) => Err(AppError::Database(e)),
    }
}

/// Look up (id, password_hash) by username for login.
pub fn find_by_username(pool: &DbPool, username: &str) -> AppResult<Option<(String, String)>> {
    let conn = pool.get()?;
    let result = conn.query_row(
        "SELECT id, password_hash FROM users WHERE username = ?1",
        params![username],
        |row| Ok((row.get(0)?, row.get(1)?)),
    );

    match result {
        Ok(pair) => Ok(Some(pair)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(AppError::Database(e)),
    }
}

/// Username for display on a per-user feed page.
pub fn username(pool: &DbPool, user_id: &str) -> AppResult<Option<String>> {
    let conn = pool.get()?;
    let result = conn.query_row(
        "SELECT username FROM users WHERE id = ?1",
        params![user_id],
        |row| row.get(0),
    );

    match result {
        Ok(name) => Ok(Some(name)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(AppError::Database(e)),
    }
}
