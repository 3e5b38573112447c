use chrono::Utc;
use rusqlite::{params, params_from_iter, Row};

use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// Which slice of the feed a listing shows.
pub enum FeedFilter {
    All,
    Category(String),
    User(String),
}

impl FeedFilter {
    fn where_clause(&self) -> (&'static str, Vec<&str>) {
        match self {
            FeedFilter::All => ("", vec![]),
            FeedFilter::Category(id) => ("WHERE p.category_id = ?1", vec![id.as_str()]),
            FeedFilter::User(id) => ("WHERE p.user_id = ?1", vec![id.as_str()]),
        }
    }
}

/// A photo post joined with its owner and category, as the templates need it.
#[derive(Debug, Clone)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub comment: String,
    pub image1: String,
    pub image2: Option<String>,
    pub posted_at: String,
    pub user_id: String,
    pub username: String,
    pub category_id: String,
    pub category_title: String,
}

pub struct FeedPage {
    pub posts: Vec<PostView>,
    pub page: u32,
    pub total_pages: u32,
}

pub struct NewPost<'a> {
    pub user_id: &'a str,
    pub category_id: &'a str,
    pub title: &'a str,
    pub comment: &'a str,
    pub image1: &'a str,
    pub image2: Option<&'a str>,
}

const SELECT_POST: &str = "SELECT p.id, p.title, p.comment, p.image1, p.image2, p.posted_at, \
     p.user_id, u.username, p.category_id, c.title \
     FROM photo_posts p \
     JOIN users u ON u.id = p.user_id \
     JOIN categories c ON c.id = p.category_id";

fn post_from_row(row: &Row) -> rusqlite::Result<PostView> {
    Ok(PostView {
        id: row.get(0)?,
        title: row.get(1)?,
        comment: row.get(2)?,
        image1: row.get(3)?,
        image2: row.get(4)?,
        posted_at: row.get(5)?,
        user_id: row.get(6)?,
        username: row.get(7)?,
        category_id: row.get(8)?,
        category_title: row.get(9)?,
    })
}

/// Timestamp format matching the schema default, millisecond precision,
/// lexicographically sortable.
fn now_stamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Insert a new photo post. The owner is whatever `user_id` the caller
/// resolved from the session; the creation timestamp is stamped here and
/// never updated afterwards.
pub fn insert(pool: &DbPool, new: &NewPost) -> AppResult<String> {
    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO photo_posts (id, user_id, category_id, title, comment, image1, image2, posted_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            new.user_id,
            new.category_id,
            new.title,
            new.comment,
            new.image1,
            new.image2,
            now_stamp()
        ],
    )?;

    Ok(id)
}

/// One page of the feed, newest first. `page` is 1-based and clamps into
/// the valid range so a stale or hand-edited page link never errors.
pub fn list_page(
    pool: &DbPool,
    filter: &FeedFilter,
    page: u32,
    page_size: u32,
) -> AppResult<FeedPage> {
    let conn = pool.get()?;
    let (where_sql, filter_params) = filter.where_clause();

    let count_sql = format!("SELECT COUNT(*) FROM photo_posts p {}", where_sql);
    let total: u32 = conn.query_row(&count_sql, params_from_iter(filter_params.iter()), |row| {
        row.get(0)
    })?;

    let page_size = page_size.max(1);
    let total_pages = (total.div_ceil(page_size)).max(1);
    let page = page.clamp(1, total_pages);
    let offset = (page - 1) * page_size;

    let list_sql = format!(
        "{} {} ORDER BY p.posted_at DESC, p.id DESC LIMIT {} OFFSET {}",
        SELECT_POST, where_sql, page_size, offset
    );
    let mut stmt = conn.prepare(&list_sql)?;
    let posts = stmt
        .query_map(params_from_iter(filter_params.iter()), post_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeedPage {
        posts,
        page,
        total_pages,
    })
}

pub fn get(pool: &DbPool, id: &str) -> AppResult<Option<PostView>> {
    let conn = pool.get()?;
    let sql = format!("{} WHERE p.id = ?1", SELECT_POST);
    let result = conn.query_row(&sql, params![id], post_from_row);

    match result {
        Ok(post) => Ok(Some(post)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(AppError::Database(e)),
    }
}

/// Fetch a post only if it belongs to `user_id`. Backs the delete
/// confirmation page so other users' posts 404 there.
pub fn get_owned(pool: &DbPool, id: &str, user_id: &str) -> AppResult<Option<PostView>> {
    let conn = pool.get()?;
    let sql = format!("{} WHERE p.id = ?1 AND p.user_id = ?2", SELECT_POST);
    let result = conn.query_row(&sql, params![id, user_id], post_from_row);

    match result {
        Ok(post) => Ok(Some(post)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(AppError::Database(e)),
    }
}

/// Delete a post owned by `user_id`. The ownership check lives in the SQL
/// predicate; returns false when nothing matched (missing or not theirs).
pub fn delete_owned(pool: &DbPool, id: &str, user_id: &str) -> AppResult<bool> {
    let conn = pool.get()?;
    let rows = conn.execute(
        "DELETE FROM photo_posts WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    Ok(rows > 0)
}
