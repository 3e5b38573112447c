use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::db::models::Category;
use crate::db::photos::{FeedFilter, PostView};
use crate::db::{categories, photos, users};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, MaybeUser};
use crate::routes::Html;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    /// 1-based page number; malformed values fall back to the first page.
    fn number(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.parse().ok())
            .unwrap_or(1)
    }
}

#[derive(Template)]
#[template(path = "pages/index.html")]
pub struct IndexTemplate {
    pub user: Option<CurrentUser>,
    pub categories: Vec<Category>,
    pub heading: String,
    pub posts: Vec<PostView>,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
    pub page: u32,
    pub total_pages: u32,
}

#[derive(Template)]
#[template(path = "pages/mypage.html")]
struct MypageTemplate {
    user: Option<CurrentUser>,
    categories: Vec<Category>,
    posts: Vec<PostView>,
    prev_url: Option<String>,
    next_url: Option<String>,
    page: u32,
    total_pages: u32,
}

fn page_url(path: &str, page: u32) -> String {
    format!("{}?page={}", path, page)
}

fn feed_template(
    state: &AppState,
    user: Option<CurrentUser>,
    filter: &FeedFilter,
    heading: String,
    path: &str,
    requested_page: u32,
) -> AppResult<IndexTemplate> {
    let page = photos::list_page(&state.db, filter, requested_page, state.config.feed.page_size)?;
    let prev_url = (page.page > 1).then(|| page_url(path, page.page - 1));
    let next_url = (page.page < page.total_pages).then(|| page_url(path, page.page + 1));

    Ok(IndexTemplate {
        user,
        categories: categories::list(&state.db)?,
        heading,
        posts: page.posts,
        prev_url,
        next_url,
        page: page.page,
        total_pages: page.total_pages,
    })
}

/// GET / — the global feed, newest first.
pub async fn index(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Query(query): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let template = feed_template(
        &state,
        maybe_user.0,
        &FeedFilter::All,
        "Latest photos".to_string(),
        "/",
        query.number(),
    )?;
    Ok(Html(template))
}

/// GET /photos/category/{id} — posts in one category.
async fn category_feed(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let category = categories::get(&state.db, &id)?.ok_or(AppError::NotFound)?;
    let path = format!("/photos/category/{}", category.id);
    let template = feed_template(
        &state,
        maybe_user.0,
        &FeedFilter::Category(category.id.clone()),
        category.title,
        &path,
        query.number(),
    )?;
    Ok(Html(template))
}

/// GET /photos/user/{id} — posts by one user.
async fn user_feed(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let username = users::username(&state.db, &id)?.ok_or(AppError::NotFound)?;
    let path = format!("/photos/user/{}", id);
    let template = feed_template(
        &state,
        maybe_user.0,
        &FeedFilter::User(id),
        format!("Photos by {}", username),
        &path,
        query.number(),
    )?;
    Ok(Html(template))
}

/// GET /photos/mypage — the session user's own posts. Login required.
async fn mypage(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let page = photos::list_page(
        &state.db,
        &FeedFilter::User(user.id.clone()),
        query.number(),
        state.config.feed.page_size,
    )?;
    let prev_url = (page.page > 1).then(|| page_url("/photos/mypage", page.page - 1));
    let next_url = (page.page < page.total_pages).then(|| page_url("/photos/mypage", page.page + 1));

    Ok(Html(MypageTemplate {
        categories: categories::list(&state.db)?,
        user: Some(user),
        posts: page.posts,
        prev_url,
        next_url,
        page: page.page,
        total_pages: page.total_pages,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/photos/category/{id}", get(category_feed))
        .route("/photos/user/{id}", get(user_feed))
        .route("/photos/mypage", get(mypage))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_parses_and_falls_back() {
        let q = PageQuery {
            page: Some("3".into()),
        };
        assert_eq!(q.number(), 3);

        let q = PageQuery {
            page: Some("abc".into()),
        };
        assert_eq!(q.number(), 1);

        let q = PageQuery { page: None };
        assert_eq!(q.number(), 1);
    }

    #[test]
    fn page_url_appends_query() {
        assert_eq!(page_url("/", 2), "/?page=2");
        assert_eq!(page_url("/photos/mypage", 3), "/photos/mypage?page=3");
    }
}
