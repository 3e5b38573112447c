pub mod accounts;
pub mod assets;
pub mod feed;
pub mod media;
pub mod photos;

use askama::Template;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::config::Config;
use crate::state::AppState;

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

/// The full application router.
pub fn router(config: &Config) -> Router<AppState> {
    Router::new()
        .route("/", get(feed::index))
        .route("/assets/{*path}", get(assets::serve))
        .merge(feed::router())
        .merge(photos::router(config.max_upload_bytes()))
        .merge(accounts::router())
        .merge(media::router())
}
