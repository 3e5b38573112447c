use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::storage;

/// GET /media/photos/{file} — serve an uploaded photo from disk.
async fn serve_photo(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> AppResult<Response> {
    if !storage::is_safe_file_name(&file) {
        return Err(AppError::NotFound);
    }

    let path = state.config.photos_dir().join(&file);
    let bytes = tokio::fs::read(&path).await.map_err(|_| AppError::NotFound)?;

    let mime = mime_guess::from_path(&file).first_or_octet_stream();
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        bytes,
    )
        .into_response())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/media/photos/{file}", get(serve_photo))
}
