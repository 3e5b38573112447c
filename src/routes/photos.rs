use askama::Template;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;

use crate::db::models::Category;
use crate::db::photos::{NewPost, PostView};
use crate::db::{categories, photos};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, MaybeUser};
use crate::routes::Html;
use crate::state::AppState;
use crate::storage;

#[derive(Template)]
#[template(path = "pages/post_photo.html")]
struct PostPhotoTemplate {
    user: Option<CurrentUser>,
    categories: Vec<Category>,
    error: Option<String>,
    title: String,
    comment: String,
}

#[derive(Template)]
#[template(path = "pages/post_success.html")]
struct PostSuccessTemplate {
    user: Option<CurrentUser>,
    categories: Vec<Category>,
}

#[derive(Template)]
#[template(path = "pages/detail.html")]
struct DetailTemplate {
    user: Option<CurrentUser>,
    categories: Vec<Category>,
    post: PostView,
}

#[derive(Template)]
#[template(path = "pages/photo_delete.html")]
struct PhotoDeleteTemplate {
    user: Option<CurrentUser>,
    categories: Vec<Category>,
    post: PostView,
}

/// Raw multipart fields from the upload form. Only the fields the form
/// defines are read; anything else (including a forged owner field) is
/// drained and ignored.
#[derive(Default)]
struct UploadForm {
    category: String,
    title: String,
    comment: String,
    image1: Option<(String, Vec<u8>)>,
    image2: Option<(String, Vec<u8>)>,
}

async fn read_upload_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "category" => form.category = field.text().await?,
            "title" => form.title = field.text().await?,
            "comment" => form.comment = field.text().await?,
            "image1" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field.bytes().await?.to_vec();
                if !file_name.is_empty() && !bytes.is_empty() {
                    form.image1 = Some((file_name, bytes));
                }
            }
            "image2" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field.bytes().await?.to_vec();
                if !file_name.is_empty() && !bytes.is_empty() {
                    form.image2 = Some((file_name, bytes));
                }
            }
            _ => {
                let _ = field.bytes().await?;
            }
        }
    }

    Ok(form)
}

/// Field-level validation, mirroring the upload form's requirements.
/// Returns a user-facing message on the first failing check.
fn validate_upload(state: &AppState, form: &UploadForm) -> AppResult<Result<(), String>> {
    if form.title.trim().is_empty() {
        return Ok(Err("Title is required".into()));
    }
    if form.title.chars().count() > 200 {
        return Ok(Err("Title must be at most 200 characters".into()));
    }
    if form.comment.trim().is_empty() {
        return Ok(Err("Comment is required".into()));
    }
    if categories::get(&state.db, &form.category)?.is_none() {
        return Ok(Err("Choose a category".into()));
    }
    Ok(Ok(()))
}

fn upload_form_page(
    state: &AppState,
    user: CurrentUser,
    error: Option<String>,
    title: String,
    comment: String,
) -> AppResult<Response> {
    Ok(Html(PostPhotoTemplate {
        categories: categories::list(&state.db)?,
        user: Some(user),
        error,
        title,
        comment,
    })
    .into_response())
}

/// GET /photos/post — the upload form. Login required.
async fn post_photo_form(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    upload_form_page(&state, user, None, String::new(), String::new())
}

/// POST /photos/post — create a photo post from the multipart form.
/// The owner is always the session user; validation failures re-render
/// the form with a message.
async fn post_photo(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Response> {
    let form = read_upload_form(multipart).await?;

    if let Err(message) = validate_upload(&state, &form)? {
        return upload_form_page(&state, user, Some(message), form.title, form.comment);
    }

    let Some((name1, bytes1)) = &form.image1 else {
        return upload_form_page(
            &state,
            user,
            Some("An image is required".into()),
            form.title,
            form.comment,
        );
    };

    let photos_dir = state.config.photos_dir();
    let image1 = match storage::save_photo(&photos_dir, name1, bytes1) {
        Ok(file) => file,
        Err(AppError::BadRequest(msg)) => {
            return upload_form_page(&state, user, Some(msg), form.title, form.comment);
        }
        Err(e) => return Err(e),
    };

    let image2 = match &form.image2 {
        Some((name2, bytes2)) => match storage::save_photo(&photos_dir, name2, bytes2) {
            Ok(file) => Some(file),
            Err(AppError::BadRequest(msg)) => {
                return upload_form_page(&state, user, Some(msg), form.title, form.comment);
            }
            Err(e) => return Err(e),
        },
        None => None,
    };

    let id = photos::insert(
        &state.db,
        &NewPost {
            user_id: &user.id,
            category_id: &form.category,
            title: form.title.trim(),
            comment: &form.comment,
            image1: &image1,
            image2: image2.as_deref(),
        },
    )?;
    tracing::info!("New photo post {} by {}", id, user.username);

    Ok(Redirect::to("/photos/post_done").into_response())
}

/// GET /photos/post_done — shown after a successful upload.
async fn post_done(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
) -> AppResult<impl IntoResponse> {
    Ok(Html(PostSuccessTemplate {
        user: maybe_user.0,
        categories: categories::list(&state.db)?,
    }))
}

/// GET /photos/{id} — a single post; 404 when absent.
async fn detail(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let post = photos::get(&state.db, &id)?.ok_or(AppError::NotFound)?;
    Ok(Html(DetailTemplate {
        user: maybe_user.0,
        categories: categories::list(&state.db)?,
        post,
    }))
}

/// GET /photos/{id}/delete — confirmation page. Only the owner gets it;
/// anyone else sees a 404.
async fn delete_confirm(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let post = photos::get_owned(&state.db, &id, &user.id)?.ok_or(AppError::NotFound)?;
    Ok(Html(PhotoDeleteTemplate {
        categories: categories::list(&state.db)?,
        user: Some(user),
        post,
    }))
}

/// POST /photos/{id}/delete — delete an owned post, then back to my page.
async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    if !photos::delete_owned(&state.db, &id, &user.id)? {
        return Err(AppError::NotFound);
    }
    tracing::info!("Deleted photo post {} by {}", id, user.username);
    Ok(Redirect::to("/photos/mypage").into_response())
}

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        // The default body limit is far too small for photo uploads
        .route(
            "/photos/post",
            get(post_photo_form)
                .post(post_photo)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/photos/post_done", get(post_done))
        .route("/photos/{id}", get(detail))
        .route("/photos/{id}/delete", get(delete_confirm).post(delete))
}
