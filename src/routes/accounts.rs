use askama::Template;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::auth::{self, password, session};
use crate::db::models::Category;
use crate::db::{categories, users};
use crate::error::AppResult;
use crate::extractors::{CurrentUser, MaybeUser};
use crate::routes::Html;
use crate::state::AppState;

// -- Templates --

#[derive(Template)]
#[template(path = "pages/signup.html")]
struct SignupTemplate {
    user: Option<CurrentUser>,
    categories: Vec<Category>,
    error: Option<String>,
    username: String,
}

#[derive(Template)]
#[template(path = "pages/signup_success.html")]
struct SignupSuccessTemplate {
    user: Option<CurrentUser>,
    categories: Vec<Category>,
}

#[derive(Template)]
#[template(path = "pages/login.html")]
struct LoginTemplate {
    user: Option<CurrentUser>,
    categories: Vec<Category>,
    error: Option<String>,
    next: String,
}

#[derive(Template)]
#[template(path = "pages/logout.html")]
struct LogoutTemplate {
    user: Option<CurrentUser>,
    categories: Vec<Category>,
}

// -- Forms --

#[derive(Deserialize)]
struct SignupForm {
    username: String,
    password: String,
    password_confirm: String,
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
    #[serde(default)]
    next: String,
}

#[derive(Deserialize)]
struct NextQuery {
    next: Option<String>,
}

/// Redirect targets from form data stay on this site.
fn safe_next(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") {
        next
    } else {
        "/"
    }
}

fn signup_page(state: &AppState, error: Option<String>, username: String) -> AppResult<Response> {
    Ok(Html(SignupTemplate {
        user: None,
        categories: categories::list(&state.db)?,
        error,
        username,
    })
    .into_response())
}

fn validate_signup(form: &SignupForm) -> Result<String, String> {
    let username = form.username.trim();
    if username.is_empty() {
        return Err("Username is required".into());
    }
    if username.chars().count() > 150 {
        return Err("Username must be at most 150 characters".into());
    }
    if form.password.chars().count() < 8 {
        return Err("Password must be at least 8 characters".into());
    }
    if form.password != form.password_confirm {
        return Err("Passwords do not match".into());
    }
    Ok(username.to_string())
}

// -- Handlers --

/// GET /accounts/signup
async fn signup_form(State(state): State<AppState>) -> AppResult<Response> {
    signup_page(&state, None, String::new())
}

/// POST /accounts/signup — create a user, then on to the success page.
async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> AppResult<Response> {
    let username = match validate_signup(&form) {
        Ok(username) => username,
        Err(message) => {
            return signup_page(&state, Some(message), form.username);
        }
    };

    let hash = password::hash_password(&form.password)?;
    match users::create(&state.db, &username, &hash)? {
        Some(id) => {
            tracing::info!("New account {} ({})", username, id);
            Ok(Redirect::to("/accounts/signup_success").into_response())
        }
        None => signup_page(
            &state,
            Some("That username is already taken".into()),
            form.username,
        ),
    }
}

/// GET /accounts/signup_success
async fn signup_success(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
) -> AppResult<impl IntoResponse> {
    Ok(Html(SignupSuccessTemplate {
        user: maybe_user.0,
        categories: categories::list(&state.db)?,
    }))
}

/// GET /accounts/login — already signed-in users go back to the feed.
async fn login_form(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Query(query): Query<NextQuery>,
) -> AppResult<Response> {
    if maybe_user.0.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(Html(LoginTemplate {
        user: None,
        categories: categories::list(&state.db)?,
        error: None,
        next: query.next.unwrap_or_default(),
    })
    .into_response())
}

/// POST /accounts/login — verify credentials, set the session cookie and
/// redirect to the requested page.
async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> AppResult<Response> {
    let nav_categories = categories::list(&state.db)?;
    let failed = |categories: Vec<Category>| {
        Html(LoginTemplate {
            user: None,
            categories,
            error: Some("Invalid username or password".into()),
            next: form.next.clone(),
        })
        .into_response()
    };

    let Some((user_id, hash)) = users::find_by_username(&state.db, form.username.trim())? else {
        return Ok(failed(nav_categories));
    };
    if !password::verify_password(&form.password, &hash) {
        return Ok(failed(nav_categories));
    }

    let token = session::create_session(&state.db, &user_id, state.config.auth.session_hours)?;
    let cookie = auth::session_cookie(
        &state.config.auth.cookie_name,
        &token,
        state.config.auth.session_hours,
    );

    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, safe_next(&form.next).to_string()),
            (header::SET_COOKIE, cookie),
        ],
    )
        .into_response())
}

/// POST /accounts/logout — drop the session and render the logged-out page.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(token) = auth::cookie_value(&headers, &state.config.auth.cookie_name) {
        session::delete_session(&state.db, token)?;
    }

    Ok((
        [(
            header::SET_COOKIE,
            auth::clear_session_cookie(&state.config.auth.cookie_name),
        )],
        Html(LogoutTemplate {
            user: None,
            categories: categories::list(&state.db)?,
        }),
    )
        .into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/accounts/signup", get(signup_form).post(signup))
        .route("/accounts/signup_success", get(signup_success))
        .route("/accounts/login", get(login_form).post(login))
        .route("/accounts/logout", post(logout))
}
