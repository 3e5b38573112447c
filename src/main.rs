use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use clap::Parser;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use fotolog::config::{Cli, Config};
use fotolog::state::AppState;
use fotolog::{auth, db, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Ensure uploads directory exists
    std::fs::create_dir_all(config.photos_dir())?;

    // Initialize database
    let pool = db::create_pool(config.db_path())?;
    db::run_migrations(&pool)?;

    // Build app state
    let state = AppState {
        db: pool,
        config: config.clone(),
    };

    let mut app = routes::router(&config);

    // Test-only seed endpoint: creates a user + session, returns session cookie
    if std::env::var("FOTOLOG_TEST_SEED").is_ok() {
        app = app.route("/test/seed", get(test_seed));
    }

    let app = app.layer(TraceLayer::new_for_http()).with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Test-only: seed a user + session and return the session cookie.
/// Only mounted when FOTOLOG_TEST_SEED env var is set.
async fn test_seed(State(state): State<AppState>) -> impl IntoResponse {
    let hash = auth::password::hash_password("testpassword").unwrap();
    let uid = match db::users::create(&state.db, "testuser", &hash).unwrap() {
        Some(id) => id,
        // Already seeded from a previous call
        None => {
            db::users::find_by_username(&state.db, "testuser")
                .unwrap()
                .unwrap()
                .0
        }
    };

    let token =
        auth::session::create_session(&state.db, &uid, state.config.auth.session_hours).unwrap();

    let cookie = auth::session_cookie(&state.config.auth.cookie_name, &token, 1);

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        format!("{{\"user_id\":\"{}\",\"username\":\"testuser\"}}", uid),
    )
}
