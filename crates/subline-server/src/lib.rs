pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health::health))
        // Subtitles
        .route("/api/vtt/parse", post(routes::vtt::parse_vtt))
        .route("/api/vtt/build", post(routes::vtt::build_vtt))
        .route("/api/vtt/translate", post(routes::vtt::translate_segment))
        // Activities
        .route("/api/activities", get(routes::activities::list_activities))
        .route("/api/activities", post(routes::activities::import_activities))
        // Assignments
        .route(
            "/api/assignments",
            post(routes::assignments::create_assignments),
        )
        .route(
            "/api/users/{user_id}/assignments",
            get(routes::assignments::list_user_assignments),
        )
        .route(
            "/api/users/{user_id}/assignments/{item_id}",
            put(routes::assignments::update_assignment_status),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the API server on `port`.
pub async fn serve(app_state: AppState, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(app_state, listener).await
}

/// Start the API server on a pre-bound listener.
///
/// The caller can read the actual port before starting (useful when
/// `port = 0` and the OS picks a free port).
pub async fn serve_on(app_state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(app_state);

    tracing::info!("subline API listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
