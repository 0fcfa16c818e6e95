//! Web front end of the release manager finder: GitHub OAuth login, a
//! checkbox form over the current maintainers, and the decision page.

pub mod auth;
pub mod embed;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;

use axum::routing::get;
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

pub use state::{AppState, ServerConfig};

/// Build the axum Router with all routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(state: AppState) -> Router {
    let gated = Router::new()
        .route(
            "/",
            get(routes::form::show_form).post(routes::form::submit_form),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_maintainer,
        ));

    Router::new()
        .merge(gated)
        .route("/login", get(routes::login::login))
        .route("/logout", get(routes::logout::logout))
        .route(
            "/not-a-maintainer",
            get(routes::not_maintainer::not_a_maintainer),
        )
        .route("/favicon.svg", get(embed::favicon))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web form on `0.0.0.0:{port}`.
pub async fn serve(settings: ServerConfig, port: u16) -> anyhow::Result<()> {
    let app = build_router(AppState::new(settings)?);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("release manager finder listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
