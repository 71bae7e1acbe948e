use std::net::SocketAddr;
use std::path::Path;

use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::session::session_gate;
use crate::state::AppState;
use crate::{
    auth, catches, collection, comments, events, leaderboard, likes, profile, spots, uploads,
};

/// Unknown API paths stay JSON instead of reaching the page fallback.
async fn api_not_found() -> ApiError {
    ApiError::NotFound("Route")
}

pub fn build_app(state: AppState) -> Router {
    let static_dir = Path::new(&state.config.static_dir).to_path_buf();
    // unknown page paths get the client shell
    let pages = ServeDir::new(&static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(spots::router())
                .merge(events::router())
                .merge(catches::router())
                .merge(comments::router())
                .merge(likes::router())
                .merge(profile::router())
                .merge(leaderboard::router())
                .merge(collection::router())
                .merge(uploads::router())
                .route("/health", get(|| async { "ok" }))
                .fallback(api_not_found),
        )
        .fallback_service(pages)
        .layer(middleware::from_fn_with_state(state.clone(), session_gate))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
