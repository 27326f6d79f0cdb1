use std::net::SocketAddr;
use axum::http::{HeaderValue, Method, Request, Response, StatusCode, header};
use axum::http::header::HeaderName;
use axum::{middleware, Router};
use axum::routing::get;
use axum::response::IntoResponse;
use axum::body::Body;
use cookie::Cookie;
use rand::Rng;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;
use std::sync::Arc;
use std::collections::HashMap;
use std::time::Duration;

use crate::games::backend_sixseven_game::{
    create_router as create_sixseven_router, prune_expired_sessions, SixSevenState,
};

mod error;
mod games;
mod logging;

pub async fn health_check() -> impl IntoResponse {
    Response::builder().status(200).body(Body::from("OK")).unwrap()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::setup();
    dotenvy::from_path(".env").ok();

    let sixseven_state = Arc::new(SixSevenState {
        sessions: Arc::new(tokio::sync::Mutex::new(HashMap::new())),
    });

    // Expired sessions are also dropped on access; this just keeps the
    // store from accumulating abandoned games.
    let prune_state = sixseven_state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            prune_expired_sessions(&prune_state).await;
        }
    });

    let cors = CorsLayer::new()
        .allow_origin(vec![
            "http://127.0.0.1:8080".parse::<HeaderValue>().unwrap(),
            "http://127.0.0.1:3000".parse::<HeaderValue>().unwrap(),
        ])
        .allow_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(vec![
            HeaderName::from_static("content-type"),
            HeaderName::from_static("x-session-signature"),
        ])
        .allow_credentials(true);

    // Frontend assets are all same-origin, so the strict default policy
    // holds; styles allow inline because the board view sets cell colors.
    let csp_layer = SetResponseHeaderLayer::if_not_present(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(
            "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self'; connect-src 'self'",
        ),
    );

    let app = Router::new()
        .route("/api/health_check", get(health_check))
        .nest("/sixseven", create_sixseven_router()
            .with_state(sixseven_state)
            .layer(cors.clone()))
        .layer(csp_layer)
        .layer(middleware::from_fn(csrf_token_middleware));

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("listening on {}", addr);
    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();

    Ok(())
}

async fn csrf_token_middleware(
    request: Request<Body>,
    next: middleware::Next,
) -> Result<Response<Body>, StatusCode> {
    if request.method() == Method::GET || request.method() == Method::HEAD || request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let token: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();

    let mut response = next.run(request).await;

    let mut cookie = Cookie::new("csrf_token", token.clone());
    cookie.set_secure(true);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_same_site(cookie::SameSite::Strict);

    response.headers_mut().insert(
        "Set-Cookie",
        cookie.to_string().parse().unwrap()
    );

    Ok(response)
}
