use axum::{
    extract::{Query, State, Json},
    routing::{get, post},
    Router,
};
use uuid::Uuid;
use shared::constants::{DEFAULT_COLS, DEFAULT_ROWS};
use shared::shared_sixseven_game::{
    Direction, GameStatus, MoveError, PublicSixSevenGame, SixSevenGame,
};
use std::{
    collections::HashMap,
    sync::Arc,
    env,
    time::{SystemTime, UNIX_EPOCH},
};
use tokio::sync::Mutex;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::info;
use serde::{Serialize, Deserialize};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tower_http::cors::CorsLayer;

use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

const MAX_GAMES_PER_MINUTE: usize = 10;
const SESSION_EXPIRY_SECONDS: u64 = 1800;
const MIN_SECONDS_BETWEEN_MOVES: f64 = 0.2;

/// One player's game plus its own seeded generator. One session owns one
/// game; the store mutex serializes access per the core's exclusive-caller
/// contract.
#[derive(Clone)]
pub struct SixSevenSession {
    pub game: SixSevenGame,
    pub rng: StdRng,
    pub created_at: f64,
    pub last_move_time: f64,
}

#[derive(Clone)]
pub struct SixSevenState {
    pub sessions: Arc<Mutex<HashMap<String, SixSevenSession>>>,
}

fn compute_signature(message: &str) -> Result<String, ApiError> {
    // Use environment variable, or default to a development secret
    let secret = env::var("SIXSEVEN_SECRET").unwrap_or_else(|_| "default_sixseven_secret".to_string());
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| ApiError::Internal)?;
    mac.update(message.as_bytes());
    let result = mac.finalize().into_bytes();
    Ok(hex::encode(result))
}

fn verify_signature(headers: &axum::http::HeaderMap, session_id: &str) -> Result<(), ApiError> {
    let expected = compute_signature(&format!("session:{}", session_id))?;
    let provided = headers
        .get("X-Session-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingSignature)?;
    if provided != expected {
        return Err(ApiError::BadSignature);
    }
    Ok(())
}

fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Every session access goes through here: missing sessions 404, sessions
/// past the expiry window are removed on the spot.
fn expire_if_stale(
    sessions: &mut HashMap<String, SixSevenSession>,
    session_id: &str,
    now: f64,
) -> Result<(), ApiError> {
    let stale = sessions
        .get(session_id)
        .map(|s| now - s.created_at >= SESSION_EXPIRY_SECONDS as f64)
        .ok_or(ApiError::SessionNotFound)?;
    if stale {
        sessions.remove(session_id);
        return Err(ApiError::SessionExpired);
    }
    Ok(())
}

fn fresh_game(rng: &mut StdRng) -> SixSevenGame {
    let mut game = SixSevenGame::new(DEFAULT_ROWS, DEFAULT_COLS);
    game.generate_tiles(rng);
    game
}

#[derive(Serialize)]
pub struct NewGameResponse {
    pub session_id: String,
    pub session_signature: String,
    pub game: PublicSixSevenGame,
}

async fn new_game(
    State(state): State<Arc<SixSevenState>>,
) -> Result<Json<NewGameResponse>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    let now = now_seconds();

    if sessions.values().filter(|s| now - s.created_at < 60.0).count() >= MAX_GAMES_PER_MINUTE {
        return Err(ApiError::TooManyRequests);
    }

    let mut rng = StdRng::from_entropy();
    let game = fresh_game(&mut rng);
    let session_id = Uuid::new_v4().to_string();
    let session_signature = compute_signature(&format!("session:{}", session_id))?;

    info!("New sixseven game started in session {}", session_id);

    sessions.insert(session_id.clone(), SixSevenSession {
        game: game.clone(),
        rng,
        created_at: now,
        last_move_time: now,
    });

    Ok(Json(NewGameResponse {
        session_id,
        session_signature,
        game: game.to_public(),
    }))
}

#[derive(Deserialize)]
pub struct MoveRequest {
    pub session_id: String,
    pub direction: Direction,
}

#[derive(Serialize)]
pub struct MoveResponse {
    pub moved: bool,
    pub game: PublicSixSevenGame,
    pub valid_moves: Vec<Direction>,
}

async fn process_move(
    State(state): State<Arc<SixSevenState>>,
    headers: axum::http::HeaderMap,
    Json(payload): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    let now = now_seconds();
    expire_if_stale(&mut sessions, &payload.session_id, now)?;
    let session = sessions.get_mut(&payload.session_id).ok_or(ApiError::SessionNotFound)?;

    if now - session.last_move_time < MIN_SECONDS_BETWEEN_MOVES {
        return Err(ApiError::TooManyRequests);
    }

    verify_signature(&headers, &payload.session_id)?;

    session.last_move_time = now;

    // One orchestrator round: commit the slide, then deal new tiles. A
    // rejected direction leaves the game untouched and just reports the
    // current state back.
    let moved = match session.game.apply_move(payload.direction) {
        Ok(()) => {
            session.game.generate_tiles(&mut session.rng);
            true
        }
        Err(MoveError::InvalidMove) | Err(MoveError::Finished) => false,
    };

    match session.game.status() {
        GameStatus::Won => {
            info!("Session {} won after {} rounds", payload.session_id, session.game.round());
        }
        GameStatus::Lost => {
            info!("Session {} lost after {} rounds", payload.session_id, session.game.round());
        }
        GameStatus::Active => {}
    }

    Ok(Json(MoveResponse {
        moved,
        game: session.game.to_public(),
        valid_moves: session.game.valid_moves(),
    }))
}

#[derive(Deserialize)]
pub struct RestartRequest {
    pub session_id: String,
}

#[derive(Serialize)]
pub struct RestartResponse {
    pub game: PublicSixSevenGame,
}

async fn restart(
    State(state): State<Arc<SixSevenState>>,
    headers: axum::http::HeaderMap,
    Json(payload): Json<RestartRequest>,
) -> Result<Json<RestartResponse>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    expire_if_stale(&mut sessions, &payload.session_id, now_seconds())?;
    let session = sessions.get_mut(&payload.session_id).ok_or(ApiError::SessionNotFound)?;

    verify_signature(&headers, &payload.session_id)?;

    // Restarting means a brand-new game; the old one is simply dropped.
    session.game = fresh_game(&mut session.rng);
    session.last_move_time = now_seconds();

    Ok(Json(RestartResponse {
        game: session.game.to_public(),
    }))
}

#[derive(Deserialize)]
pub struct RefreshQuery {
    pub session_id: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub game: PublicSixSevenGame,
    pub valid_moves: Vec<Direction>,
}

async fn refresh(
    State(state): State<Arc<SixSevenState>>,
    headers: axum::http::HeaderMap,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    expire_if_stale(&mut sessions, &query.session_id, now_seconds())?;
    let session = sessions.get(&query.session_id).ok_or(ApiError::SessionNotFound)?;

    verify_signature(&headers, &query.session_id)?;

    Ok(Json(RefreshResponse {
        game: session.game.to_public(),
        valid_moves: session.game.valid_moves(),
    }))
}

/// Drops sessions older than the expiry window. Run periodically from main.
pub async fn prune_expired_sessions(state: &SixSevenState) {
    let mut sessions = state.sessions.lock().await;
    let now = now_seconds();
    let before = sessions.len();
    sessions.retain(|_, s| now - s.created_at < SESSION_EXPIRY_SECONDS as f64);
    let removed = before - sessions.len();
    if removed > 0 {
        info!("Pruned {} expired sixseven sessions", removed);
    }
}

pub fn create_router() -> Router<Arc<SixSevenState>> {
    Router::new()
        .route("/new", post(new_game))
        .route("/move", post(process_move))
        .route("/restart", post(restart))
        .route("/refresh", get(refresh))
        .layer(CorsLayer::permissive())
}
