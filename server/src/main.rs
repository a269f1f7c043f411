use std::path::Path;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use connect4::{Game, GameError, GameState, Mode, MoveReport, Outcome, Placement, SharedGame};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

mod config;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(&config.log);

    let game = match config.seed {
        Some(seed) => Game::with_seed(config.mode, seed),
        None => Game::new(config.mode),
    };
    let state = AppState {
        game: SharedGame::new(game),
    };
    let app = app_router(state, &config.static_dir);

    let listener = TcpListener::bind(config.addr).await?;
    info!(mode = %config.mode, "Listening on http://{}", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(filter: &str) {
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[derive(Clone)]
struct AppState {
    game: SharedGame,
}

fn app_router(state: AppState, static_dir: &Path) -> Router {
    let api = Router::new()
        .route("/game", get(handle_state))
        .route("/new-game", post(handle_new_game))
        .route("/move", post(handle_move))
        .route("/ai-move", post(handle_ai_move));
    Router::new()
        .nest("/api", api)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(
            CorsLayer::new()
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_origin(axum::http::HeaderValue::from_static("*"))
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct NewGameRequest {
    #[serde(default)]
    mode: String,
}

#[derive(Debug, Deserialize)]
struct MoveRequest {
    col: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameResponse {
    success: bool,
    #[serde(default)]
    message: String,
    game_state: GameState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    winner: Option<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    landing_row: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reply: Option<Placement>,
}

impl From<MoveReport> for GameResponse {
    fn from(report: MoveReport) -> Self {
        Self {
            success: true,
            message: report.state.status_message().to_string(),
            winner: report.state.winner(),
            landing_row: Some(report.placement.row),
            reply: report.reply,
            game_state: report.state,
        }
    }
}

async fn handle_state(State(state): State<AppState>) -> impl IntoResponse {
    let headers = [(header::CACHE_CONTROL, "no-store")];
    (headers, Json(state.game.snapshot()))
}

async fn handle_new_game(
    State(state): State<AppState>,
    payload: Result<Json<NewGameRequest>, JsonRejection>,
) -> Result<Json<GameResponse>, ApiError> {
    let Json(req) = payload?;
    let game_state = state.game.with_game(|game| {
        let mode = Mode::from_request(&req.mode, game.state().mode());
        game.new_game(mode).clone()
    });
    Ok(Json(GameResponse {
        success: true,
        message: String::new(),
        game_state,
        winner: None,
        landing_row: None,
        reply: None,
    }))
}

async fn handle_move(
    State(state): State<AppState>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<GameResponse>, ApiError> {
    let Json(req) = payload?;
    let report = state.game.with_game(|game| game.apply_requested_move(req.col))?;
    Ok(Json(report.into()))
}

async fn handle_ai_move(State(state): State<AppState>) -> Result<Json<GameResponse>, ApiError> {
    let report = state.game.with_game(|game| game.apply_automated_move())?;
    Ok(Json(report.into()))
}

#[derive(Debug)]
struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if let Some(rejection) = self.0.downcast_ref::<JsonRejection>() {
            rejection.status()
        } else {
            match self.0.downcast_ref::<GameError>() {
                Some(
                    GameError::ColumnFull { .. }
                    | GameError::MoveAfterGameOver
                    | GameError::NoMoves,
                ) => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            }
        };
        let body = serde_json::json!({
            "success": false,
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use connect4::Side;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn test_state(mode: Mode) -> AppState {
        AppState {
            game: SharedGame::new(Game::with_seed(mode, 5)),
        }
    }

    async fn call(
        state: &AppState,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let app = app_router(state.clone(), Path::new("static"));
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn initial_state_endpoint() {
        let state = test_state(Mode::TwoPlayer);
        let (status, body) = call(&state, "GET", "/api/game", None).await;
        assert_eq!(status, StatusCode::OK);
        let game_state: GameState = serde_json::from_value(body).unwrap();
        assert_eq!(game_state, GameState::new(Mode::TwoPlayer));
    }

    #[tokio::test]
    async fn move_against_the_bot_returns_both_placements() {
        let state = test_state(Mode::TwoPlayer);
        let (status, _) = call(&state, "POST", "/api/new-game", Some(json!({ "mode": "ai" }))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&state, "POST", "/api/move", Some(json!({ "col": 0 }))).await;
        assert_eq!(status, StatusCode::OK);
        let response: GameResponse = serde_json::from_value(body).unwrap();
        assert!(response.success);
        assert_eq!(response.landing_row, Some(5));
        assert_eq!(response.reply.map(|p| p.column), Some(3));
        assert_eq!(response.game_state.current_side(), Side::First);
        assert_eq!(state.game.snapshot(), response.game_state);
    }

    #[tokio::test]
    async fn full_column_is_a_conflict() {
        let state = test_state(Mode::TwoPlayer);
        for _ in 0..6 {
            let (status, _) = call(&state, "POST", "/api/move", Some(json!({ "col": 1 }))).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) = call(&state, "POST", "/api/move", Some(json!({ "col": 1 }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "column 1 is full");
        assert_eq!(state.game.snapshot().board().piece_count(), 6);
    }

    #[tokio::test]
    async fn out_of_range_columns_are_bad_requests() {
        let state = test_state(Mode::TwoPlayer);
        for col in [-1, 7, 100] {
            let (status, body) =
                call(&state, "POST", "/api/move", Some(json!({ "col": col }))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], format!("column {col} is out of bounds"));
            assert_eq!(state.game.snapshot().status_message(), "Invalid column");
        }
        assert_eq!(state.game.snapshot().board().piece_count(), 0);
    }

    async fn call_raw(state: &AppState, uri: &str, body: &str) -> (StatusCode, Value) {
        let app = app_router(state.clone(), Path::new("static"));
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn malformed_bodies_get_the_error_shape() {
        let state = test_state(Mode::TwoPlayer);
        let (status, body) = call_raw(&state, "/api/move", "{\"col\": ").await;
        assert!(status.is_client_error());
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());

        let (status, body) = call_raw(&state, "/api/move", "{}").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);

        let (status, body) = call_raw(&state, "/api/new-game", "not json").await;
        assert!(status.is_client_error());
        assert_eq!(body["success"], false);
        assert_eq!(state.game.snapshot().board().piece_count(), 0);
    }

    #[tokio::test]
    async fn moves_after_a_win_are_rejected() {
        let state = test_state(Mode::TwoPlayer);
        for col in [0, 1, 0, 1, 0, 1] {
            call(&state, "POST", "/api/move", Some(json!({ "col": col }))).await;
        }
        let (_, last) = call(&state, "POST", "/api/move", Some(json!({ "col": 0 }))).await;
        assert_eq!(last["winner"], "first");
        assert_eq!(last["gameState"]["gameOver"], true);

        let (status, body) = call(&state, "POST", "/api/move", Some(json!({ "col": 3 }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn ai_move_endpoint_plays_for_side_to_move() {
        let state = test_state(Mode::TwoPlayer);
        let (status, body) = call(&state, "POST", "/api/ai-move", None).await;
        assert_eq!(status, StatusCode::OK);
        let response: GameResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.game_state.board().piece_count(), 1);
        assert_eq!(response.game_state.current_side(), Side::Second);
    }

    #[tokio::test]
    async fn new_game_mode_handling() {
        let state = test_state(Mode::VsAutomated);
        let (_, body) = call(&state, "POST", "/api/new-game", Some(json!({}))).await;
        assert_eq!(body["gameState"]["mode"], "ai");

        let (_, body) = call(&state, "POST", "/api/new-game", Some(json!({ "mode": "bogus" }))).await;
        assert_eq!(body["gameState"]["mode"], "twoPlayer");
    }
}
