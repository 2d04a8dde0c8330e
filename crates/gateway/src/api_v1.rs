//! HTTP API v1: chat sessions over REST.
//!
//! Endpoints:
//!
//! - `POST   /v1/sessions`               - Start a session
//! - `GET    /v1/sessions/{id}`          - Transcript view
//! - `POST   /v1/sessions/{id}/messages` - Send a message, get the updated transcript
//! - `DELETE /v1/sessions/{id}/messages` - Clear the conversation
//! - `DELETE /v1/sessions/{id}`          - End the session

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use dostbot_agent::{AssistantContext, ChatSession, SessionState, TurnOutcome};
use dostbot_core::error::SessionError;
use dostbot_core::message::Turn;
use dostbot_telemetry::UsageSnapshot;

// ── State ─────────────────────────────────────────────────────────────────

type SessionHandle = Arc<Mutex<ChatSession>>;

struct SessionSlot {
    created_at: DateTime<Utc>,
    session: SessionHandle,
}

/// Shared state for the v1 API.
pub struct ApiV1State {
    pub assistant: Arc<AssistantContext>,
    pub max_sessions: usize,
    sessions: RwLock<HashMap<String, SessionSlot>>,
}

pub type SharedApiState = Arc<ApiV1State>;

impl ApiV1State {
    pub fn new(assistant: Arc<AssistantContext>, max_sessions: usize) -> Self {
        Self {
            assistant,
            max_sessions: max_sessions.max(1),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session, evicting the oldest one when at capacity.
    pub async fn create_session(&self) -> String {
        let session = ChatSession::new(self.assistant.clone());
        let id = session.id().to_string();

        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            if let Some(oldest_key) = sessions
                .iter()
                .min_by_key(|(_, slot)| slot.created_at)
                .map(|(k, _)| k.clone())
            {
                sessions.remove(&oldest_key);
                info!(session = %oldest_key, "Evicted oldest session");
            }
        }
        sessions.insert(
            id.clone(),
            SessionSlot {
                created_at: session.created_at(),
                session: Arc::new(Mutex::new(session)),
            },
        );
        id
    }

    async fn session(&self, id: &str) -> Option<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(id)
            .map(|slot| slot.session.clone())
    }

    async fn remove_session(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/sessions", post(create_session_handler))
        .route(
            "/sessions/{id}",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route(
            "/sessions/{id}/messages",
            post(post_message_handler).delete(clear_messages_handler),
        )
        .with_state(state)
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

#[derive(Deserialize)]
pub struct MessageRequest {
    pub content: String,
}

/// What a client needs to redraw the chat.
#[derive(Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: String,
    pub state: SessionState,
    pub turns: Vec<Turn>,
    pub last_error: Option<String>,
    pub usage: UsageSnapshot,
}

impl SessionView {
    fn of(session: &ChatSession) -> Self {
        Self {
            session_id: session.id().to_string(),
            state: session.state(),
            turns: session.transcript().to_vec(),
            last_error: session.last_error().map(str::to_string),
            usage: session.usage_snapshot(),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn not_found(id: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, format!("Session {id} not found"))
}

fn busy(id: &str) -> ApiError {
    api_error(
        StatusCode::CONFLICT,
        SessionError::Busy(id.to_string()).to_string(),
    )
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn create_session_handler(
    State(state): State<SharedApiState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = state.create_session().await;
    info!(session = %session_id, "Session created");
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

async fn get_session_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let handle = state.session(&id).await.ok_or_else(|| not_found(&id))?;
    let session = handle.try_lock().map_err(|_| busy(&id))?;
    Ok(Json(SessionView::of(&session)))
}

async fn post_message_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
    Json(payload): Json<MessageRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let handle = state.session(&id).await.ok_or_else(|| not_found(&id))?;

    // The map lock is already released; only this session is held for the
    // duration of the provider call.
    let mut session = handle.try_lock().map_err(|_| {
        warn!(session = %id, "Message rejected, request already in flight");
        busy(&id)
    })?;

    match session.submit(&payload.content).await {
        Ok(TurnOutcome::Answered(_)) => {}
        Ok(TurnOutcome::Failed { reason }) => {
            info!(session = %id, error = %reason, "Turn failed, reporting in transcript view");
        }
        Err(SessionError::EmptyInput) => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                SessionError::EmptyInput.to_string(),
            ));
        }
        Err(SessionError::Busy(_)) => return Err(busy(&id)),
    }

    Ok(Json(SessionView::of(&session)))
}

async fn clear_messages_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let handle = state.session(&id).await.ok_or_else(|| not_found(&id))?;
    let mut session = handle.try_lock().map_err(|_| busy(&id))?;
    session.clear();
    Ok(Json(SessionView::of(&session)))
}

async fn delete_session_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.remove_session(&id).await {
        info!(session = %id, "Session deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use dostbot_core::error::ProviderError;
    use dostbot_core::message::Message;
    use dostbot_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};

    /// Lightweight mock provider for gateway tests.
    struct MockProvider {
        response: Result<String, ProviderError>,
    }

    impl MockProvider {
        fn new(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
            }
        }

        fn failing(err: ProviderError) -> Self {
            Self { response: Err(err) }
        }
    }

    #[async_trait::async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "gateway_mock"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            let text = self.response.clone()?;
            Ok(ProviderResponse {
                message: Message::assistant(text),
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
                model: "mock-model".into(),
            })
        }
    }

    fn test_api_state_with(provider: MockProvider, max_sessions: usize) -> SharedApiState {
        let assistant = Arc::new(AssistantContext::new(Arc::new(provider), None));
        Arc::new(ApiV1State::new(assistant, max_sessions))
    }

    fn test_api_state() -> SharedApiState {
        test_api_state_with(MockProvider::new("Hello!"), 10)
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_message(id: &str, content: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/sessions/{id}/messages"))
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "content": content }).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn create_session_returns_201() {
        let state = test_api_state();
        let app = v1_router(state.clone());

        let req = Request::builder()
            .method("POST")
            .uri("/sessions")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let json: CreateSessionResponse = body_json(response).await;
        assert!(!json.session_id.is_empty());
        assert_eq!(state.session_count().await, 1);
    }

    #[tokio::test]
    async fn get_unknown_session_is_404() {
        let app = v1_router(test_api_state());

        let req = Request::builder()
            .uri("/sessions/nonexistent")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn new_session_has_empty_transcript() {
        let state = test_api_state();
        let id = state.create_session().await;

        let req = Request::builder()
            .uri(format!("/sessions/{id}"))
            .body(Body::empty())
            .unwrap();

        let response = v1_router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let view: SessionView = body_json(response).await;
        assert_eq!(view.session_id, id);
        assert_eq!(view.state, SessionState::Idle);
        assert!(view.turns.is_empty());
        assert!(view.last_error.is_none());
    }

    #[tokio::test]
    async fn post_message_returns_answered_transcript() {
        let state = test_api_state();
        let id = state.create_session().await;

        let response = v1_router(state)
            .oneshot(post_message(&id, "Hi"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let view: SessionView = body_json(response).await;
        assert_eq!(view.turns, vec![Turn::user("Hi"), Turn::assistant("Hello!")]);
        assert!(view.last_error.is_none());
        assert_eq!(view.usage.total_tokens, 15);
    }

    #[tokio::test]
    async fn provider_failure_is_200_with_last_error() {
        let state = test_api_state_with(
            MockProvider::failing(ProviderError::AuthenticationFailed("bad key".into())),
            10,
        );
        let id = state.create_session().await;

        let response = v1_router(state)
            .oneshot(post_message(&id, "Hi"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let view: SessionView = body_json(response).await;
        assert_eq!(view.turns, vec![Turn::user("Hi")]);
        assert!(view.last_error.unwrap().contains("bad key"));
        assert_eq!(view.usage.failed_turns, 1);
    }

    #[tokio::test]
    async fn blank_message_is_400() {
        let state = test_api_state();
        let id = state.create_session().await;

        let response = v1_router(state)
            .oneshot(post_message(&id, "   "))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn message_to_unknown_session_is_404() {
        let response = v1_router(test_api_state())
            .oneshot(post_message("missing", "Hi"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn busy_session_is_409() {
        let state = test_api_state();
        let id = state.create_session().await;

        let handle = state.session(&id).await.unwrap();
        let _held = handle.lock().await;

        let response = v1_router(state.clone())
            .oneshot(post_message(&id, "Hi"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let req = Request::builder()
            .uri(format!("/sessions/{id}"))
            .body(Body::empty())
            .unwrap();
        let response = v1_router(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let err: ErrorResponse = body_json(response).await;
        assert!(err.error.contains(&id));

        let req = Request::builder()
            .method("DELETE")
            .uri(format!("/sessions/{id}/messages"))
            .body(Body::empty())
            .unwrap();
        let response = v1_router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn clear_messages_empties_transcript() {
        let state = test_api_state();
        let id = state.create_session().await;

        v1_router(state.clone())
            .oneshot(post_message(&id, "Hi"))
            .await
            .unwrap();

        let req = Request::builder()
            .method("DELETE")
            .uri(format!("/sessions/{id}/messages"))
            .body(Body::empty())
            .unwrap();
        let response = v1_router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let view: SessionView = body_json(response).await;
        assert_eq!(view.session_id, id);
        assert!(view.turns.is_empty());
    }

    #[tokio::test]
    async fn delete_session_then_404() {
        let state = test_api_state();
        let id = state.create_session().await;

        let delete = || {
            Request::builder()
                .method("DELETE")
                .uri(format!("/sessions/{id}"))
                .body(Body::empty())
                .unwrap()
        };

        let response = v1_router(state.clone()).oneshot(delete()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = v1_router(state).oneshot(delete()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn oldest_session_evicted_at_capacity() {
        let state = test_api_state_with(MockProvider::new("ok"), 2);

        let first = state.create_session().await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = state.create_session().await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let third = state.create_session().await;

        assert_eq!(state.session_count().await, 2);
        assert!(state.session(&first).await.is_none());
        assert!(state.session(&second).await.is_some());
        assert!(state.session(&third).await.is_some());
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let state = test_api_state();
        let a = state.create_session().await;
        let b = state.create_session().await;

        v1_router(state.clone())
            .oneshot(post_message(&a, "Hi"))
            .await
            .unwrap();

        let req = Request::builder()
            .uri(format!("/sessions/{b}"))
            .body(Body::empty())
            .unwrap();
        let view: SessionView = body_json(v1_router(state).oneshot(req).await.unwrap()).await;
        assert!(view.turns.is_empty());
    }
}
