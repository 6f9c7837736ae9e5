use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Steps of the coach deletion sequence, in execution order. Carried by
/// [`Error::PartialCascade`] so an operator can tell where the sequence
/// stopped before deciding on manual cleanup or a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStep {
    ResolveCoach,
    CollectClients,
    DeleteSessions,
    DeleteMessages,
    DeleteClients,
    DeleteCoach,
}

impl std::fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CascadeStep::ResolveCoach => "resolve_coach",
            CascadeStep::CollectClients => "collect_clients",
            CascadeStep::DeleteSessions => "delete_sessions",
            CascadeStep::DeleteMessages => "delete_messages",
            CascadeStep::DeleteClients => "delete_clients",
            CascadeStep::DeleteCoach => "delete_coach",
        };
        write!(f, "{s}")
    }
}

/// Errors surfaced by the API and the platform facade.
#[derive(Debug, Error)]
pub enum Error {
    /// No valid platform session.
    #[error("not authenticated")]
    Unauthenticated,

    /// Authenticated, but the operation is outside the caller's scope.
    #[error("access denied")]
    AccessDenied,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    /// A remote platform call errored or timed out.
    #[error("platform request failed: {0}")]
    Dependency(String),

    /// The coach deletion stopped midway. Steps already completed are not
    /// retried automatically — a repeat run would re-issue them.
    #[error("coach deletion stopped at {failed}")]
    PartialCascade {
        failed: CascadeStep,
        completed: Vec<CascadeStep>,
        #[source]
        source: Box<Error>,
    },
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Dependency(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Dependency(format!("malformed platform record: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Error::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": "Not authenticated" }),
            ),
            Error::AccessDenied => (
                StatusCode::FORBIDDEN,
                serde_json::json!({ "error": "Access denied" }),
            ),
            Error::NotFound(what) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": format!("{what} not found") }),
            ),
            Error::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": msg }),
            ),
            Error::Dependency(detail) => {
                // Upstream detail goes to the log, never to the caller.
                tracing::error!("platform dependency failure: {detail}");
                (
                    StatusCode::BAD_GATEWAY,
                    serde_json::json!({ "error": "Upstream service unavailable" }),
                )
            }
            Error::PartialCascade {
                failed,
                completed,
                source,
            } => {
                tracing::error!(
                    "coach deletion stopped at {failed} (completed: {completed:?}): {source}"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({
                        "error": "Coach deletion did not complete",
                        "failed_step": failed,
                        "completed_steps": completed,
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
