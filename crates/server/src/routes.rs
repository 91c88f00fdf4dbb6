use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use codeviz_core::CoreError;
use codeviz_proto::{
    DetailResponse, ErrorBody, ExecutePayload, ExecuteResponse, ERROR_CODE_INTERNAL,
    ERROR_CODE_VALIDATION, HEADER_USER_ID, PATH_EXECUTE, PATH_GRAPHQL, PATH_HEALTHZ, PATH_WS,
    SECTION_ROUTES,
};
use serde_json::json;
use tracing::info;

use crate::graphql::{AppSchema, UserContext};
use crate::ops::Operations;
use crate::ws;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) ops: Arc<dyn Operations>,
    pub(crate) schema: AppSchema,
}

/// Error returned by the plain HTTP handlers.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl ApiError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // internal details stay in the logs
        let body = if self.0.is_client_error() {
            ErrorBody {
                code: ERROR_CODE_VALIDATION.into(),
                message: self.0.to_string(),
            }
        } else {
            ErrorBody {
                code: ERROR_CODE_INTERNAL.into(),
                message: "Internal error".into(),
            }
        };
        (status, Json(body)).into_response()
    }
}

pub(crate) fn build_router(state: AppState) -> Router {
    let mut app: Router<AppState> = Router::new()
        .route(PATH_HEALTHZ, get(healthz))
        .route(PATH_EXECUTE, post(execute))
        .route(PATH_GRAPHQL, post(graphql))
        .route(PATH_WS, get(ws::upgrade));
    for &(path, detail) in SECTION_ROUTES {
        app = app.route(
            path,
            get(move || async move {
                Json(DetailResponse {
                    detail: detail.to_string(),
                })
            }),
        );
        // slashless form redirects, as the section mounts always have
        let bare = path.trim_end_matches('/');
        if !bare.is_empty() && bare != path {
            app = app.route(bare, get(move || async move { Redirect::temporary(path) }));
        }
    }
    app.with_state(state)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({"ok": true}))
}

async fn execute(
    State(state): State<AppState>,
    Json(payload): Json<ExecutePayload>,
) -> Result<Json<ExecuteResponse>, ApiError> {
    info!(lang = %payload.lang, "execute requested");
    state.ops.execute_code(&payload.code, &payload.lang)?;
    Ok(Json(ExecuteResponse::empty()))
}

async fn graphql(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    let user_id = headers
        .get(HEADER_USER_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    Json(state.schema.execute(req.data(UserContext { user_id })).await)
}
