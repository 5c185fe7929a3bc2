//! REST surface for the tracker.
//!
//! One route family per resource kind:
//!
//! ```text
//! GET    /api/{kind}        -> 200 [records in the resolved user scope]
//! POST   /api/{kind}        -> 201 created record (400 on validation)
//! PUT    /api/{kind}/{id}   -> 200 updated record (404 out of scope)
//! DELETE /api/{kind}/{id}   -> 200 {"success":true} (404 out of scope)
//! ```
//!
//! Every failure is converted to a JSON `{"error": ...}` body at this
//! boundary; nothing propagates as a panic.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::config::IdentityConfig;
use crate::error::{Error, JsonError, Result};
use crate::identity;
use crate::model::{
    from_create, Goal, Habit, MoodEntry, Resource, StudySession, Task, TimeBlock, Transaction,
    WorkoutLog,
};
use crate::store::{Backend, RecordStore};

/// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<Backend>,
    pub identity: IdentityConfig,
}

impl AppState {
    pub fn new(backend: Arc<Backend>, identity: IdentityConfig) -> Self {
        Self { backend, identity }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(JsonError::from(&self))).into_response()
    }
}

/// Assemble the full router
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new().route("/", get(root_handler));
    router = mount::<Task>(router);
    router = mount::<Habit>(router);
    router = mount::<Transaction>(router);
    router = mount::<TimeBlock>(router);
    router = mount::<Goal>(router);
    router = mount::<MoodEntry>(router);
    router = mount::<WorkoutLog>(router);
    router = mount::<StudySession>(router);
    router.with_state(state)
}

fn mount<T: Resource>(router: Router<AppState>) -> Router<AppState> {
    let base = format!("/api/{}", T::KIND.path());
    let item = format!("{base}/{{id}}");
    router
        .route(&base, get(list_records::<T>).post(create_record::<T>))
        .route(&item, put(update_record::<T>).delete(delete_record::<T>))
}

/// Bind and serve until the task is aborted
pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(address = %listener.local_addr()?, "tracker API listening");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

async fn root_handler() -> &'static str {
    "Tracker API is running"
}

fn resolve(headers: &HeaderMap, config: &IdentityConfig) -> Result<String> {
    let value = headers
        .get(config.header.as_str())
        .and_then(|value| value.to_str().ok());
    identity::resolve_user(value, config)
}

async fn list_records<T: Resource>(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<T>>> {
    let user = resolve(&headers, &state.identity)?;
    let records = RecordStore::<T>::list(state.backend.as_ref(), &user).await?;
    Ok(Json(records))
}

async fn create_record<T: Resource>(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<T>)> {
    let user = resolve(&headers, &state.identity)?;
    let record = from_create::<T>(body, &user)?;
    let stored = RecordStore::<T>::create(state.backend.as_ref(), &user, record).await?;
    tracing::debug!(kind = T::KIND.path(), id = stored.id(), "record created");
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn update_record<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<Value>,
) -> Result<Json<T>> {
    let user = resolve(&headers, &state.identity)?;
    let stored = RecordStore::<T>::update(state.backend.as_ref(), &user, &id, &patch).await?;
    tracing::debug!(kind = T::KIND.path(), id = %id, "record updated");
    Ok(Json(stored))
}

async fn delete_record<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let user = resolve(&headers, &state.identity)?;
    RecordStore::<T>::delete(state.backend.as_ref(), &user, &id).await?;
    tracing::debug!(kind = T::KIND.path(), id = %id, "record deleted");
    Ok(Json(json!({"success": true})))
}
