//! HTTP route handlers: the HTML page and the JSON API.

use std::sync::Arc;

use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, Json, Redirect};
use axum::routing::{get, post, put};
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{Result as TodoResult, TodoError};
use crate::store::TodoStore;
use crate::web::state::AppState;

/// Build the page and API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/todos", post(add_todo))
        .route("/todos/{number}/complete", post(complete_todo))
        .nest("/api", api_router())
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{number}", put(update_todo).delete(delete_todo))
}

fn status_for(err: &TodoError) -> StatusCode {
    match err {
        TodoError::NoSuchItem { .. } => StatusCode::NOT_FOUND,
        TodoError::InvalidNumber(_) | TodoError::EmptyItem => StatusCode::BAD_REQUEST,
        other => {
            error!(error = %other, "todo request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

// File work runs on the blocking pool.
async fn with_store<T, F>(state: &AppState, f: F) -> Result<TodoResult<T>, StatusCode>
where
    F: FnOnce(&TodoStore) -> TodoResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|e| {
            error!(error = %e, "store task failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

/// Form posted by the page. `todo` is the typed text when adding, and the
/// item text the page showed when completing.
#[derive(Debug, Default, Deserialize)]
pub struct TodoForm {
    #[serde(default)]
    pub todo: String,
}

/// GET / - the page.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let list = with_store(&state, |store| store.load())
        .await?
        .map_err(|e| status_for(&e))?;
    let page = state.render_index(&list).map_err(|e| status_for(&e))?;
    Ok(Html(page))
}

/// POST /todos - add from the text box. Blank input is ignored.
pub async fn add_todo(
    State(state): State<AppState>,
    Form(form): Form<TodoForm>,
) -> Result<Redirect, StatusCode> {
    if form.todo.trim().is_empty() {
        return Ok(Redirect::to("/"));
    }
    let _guard = state.write_lock.lock().await;
    let text = form.todo;
    let (_, item) = with_store(&state, move |store| {
        store.update(|list| list.add(&text).map(str::to_string))
    })
    .await?
    .map_err(|e| status_for(&e))?;
    info!(item = %item, "added todo");
    Ok(Redirect::to("/"))
}

/// POST /todos/{number}/complete - ticked checkbox. Only removes the item
/// when it still reads the way the page showed it; otherwise the file is
/// not touched.
pub async fn complete_todo(
    State(state): State<AppState>,
    Path(number): Path<usize>,
    Form(form): Form<TodoForm>,
) -> Result<Redirect, StatusCode> {
    let _guard = state.write_lock.lock().await;
    let expected = form.todo;
    let res = with_store(&state, move |store| {
        let mut list = store.load()?;
        match list.get(number) {
            Some(current) if current == expected => {}
            Some(current) => {
                warn!(number, expected = %expected, found = %current, "stale completion ignored");
                return Ok(None);
            }
            None => {
                return Err(TodoError::NoSuchItem {
                    number,
                    len: list.len(),
                })
            }
        }
        let item = list.complete(number)?;
        store.save(&list)?;
        Ok(Some(item))
    })
    .await?;
    match res {
        Ok(Some(item)) => info!(item = %item, "completed todo"),
        Ok(None) => {}
        Err(e @ TodoError::NoSuchItem { .. }) => {
            warn!(number, error = %e, "completion of unknown item ignored");
        }
        Err(e) => return Err(status_for(&e)),
    }
    Ok(Redirect::to("/"))
}

/// GET /api/health
pub async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodosResponse {
    pub items: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodoText {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeResponse {
    /// The item as stored (added or edited) or as it was (deleted).
    pub item: String,
    pub items: Vec<String>,
}

/// GET /api/todos - all items in order.
pub async fn list_todos(State(state): State<AppState>) -> Result<Json<TodosResponse>, StatusCode> {
    let list = with_store(&state, |store| store.load())
        .await?
        .map_err(|e| status_for(&e))?;
    Ok(Json(TodosResponse {
        items: list.items().to_vec(),
    }))
}

/// POST /api/todos - append one item.
pub async fn create_todo(
    State(state): State<AppState>,
    Json(body): Json<TodoText>,
) -> Result<(StatusCode, Json<ChangeResponse>), StatusCode> {
    let _guard = state.write_lock.lock().await;
    let (list, item) = with_store(&state, move |store| {
        store.update(|list| list.add(&body.text).map(str::to_string))
    })
    .await?
    .map_err(|e| status_for(&e))?;
    info!(item = %item, "added todo");
    Ok((
        StatusCode::CREATED,
        Json(ChangeResponse {
            item,
            items: list.items().to_vec(),
        }),
    ))
}

/// PUT /api/todos/{number} - replace one item's text.
pub async fn update_todo(
    State(state): State<AppState>,
    Path(number): Path<usize>,
    Json(body): Json<TodoText>,
) -> Result<Json<ChangeResponse>, StatusCode> {
    let _guard = state.write_lock.lock().await;
    let (list, old) = with_store(&state, move |store| {
        store.update(|list| list.edit(number, &body.text))
    })
    .await?
    .map_err(|e| status_for(&e))?;
    info!(number, old = %old, "edited todo");
    let item = list.get(number).unwrap_or_default().to_string();
    Ok(Json(ChangeResponse {
        item,
        items: list.items().to_vec(),
    }))
}

/// DELETE /api/todos/{number} - complete one item.
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(number): Path<usize>,
) -> Result<Json<ChangeResponse>, StatusCode> {
    let _guard = state.write_lock.lock().await;
    let (list, item) = with_store(&state, move |store| {
        store.update(|list| list.complete(number))
    })
    .await?
    .map_err(|e| status_for(&e))?;
    info!(item = %item, "completed todo");
    Ok(Json(ChangeResponse {
        item,
        items: list.items().to_vec(),
    }))
}
