//! The browser-facing admin panel: an HTML list plus a JSON API that the
//! public page can read.

use crate::error::RegistryError;
use crate::models::{DocumentInput, DocumentRecord, DocumentType};
use crate::registry::DocumentRegistry;
use crate::render::ListView;
use crate::storage::DocumentStore;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Handlers take the lock for their whole read-modify-write, so mutations
/// apply one at a time in arrival order.
pub type SharedRegistry<S> = Arc<Mutex<DocumentRegistry<S>>>;

type ApiResult<T> = Result<T, (StatusCode, String)>;

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: i64,
    pub removed: bool,
}

pub fn build_router<S: DocumentStore + 'static>(registry: DocumentRegistry<S>) -> Router {
    let state: SharedRegistry<S> = Arc::new(Mutex::new(registry));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(admin_page::<S>))
        .route(
            "/documents",
            get(list_documents::<S>).post(create_document::<S>),
        )
        .route(
            "/documents/:id",
            get(get_document::<S>)
                .put(update_document::<S>)
                .delete(delete_document::<S>),
        )
        .route("/export", get(export_documents::<S>))
        .layer(cors)
        .with_state(state)
}

fn error_response(e: RegistryError) -> (StatusCode, String) {
    match e {
        RegistryError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        RegistryError::NotFound(id) => (StatusCode::NOT_FOUND, format!("Document {} not found", id)),
        RegistryError::Store(e) => {
            error!("store failure: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to access document store".to_string(),
            )
        }
    }
}

/// Wires the form and the card buttons to the JSON routes.
const ADMIN_SCRIPT: &str = r#"
const form = document.getElementById('uploadForm');
const submit = form.querySelector('button[type=submit]');
let editingId = null;
let editingFile = null;

async function send(method, url, body) {
    const res = await fetch(url, {
        method,
        headers: { 'Content-Type': 'application/json' },
        body: body ? JSON.stringify(body) : undefined,
    });
    if (!res.ok) {
        alert(await res.text());
        return null;
    }
    return res;
}

form.addEventListener('submit', async (e) => {
    e.preventDefault();
    const body = {
        title: form.docTitle.value,
        type: form.docType.value,
        link: form.docLink.value || null,
        description: form.docDescription.value || null,
    };
    if (!body.link && editingFile) {
        body.fileName = editingFile.fileName;
        body.fileSize = editingFile.fileSize;
    }
    const res = editingId
        ? await send('PUT', '/documents/' + editingId, body)
        : await send('POST', '/documents', body);
    if (res) location.reload();
});

document.querySelectorAll('[data-action]').forEach((button) => {
    button.addEventListener('click', async () => {
        const id = button.dataset.id;
        if (button.dataset.action === 'delete') {
            if (!confirm('Are you sure you want to delete this document?')) return;
            if (await send('DELETE', '/documents/' + id)) location.reload();
            return;
        }
        const res = await send('GET', '/documents/' + id);
        if (!res) return;
        const doc = await res.json();
        form.docTitle.value = doc.title;
        form.docType.value = doc.type;
        form.docLink.value = doc.link || '';
        form.docDescription.value = doc.description;
        editingFile = doc.fileName ? { fileName: doc.fileName, fileSize: doc.fileSize } : null;
        editingId = id;
        submit.textContent = 'Save changes';
        form.docTitle.focus();
    });
});
"#;

fn upload_form() -> String {
    let options: String = DocumentType::ALL
        .iter()
        .map(|t| format!("<option value=\"{t}\">{t}</option>"))
        .collect();

    format!(
        concat!(
            "<form id=\"uploadForm\">\n",
            "  <input name=\"docTitle\" placeholder=\"Title\" required>\n",
            "  <select name=\"docType\" required><option value=\"\">Type</option>{options}</select>\n",
            "  <input name=\"docLink\" placeholder=\"Google Drive link\">\n",
            "  <textarea name=\"docDescription\" placeholder=\"Description (optional)\"></textarea>\n",
            "  <button type=\"submit\">Add document</button>\n",
            "</form>\n"
        ),
        options = options,
    )
}

async fn admin_page<S: DocumentStore>(
    State(state): State<SharedRegistry<S>>,
) -> ApiResult<Html<String>> {
    let documents = state.lock().await.list_documents().map_err(error_response)?;
    let view = ListView::build(&documents);

    Ok(Html(format!(
        concat!(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Document Admin</title></head>\n",
            "<body>\n<h1>Documents ({count})</h1>\n",
            "{form}",
            "<p><a href=\"/export\">Export all</a></p>\n",
            "<div id=\"documentsList\">\n{list}</div>\n",
            "<script>{script}</script>\n</body>\n</html>\n"
        ),
        count = view.len(),
        form = upload_form(),
        list = view.to_html(),
        script = ADMIN_SCRIPT,
    )))
}

async fn list_documents<S: DocumentStore>(
    State(state): State<SharedRegistry<S>>,
) -> ApiResult<Json<Vec<DocumentRecord>>> {
    let documents = state.lock().await.list_documents().map_err(error_response)?;
    Ok(Json(documents))
}

async fn get_document<S: DocumentStore>(
    State(state): State<SharedRegistry<S>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DocumentRecord>> {
    let record = state.lock().await.get_document(id).map_err(error_response)?;
    record
        .map(Json)
        .ok_or_else(|| error_response(RegistryError::NotFound(id)))
}

async fn create_document<S: DocumentStore>(
    State(state): State<SharedRegistry<S>>,
    Json(input): Json<DocumentInput>,
) -> ApiResult<(StatusCode, Json<DocumentRecord>)> {
    let record = state
        .lock()
        .await
        .create_document(&input)
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_document<S: DocumentStore>(
    State(state): State<SharedRegistry<S>>,
    Path(id): Path<i64>,
    Json(input): Json<DocumentInput>,
) -> ApiResult<Json<DocumentRecord>> {
    let record = state
        .lock()
        .await
        .update_document(id, &input)
        .map_err(error_response)?;
    Ok(Json(record))
}

async fn delete_document<S: DocumentStore>(
    State(state): State<SharedRegistry<S>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    let removed = state
        .lock()
        .await
        .delete_document(id)
        .map_err(error_response)?;
    Ok(Json(DeleteResponse { id, removed }))
}

async fn export_documents<S: DocumentStore>(
    State(state): State<SharedRegistry<S>>,
) -> Result<Response, (StatusCode, String)> {
    let artifact = state.lock().await.export_all().map_err(error_response)?;
    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);

    Ok((
        [
            (header::CONTENT_TYPE, "application/json; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.content,
    )
        .into_response())
}
