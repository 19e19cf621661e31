//! HTTP routes: upload a document, poll its status, fetch a reconstructed
//! page.

use axum::extract::{Multipart, Path, State};
use axum::middleware;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use pagefuse::types::PageStatus;
use serde::{Deserialize, Serialize};

use crate::auth::require_session;
use crate::error::{Result, ServerError};
use crate::state::AppState;
use crate::worker::WorkItem;

pub fn router(state: AppState) -> Router {
    let guarded = Router::new()
        .route("/documents", post(upload))
        .route("/documents/{id}", get(document_status))
        .route("/documents/{id}/retry", post(retry))
        .route("/documents/{id}/pages/{page_num}", get(page))
        .route("/documents/{id}/pages/{page_num}/status", patch(set_page_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new().route("/healthz", get(healthz)).merge(guarded).with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Serialize)]
struct UploadResponse {
    document_id: i64,
}

async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<UploadResponse>> {
    let mut filename = "document.pdf".to_string();
    let mut bytes = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| ServerError::BadRequest(e.to_string()))? {
        if field.name() == Some("file") {
            filename = field.file_name().unwrap_or("document.pdf").to_string();
            bytes = Some(field.bytes().await.map_err(|e| ServerError::BadRequest(e.to_string()))?.to_vec());
        }
    }
    let bytes = bytes.ok_or_else(|| ServerError::BadRequest("missing `file` field".to_string()))?;

    let document_id = {
        let conn = state.db.lock().await;
        let created_at = chrono::Utc::now().to_rfc3339();
        crate::db::insert_document(&conn, &filename, &created_at, &bytes)?
    };

    state
        .work_tx
        .send(WorkItem { document_id, pdf_bytes: bytes })
        .await
        .map_err(|_| ServerError::BadState("worker queue closed".to_string()))?;

    Ok(Json(UploadResponse { document_id }))
}

/// Re-enqueues a document's original upload bytes, e.g. after a worker
/// crashed mid-document and left it stuck in `PROCESSING`.
async fn retry(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<UploadResponse>> {
    let pdf_bytes = {
        let conn = state.db.lock().await;
        crate::db::document_bytes(&conn, id)?.ok_or(ServerError::NotFound)?
    };
    state.work_tx.send(WorkItem { document_id: id, pdf_bytes }).await.map_err(|_| ServerError::BadState("worker queue closed".to_string()))?;
    Ok(Json(UploadResponse { document_id: id }))
}

#[derive(Deserialize)]
struct SetPageStatusRequest {
    status: PageStatus,
}

async fn set_page_status(State(state): State<AppState>, Path((id, page_num)): Path<(i64, i64)>, Json(body): Json<SetPageStatusRequest>) -> Result<()> {
    let conn = state.db.lock().await;
    if crate::db::update_page_status(&conn, id, page_num, body.status)? {
        Ok(())
    } else {
        Err(ServerError::NotFound)
    }
}

#[derive(Serialize)]
struct DocumentStatusResponse {
    document_id: i64,
    status: String,
}

async fn document_status(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<DocumentStatusResponse>> {
    let conn = state.db.lock().await;
    let status = crate::db::document_status(&conn, id)?.ok_or(ServerError::NotFound)?;
    Ok(Json(DocumentStatusResponse { document_id: id, status: format!("{status:?}").to_uppercase() }))
}

async fn page(State(state): State<AppState>, Path((id, page_num)): Path<(i64, i64)>) -> Result<Json<pagefuse::types::Page>> {
    let conn = state.db.lock().await;
    let page = crate::db::get_page(&conn, id, page_num)?.ok_or(ServerError::NotFound)?;
    Ok(Json(page))
}
