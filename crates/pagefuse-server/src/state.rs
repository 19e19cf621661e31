//! Shared application state handed to every route handler.

use std::sync::Arc;

use pagefuse::config::PipelineConfig;
use rusqlite::Connection;
use tokio::sync::{mpsc, Mutex};

use crate::worker::WorkItem;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub work_tx: mpsc::Sender<WorkItem>,
    pub config: Arc<PipelineConfig>,
    pub session_secret: Arc<String>,
}
