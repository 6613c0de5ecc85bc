use crate::{
    config::Config,
    services::pdf::{PdfReceiptRenderer, ReceiptRenderer},
};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<Config>,
    pub renderer: Arc<dyn ReceiptRenderer>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config) -> Self {
        let renderer = Arc::new(PdfReceiptRenderer::new(config.receipts_dir.clone()));
        Self::with_renderer(db, config, renderer)
    }

    /// Swap the artifact writer, e.g. for tests that must not touch disk.
    pub fn with_renderer(db: SqlitePool, config: Config, renderer: Arc<dyn ReceiptRenderer>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            renderer,
        }
    }
}
