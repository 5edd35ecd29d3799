use std::sync::Arc;

use dimagram_ingest::Ingestor;
use dimagram_publish::{AlbumLedger, Publisher};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<Publisher>,
    pub ingestor: Arc<Ingestor>,
}

impl AppState {
    pub fn new(publisher: Arc<Publisher>, ingestor: Arc<Ingestor>) -> Self {
        Self { publisher, ingestor }
    }

    pub fn ledger(&self) -> &AlbumLedger {
        self.publisher.ledger()
    }
}
