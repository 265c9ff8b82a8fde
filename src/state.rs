//! Application state shared with every request handler.

use std::sync::Arc;
use std::time::Instant;

use crate::store::DataStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DataStore>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<DataStore>) -> Self {
        Self {
            store,
            started_at: Instant::now(),
        }
    }
}
