use crate::config::Config;
use common::store::Repository;
use std::sync::Arc;

/// Shared per-application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
    pub config: Arc<Config>,
}
