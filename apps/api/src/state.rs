use std::sync::Arc;

use crate::config::Config;
use crate::parser::EmailParser;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Stateless and `Sync`; one instance serves every request.
    pub parser: Arc<EmailParser>,
}

impl AppState {
    pub fn new(config: Config, parser: EmailParser) -> Self {
        Self {
            config,
            parser: Arc::new(parser),
        }
    }
}
