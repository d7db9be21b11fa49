use std::sync::Arc;

use tmarket_analytics::{AnalyticsReporter, EventRecorder};
use tmarket_core::{config::Config, geo::CountryResolver, store::KvStore};

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
pub struct AppState {
    /// The key-value store both engine halves read and write through. Kept
    /// here (not just inside the engine) so the health probe can ping it.
    pub store: Arc<dyn KvStore>,

    pub recorder: EventRecorder,
    pub reporter: AnalyticsReporter,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KvStore>,
        resolver: Arc<dyn CountryResolver>,
        config: Config,
    ) -> Self {
        Self {
            recorder: EventRecorder::new(Arc::clone(&store), resolver),
            reporter: AnalyticsReporter::new(Arc::clone(&store)),
            store,
            config: Arc::new(config),
        }
    }
}
