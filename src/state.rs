//! Shared application state for request handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::VitalsStore;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Both fields are read-only after startup. The store holds connect options
/// only; connections are opened per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn VitalsStore>,
}

impl AppState {
    /// Creates a new application state from the given configuration and store.
    pub fn new(config: AppConfig, store: impl VitalsStore + 'static) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, FileSettings};
    use crate::error::AppError;
    use crate::vitals::VitalsEvent;
    use async_trait::async_trait;

    struct NullStore;

    #[async_trait]
    impl VitalsStore for NullStore {
        async fn insert(&self, _event: &VitalsEvent) -> Result<u64, AppError> {
            Ok(0)
        }
    }

    #[test]
    fn test_clones_share_one_config() {
        let database = DatabaseConfig {
            user: "ingest".to_string(),
            password: "secret".to_string(),
            name: "vitals".to_string(),
            instance_connection_name: "proj:us-central1:db".to_string(),
        };
        let state = AppState::new(AppConfig::from_parts(FileSettings::default(), database), NullStore);
        let cloned = state.clone();

        assert!(Arc::ptr_eq(&state.config, &cloned.config));
        assert_eq!(cloned.config.database.name, "vitals");
    }
}
