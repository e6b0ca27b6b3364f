use crate::config::{DatabaseConfig, StorageBackend};
use crate::error::{AppError, Result};
use crate::state::{IncidentStore, InMemoryStore, PostgresStore};
use std::sync::Arc;

/// Create an incident store based on configuration
pub async fn create_store(config: &DatabaseConfig) -> Result<Arc<dyn IncidentStore>> {
    match config.backend {
        StorageBackend::Postgres => {
            if config.name.is_empty() {
                return Err(AppError::Configuration(
                    "Postgres backend requires a database name (DB_NAME)".to_string(),
                ));
            }

            tracing::info!(host = %config.host, "Initializing PostgreSQL storage backend");

            let store = PostgresStore::connect(config).await?;
            if config.init_schema {
                store.init_schema().await?;
            }
            Ok(Arc::new(store))
        }

        StorageBackend::Memory => Ok(create_in_memory_store()),
    }
}

/// Create an in-memory store (for testing and development)
pub fn create_in_memory_store() -> Arc<dyn IncidentStore> {
    tracing::info!("Initializing in-memory storage backend");
    Arc::new(InMemoryStore::new())
}
