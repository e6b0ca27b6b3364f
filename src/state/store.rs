use crate::error::{AppError, Result};
use crate::models::{CreateIncidentRequest, Incident, UpdateIncidentRequest};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Trait for incident storage operations
#[async_trait]
pub trait IncidentStore: Send + Sync {
    /// Persist a new incident, assigning its id and timestamps
    async fn insert(&self, request: &CreateIncidentRequest) -> Result<Incident>;

    /// All incidents in ascending id order
    async fn list_all(&self) -> Result<Vec<Incident>>;

    /// Get an incident by ID
    async fn get(&self, id: i64) -> Result<Option<Incident>>;

    /// Apply a partial update. Fails with `NotFound` if the id is absent.
    async fn update(&self, id: i64, changes: &UpdateIncidentRequest) -> Result<Incident>;

    /// Delete an incident. Returns whether a record was removed.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Verify the backend is reachable
    async fn health_check(&self) -> Result<()>;
}

pub(crate) fn incident_not_found() -> AppError {
    AppError::NotFound("Incident not found".to_string())
}

/// In-memory incident store (for development and testing)
#[derive(Clone)]
pub struct InMemoryStore {
    incidents: Arc<DashMap<i64, Incident>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            incidents: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IncidentStore for InMemoryStore {
    async fn insert(&self, request: &CreateIncidentRequest) -> Result<Incident> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let incident = Incident::from_request(id, request);

        self.incidents.insert(id, incident.clone());

        tracing::debug!(incident_id = id, "Incident saved");
        Ok(incident)
    }

    async fn list_all(&self) -> Result<Vec<Incident>> {
        let mut incidents: Vec<Incident> = self
            .incidents
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        incidents.sort_by_key(|incident| incident.id);
        Ok(incidents)
    }

    async fn get(&self, id: i64) -> Result<Option<Incident>> {
        Ok(self.incidents.get(&id).map(|entry| entry.value().clone()))
    }

    async fn update(&self, id: i64, changes: &UpdateIncidentRequest) -> Result<Incident> {
        let mut entry = self.incidents.get_mut(&id).ok_or_else(incident_not_found)?;
        entry.apply_update(changes);

        tracing::debug!(incident_id = id, "Incident updated");
        Ok(entry.value().clone())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let removed = self.incidents.remove(&id).is_some();
        if removed {
            tracing::debug!(incident_id = id, "Incident deleted");
        }
        Ok(removed)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
