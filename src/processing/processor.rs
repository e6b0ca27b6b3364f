use crate::error::Result;
use crate::metrics::INCIDENTS_TOTAL;
use crate::models::{CreateIncidentRequest, Incident, UpdateIncidentRequest};
use crate::notifications::NotificationDispatcher;
use crate::state::store::incident_not_found;
use crate::state::IncidentStore;
use std::sync::Arc;
use validator::Validate;

/// Orchestrates validation, persistence and notification for incident requests
pub struct IncidentProcessor {
    store: Arc<dyn IncidentStore>,
    dispatcher: Option<Arc<NotificationDispatcher>>,
}

impl IncidentProcessor {
    pub fn new(store: Arc<dyn IncidentStore>) -> Self {
        Self {
            store,
            dispatcher: None,
        }
    }

    /// Get a reference to the incident store
    pub fn store(&self) -> &Arc<dyn IncidentStore> {
        &self.store
    }

    /// Set the notification dispatcher
    pub fn with_dispatcher(mut self, dispatcher: Arc<NotificationDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Get the notification dispatcher, if notifications are enabled
    pub fn dispatcher(&self) -> Option<&Arc<NotificationDispatcher>> {
        self.dispatcher.as_ref()
    }

    /// Validate and persist a new incident, then hand it to the dispatcher.
    ///
    /// The incident is committed before dispatch is attempted; dispatch is
    /// queued and never awaited, so its outcome cannot affect the result.
    pub async fn create_incident(&self, request: CreateIncidentRequest) -> Result<Incident> {
        request.validate()?;

        let incident = self.store.insert(&request).await?;
        INCIDENTS_TOTAL.with_label_values(&["created"]).inc();

        tracing::info!(
            incident_id = incident.id,
            severity = %incident.severity,
            "Created new incident"
        );

        if let Some(ref dispatcher) = self.dispatcher {
            if dispatcher.maybe_notify(&incident) {
                tracing::debug!(incident_id = incident.id, "Notification queued");
            }
        }

        Ok(incident)
    }

    /// All incidents, oldest first
    pub async fn list_incidents(&self) -> Result<Vec<Incident>> {
        self.store.list_all().await
    }

    /// Get an incident or fail with `NotFound`
    pub async fn get_incident(&self, id: i64) -> Result<Incident> {
        self.store.get(id).await?.ok_or_else(incident_not_found)
    }

    /// Apply a validated partial update
    pub async fn update_incident(
        &self,
        id: i64,
        changes: UpdateIncidentRequest,
    ) -> Result<Incident> {
        changes.validate()?;

        let incident = self.store.update(id, &changes).await?;
        INCIDENTS_TOTAL.with_label_values(&["updated"]).inc();

        tracing::info!(
            incident_id = id,
            status = %incident.status,
            "Updated incident"
        );

        Ok(incident)
    }

    /// Delete an incident; deleting an absent id is a no-op
    pub async fn delete_incident(&self, id: i64) -> Result<()> {
        if self.store.delete(id).await? {
            INCIDENTS_TOTAL.with_label_values(&["deleted"]).inc();
            tracing::info!(incident_id = id, "Deleted incident");
        } else {
            tracing::debug!(incident_id = id, "Delete requested for absent incident");
        }
        Ok(())
    }

    /// Check that the storage backend is reachable
    pub async fn health(&self) -> Result<()> {
        self.store.health_check().await
    }
}
