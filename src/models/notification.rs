use crate::models::{Incident, Severity};
use serde::{Deserialize, Serialize};

/// Outbound message posted to the notification service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// Human-readable summary
    pub message: String,
    pub severity: Severity,
    /// Identifies this service to the receiver
    pub source_service: String,
    pub incident_id: i64,
}

impl NotificationMessage {
    /// Build the "new incident" message for a freshly created incident
    pub fn for_new_incident(incident: &Incident, source_service: &str) -> Self {
        Self {
            message: format!("New {} Incident: {}", incident.severity, incident.title),
            severity: incident.severity,
            source_service: source_service.to_string(),
            incident_id: incident.id,
        }
    }
}

/// Delivery counters for the notification dispatcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NotificationStats {
    pub queued: u64,
    pub sent: u64,
    pub failed: u64,
    pub dropped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_incident_message() {
        let incident = Incident::new(
            42,
            "Payment gateway down".to_string(),
            "All card payments are failing".to_string(),
            Severity::Critical,
        );

        let message = NotificationMessage::for_new_incident(&incident, "incident-service");
        assert_eq!(message.message, "New Critical Incident: Payment gateway down");
        assert_eq!(message.incident_id, 42);

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["severity"], "Critical");
        assert_eq!(json["source_service"], "incident-service");
        assert_eq!(json["incident_id"], 42);
    }
}
