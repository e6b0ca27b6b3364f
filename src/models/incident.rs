use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use validator::Validate;

/// A tracked incident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Store-assigned identifier, never reused
    pub id: i64,

    /// Human-readable title
    pub title: String,

    /// Detailed description
    pub description: String,

    /// Severity level
    pub severity: Severity,

    /// Lifecycle status
    pub status: IncidentStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Incident {
    /// Create a freshly opened incident with the given id
    pub fn new(id: i64, title: String, description: String, severity: Severity) -> Self {
        let now = now_micros();

        Self {
            id,
            title,
            description,
            severity,
            status: IncidentStatus::Open,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build an incident from a validated creation request
    pub fn from_request(id: i64, request: &CreateIncidentRequest) -> Self {
        Self::new(
            id,
            request.title.clone(),
            request.description.clone(),
            request.severity,
        )
    }

    /// Apply the fields present in `changes` and refresh `updated_at`
    pub fn apply_update(&mut self, changes: &UpdateIncidentRequest) {
        if let Some(ref title) = changes.title {
            self.title = title.clone();
        }
        if let Some(ref description) = changes.description {
            self.description = description.clone();
        }
        if let Some(severity) = changes.severity {
            self.severity = severity;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }

        self.touch();
    }

    /// Advance `updated_at`. Always moves forward, even if the wall clock has not.
    pub fn touch(&mut self) {
        self.updated_at = next_update_timestamp(self.updated_at);
    }

    /// Check if incident qualifies for an outbound notification
    pub fn is_critical(&self) -> bool {
        self.severity.should_notify()
    }
}

/// Current time at the precision the relational store keeps
pub fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Timestamp for an update following one stamped `previous`
pub fn next_update_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_micros();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    Display,
    AsRefStr,
)]
pub enum Severity {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Severity {
    /// Critical and High incidents trigger a notification on creation
    pub fn should_notify(&self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    Display,
    AsRefStr,
)]
pub enum IncidentStatus {
    #[default]
    Open,
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    Resolved,
    Closed,
}

/// Payload accepted by `POST /incidents`
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateIncidentRequest {
    #[validate(length(min = 5, max = 100, message = "title must be 5 to 100 characters"))]
    pub title: String,

    #[validate(length(min = 10, message = "description must be at least 10 characters"))]
    pub description: String,

    #[serde(default)]
    pub severity: Severity,
}

/// Payload accepted by `PUT /incidents/{id}`; absent or null fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct UpdateIncidentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 5, max = 100, message = "title must be 5 to 100 characters"))]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 10, message = "description must be at least 10 characters"))]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IncidentStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn create_request(title: &str, description: &str) -> CreateIncidentRequest {
        CreateIncidentRequest {
            title: title.to_string(),
            description: description.to_string(),
            severity: Severity::default(),
        }
    }

    #[test]
    fn test_incident_creation() {
        let incident = Incident::new(
            7,
            "Disk Full".to_string(),
            "Root volume is at 100%".to_string(),
            Severity::High,
        );

        assert_eq!(incident.id, 7);
        assert_eq!(incident.status, IncidentStatus::Open);
        assert_eq!(incident.created_at, incident.updated_at);
        assert!(incident.is_critical());
    }

    #[test]
    fn test_title_length_boundaries() {
        assert!(create_request("Four", "ten chars!").validate().is_err());
        assert!(create_request("Five!", "ten chars!").validate().is_ok());
        assert!(create_request(&"x".repeat(100), "ten chars!").validate().is_ok());
        assert!(create_request(&"x".repeat(101), "ten chars!").validate().is_err());
    }

    #[test]
    fn test_description_length_boundaries() {
        assert!(create_request("Valid title", "nine char").validate().is_err());
        assert!(create_request("Valid title", "ten chars!").validate().is_ok());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // five multi-byte characters
        assert!(create_request("ééééé", "ten chars!").validate().is_ok());
    }

    #[test]
    fn test_severity_defaults_to_medium() {
        let request: CreateIncidentRequest = serde_json::from_str(
            r#"{"title": "Queue backlog", "description": "Consumers are lagging behind."}"#,
        )
        .unwrap();
        assert_eq!(request.severity, Severity::Medium);
    }

    #[test]
    fn test_unknown_severity_is_rejected() {
        let result: Result<CreateIncidentRequest, _> = serde_json::from_str(
            r#"{"title": "Queue backlog", "description": "Consumers are lagging behind.", "severity": "Urgent"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&IncidentStatus::InProgress).unwrap(),
            "\"In Progress\""
        );
        assert_eq!(IncidentStatus::InProgress.to_string(), "In Progress");
        assert_eq!(
            IncidentStatus::from_str("In Progress").unwrap(),
            IncidentStatus::InProgress
        );
        assert!(IncidentStatus::from_str("InProgress").is_err());
        assert!(serde_json::from_str::<IncidentStatus>("\"Pending\"").is_err());
    }

    #[test]
    fn test_update_validation_applies_to_present_fields() {
        let empty = UpdateIncidentRequest::default();
        assert!(empty.validate().is_ok());

        let short_title = UpdateIncidentRequest {
            title: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(short_title.validate().is_err());

        let null_title: UpdateIncidentRequest =
            serde_json::from_str(r#"{"title": null, "status": "Closed"}"#).unwrap();
        assert!(null_title.title.is_none());
        assert_eq!(null_title.status, Some(IncidentStatus::Closed));
    }

    #[test]
    fn test_apply_update_touches_only_supplied_fields() {
        let mut incident = Incident::new(
            1,
            "API latency".to_string(),
            "p99 above 2s for checkout".to_string(),
            Severity::Low,
        );
        let before = incident.clone();

        incident.apply_update(&UpdateIncidentRequest {
            status: Some(IncidentStatus::Resolved),
            ..Default::default()
        });

        assert_eq!(incident.status, IncidentStatus::Resolved);
        assert_eq!(incident.title, before.title);
        assert_eq!(incident.description, before.description);
        assert_eq!(incident.severity, before.severity);
        assert_eq!(incident.created_at, before.created_at);
        assert!(incident.updated_at > before.updated_at);
    }

    #[test]
    fn test_touch_is_strictly_monotonic() {
        let future = now_micros() + Duration::seconds(60);
        assert_eq!(next_update_timestamp(future), future + Duration::microseconds(1));
    }

    #[test]
    fn test_severity_notification_threshold() {
        assert!(Severity::Critical.should_notify());
        assert!(Severity::High.should_notify());
        assert!(!Severity::Medium.should_notify());
        assert!(!Severity::Low.should_notify());
    }
}
