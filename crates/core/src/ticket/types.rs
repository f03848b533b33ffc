use serde::{Deserialize, Serialize};
use std::fmt;

/// Urgency assigned to an enriched ticket.
///
/// Decoding is strict: only the exact strings `"High"`, `"Medium"` and
/// `"Low"` are accepted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured support ticket produced from a raw complaint.
///
/// All four fields are required when decoding; a payload missing any of them
/// does not produce a `Ticket` at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    /// Short summary of the complaint.
    pub title: String,
    /// Complaint rewritten in a professional tone.
    pub body: String,
    pub priority: Priority,
    /// Recommended next step for the support team.
    pub action: String,
}

impl Ticket {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        priority: Priority,
        action: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            priority,
            action: action.into(),
        }
    }

    /// Serialize to the wire format published on the enriched subject.
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode a ticket from an enriched-subject payload.
    pub fn from_payload(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ticket {
        Ticket::new(
            "Order not delivered",
            "Customer reports non-delivery.",
            Priority::High,
            "Escalate to logistics team immediately",
        )
    }

    #[test]
    fn test_priority_serializes_as_capitalized_name() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"High\"");
        assert_eq!(serde_json::to_string(&Priority::Medium).unwrap(), "\"Medium\"");
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"Low\"");
    }

    #[test]
    fn test_priority_rejects_other_spellings() {
        for value in ["\"high\"", "\"URGENT\"", "\"\"", "1", "null"] {
            assert!(
                serde_json::from_str::<Priority>(value).is_err(),
                "{value} should not decode"
            );
        }
    }

    #[test]
    fn test_ticket_payload_round_trip() {
        let ticket = sample();
        let payload = ticket.to_payload().unwrap();
        let decoded = Ticket::from_payload(&payload).unwrap();
        assert_eq!(decoded, ticket);
    }

    #[test]
    fn test_ticket_payload_shape() {
        let value: serde_json::Value =
            serde_json::from_slice(&sample().to_payload().unwrap()).unwrap();
        assert_eq!(value["title"], "Order not delivered");
        assert_eq!(value["priority"], "High");
        assert_eq!(value.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_ticket_missing_field_fails() {
        let json = r#"{"title": "t", "body": "b", "priority": "Low"}"#;
        assert!(serde_json::from_str::<Ticket>(json).is_err());
    }
}
