//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external service traits,
//! allowing pipeline and ingress tests without a NATS server or a running
//! generation service.
//!
//! # Example
//!
//! ```rust,ignore
//! use supportai_core::testing::{MockBus, MockLlmClient};
//!
//! let bus = MockBus::new();
//! let llm = MockLlmClient::with_response(fixtures::TICKET_JSON);
//! ```

mod mock_bus;
mod mock_llm;

pub use mock_bus::MockBus;
pub use mock_llm::MockLlmClient;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::ticket::{Priority, Ticket};

    /// Complaint used throughout the enrichment scenarios.
    pub const COMPLAINT: &str = "My order never arrived and support ignored me for a week.";

    /// Generation output matching [`expected_ticket`] exactly.
    pub const TICKET_JSON: &str = r#"{"title":"Order not delivered","body":"Customer reports non-delivery and lack of response from support for one week.","priority":"High","action":"Escalate to logistics team immediately"}"#;

    /// Generation output that is not a ticket.
    pub const CHATTY_OUTPUT: &str = "Sure, here is your ticket: {not valid json";

    /// The ticket described by [`TICKET_JSON`].
    pub fn expected_ticket() -> Ticket {
        Ticket::new(
            "Order not delivered",
            "Customer reports non-delivery and lack of response from support for one week.",
            Priority::High,
            "Escalate to logistics team immediately",
        )
    }

    /// Wrap `text` in a Markdown code fence with an optional language tag.
    pub fn fenced(text: &str, language: Option<&str>) -> String {
        format!("```{}\n{}\n```", language.unwrap_or(""), text)
    }

    /// Generation output for a ticket with the given title.
    pub fn ticket_json(title: &str, priority: Priority) -> String {
        serde_json::to_string(&Ticket::new(
            title,
            format!("Body for {title}"),
            priority,
            "Follow up",
        ))
        .unwrap_or_default()
    }
}
