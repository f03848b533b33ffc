//! Sanitizing and decoding generated text into a [`Ticket`].

use crate::ticket::Ticket;

use super::error::EnrichmentError;

const FENCE: &str = "```";

fn is_language_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.' | '#')
}

/// Remove one leading and one trailing Markdown code fence, if present.
///
/// The opening fence may carry a language tag (```` ```json ````) and is
/// removed together with the rest of its line. The closing fence is removed
/// together with the line break before it. Text that neither starts nor ends
/// with a fence is returned unchanged.
pub fn strip_code_fence(text: &str) -> &str {
    let mut out = text;

    if let Some(after_fence) = out.trim_start().strip_prefix(FENCE) {
        let after_tag = after_fence.trim_start_matches(is_language_tag_char);
        let after_space = after_tag.trim_start_matches([' ', '\t']);
        out = after_space
            .strip_prefix("\r\n")
            .or_else(|| after_space.strip_prefix('\n'))
            .unwrap_or(after_space);
    }

    if let Some(before_fence) = out.trim_end().strip_suffix(FENCE) {
        out = before_fence
            .strip_suffix("\r\n")
            .or_else(|| before_fence.strip_suffix('\n'))
            .unwrap_or(before_fence);
    }

    out
}

/// Decode generated text as a ticket, rejecting anything that is not a
/// complete, well-typed ticket with a non-empty title.
pub fn decode_ticket(text: &str) -> Result<Ticket, EnrichmentError> {
    let malformed = |reason: String| EnrichmentError::MalformedOutput {
        reason,
        raw: text.to_string(),
    };

    let ticket: Ticket = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| malformed(format!("not a ticket: {e}")))?;

    if ticket.title.trim().is_empty() {
        return Err(malformed("ticket title is empty".to_string()));
    }

    Ok(ticket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::Priority;

    const TICKET_JSON: &str = r#"{"title":"Order not delivered","body":"Customer reports non-delivery and lack of response from support for one week.","priority":"High","action":"Escalate to logistics team immediately"}"#;

    #[test]
    fn test_strip_leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fence(TICKET_JSON), TICKET_JSON);
        assert_eq!(strip_code_fence("  {\"a\": 1}\n"), "  {\"a\": 1}\n");
        assert_eq!(strip_code_fence(""), "");
    }

    #[test]
    fn test_strip_fence_with_language_tag() {
        let fenced = format!("```json\n{TICKET_JSON}\n```");
        assert_eq!(strip_code_fence(&fenced), TICKET_JSON);
    }

    #[test]
    fn test_strip_fence_without_language_tag() {
        let fenced = format!("```\n{TICKET_JSON}\n```");
        assert_eq!(strip_code_fence(&fenced), TICKET_JSON);
    }

    #[test]
    fn test_strip_fence_with_crlf_and_surrounding_whitespace() {
        let fenced = format!("\n```JSON \r\n{TICKET_JSON}\r\n```\n\n");
        assert_eq!(strip_code_fence(&fenced), TICKET_JSON);
    }

    #[test]
    fn test_strip_fence_on_single_line() {
        let fenced = format!("```json{TICKET_JSON}```");
        assert_eq!(strip_code_fence(&fenced), TICKET_JSON);
    }

    #[test]
    fn test_strip_only_trailing_fence() {
        let text = format!("{TICKET_JSON}\n```");
        assert_eq!(strip_code_fence(&text), TICKET_JSON);
    }

    #[test]
    fn test_strip_requires_exact_fence_prefix() {
        // Two backticks are not a fence and must survive
        let text = "``json\n{}\n``";
        assert_eq!(strip_code_fence(text), text);
    }

    #[test]
    fn test_fenced_and_plain_decode_identically() {
        let plain = decode_ticket(TICKET_JSON).unwrap();
        for fenced in [
            format!("```json\n{TICKET_JSON}\n```"),
            format!("```\n{TICKET_JSON}\n```"),
            format!("```javascript\n{TICKET_JSON}\n```"),
        ] {
            assert_eq!(strip_code_fence(&fenced), TICKET_JSON);
            assert_eq!(decode_ticket(&fenced).unwrap(), plain);
        }
    }

    #[test]
    fn test_decode_example_ticket() {
        let ticket = decode_ticket(&format!("```json\n{TICKET_JSON}\n```")).unwrap();
        assert_eq!(ticket.title, "Order not delivered");
        assert_eq!(ticket.priority, Priority::High);
        assert_eq!(ticket.action, "Escalate to logistics team immediately");
    }

    #[test]
    fn test_decode_chatty_output_is_malformed() {
        let text = "Sure, here is your ticket: {not valid json";
        match decode_ticket(text) {
            Err(EnrichmentError::MalformedOutput { raw, .. }) => assert_eq!(raw, text),
            other => panic!("expected MalformedOutput, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_unknown_priority_is_malformed() {
        for priority in ["\"Critical\"", "\"high\"", "\"\"", "3", "null"] {
            let text = format!(
                r#"{{"title":"t","body":"b","priority":{priority},"action":"a"}}"#
            );
            let err = decode_ticket(&text).unwrap_err();
            assert!(err.is_malformed_output(), "{priority} should be rejected");
        }
    }

    #[test]
    fn test_decode_missing_field_is_malformed() {
        let text = r#"{"title":"t","body":"b","priority":"Low"}"#;
        assert!(decode_ticket(text).unwrap_err().is_malformed_output());
    }

    #[test]
    fn test_decode_wrong_type_is_malformed() {
        let text = r#"{"title":"t","body":["b"],"priority":"Low","action":"a"}"#;
        assert!(decode_ticket(text).unwrap_err().is_malformed_output());
    }

    #[test]
    fn test_decode_empty_title_is_malformed() {
        let text = r#"{"title":"  ","body":"b","priority":"Low","action":"a"}"#;
        assert!(decode_ticket(text).unwrap_err().is_malformed_output());
    }

    #[test]
    fn test_decode_does_not_extract_embedded_json() {
        let text = format!("Here you go:\n{TICKET_JSON}");
        assert!(decode_ticket(&text).unwrap_err().is_malformed_output());
    }
}
