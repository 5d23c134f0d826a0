use crate::error::{AppError, Result};

/// Trailing token the summarizer persona is instructed to end with.
pub const TERMINATION_SENTINEL: &str = "TERMINATE";

/// Literal opening of the outbound prompt; used to recognize it in the
/// transcript.
pub const PROMPT_PREAMBLE: &str = "Please summarize";

/// Role under which the relay proxy records every turn it handles,
/// including replies it relays back from the model.
pub const RELAY_ROLE: &str = "user";

/// One entry of a conversation transcript. `content` is `None` when the
/// turn carried no textual payload.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn new(role: &str, content: Option<&str>) -> Self {
        Self {
            role: role.to_string(),
            content: content.map(str::to_string),
        }
    }

    /// A turn recorded by the relay proxy under its own role.
    pub fn relayed(content: &str) -> Self {
        Self::new(RELAY_ROLE, Some(content))
    }
}

/// Recovers the summary from a finished transcript.
///
/// Scans in reverse for the first relay-authored message whose content is
/// a string, is not the original prompt, and is non-empty once every
/// occurrence of the termination sentinel is removed and the result
/// trimmed. Failing that, returns `ExtractionError`.
pub fn extract_summary(transcript: &[ChatMessage]) -> Result<String> {
    for msg in transcript.iter().rev() {
        if msg.role != RELAY_ROLE {
            tracing::debug!(role = %msg.role, "skipping non-relay transcript message");
            continue;
        }

        let Some(raw) = msg.content.as_deref() else {
            tracing::debug!("skipping relay message with non-string content");
            continue;
        };

        if raw.trim().starts_with(PROMPT_PREAMBLE) {
            tracing::debug!("skipping relay message that looks like the original prompt");
            continue;
        }

        let cleaned = raw.replace(TERMINATION_SENTINEL, "");
        let cleaned = cleaned.trim();
        if !cleaned.is_empty() {
            return Ok(cleaned.to_string());
        }
        tracing::debug!("relay message was empty after sentinel removal, continuing search");
    }

    Err(AppError::ExtractionError(
        "no relay-authored message with a usable reply was found in the chat history".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMPT: &str = "Please summarize the following web page content:\n\n---\nbody\n---";

    #[test]
    fn recovers_reply_and_strips_sentinel() {
        let transcript = vec![
            ChatMessage::relayed(PROMPT),
            ChatMessage::relayed("This page discusses X. TERMINATE"),
        ];
        assert_eq!(extract_summary(&transcript).unwrap(), "This page discusses X.");
    }

    #[test]
    fn prompt_alone_is_extraction_failure() {
        let transcript = vec![ChatMessage::relayed(PROMPT)];
        assert!(matches!(
            extract_summary(&transcript),
            Err(AppError::ExtractionError(_))
        ));
    }

    #[test]
    fn empty_after_sentinel_removal_continues_backward() {
        let transcript = vec![
            ChatMessage::relayed(PROMPT),
            ChatMessage::relayed("An earlier usable reply. TERMINATE"),
            ChatMessage::relayed("  TERMINATE  "),
        ];
        assert_eq!(
            extract_summary(&transcript).unwrap(),
            "An earlier usable reply."
        );
    }

    #[test]
    fn non_string_content_is_skipped() {
        let transcript = vec![
            ChatMessage::relayed(PROMPT),
            ChatMessage::relayed("The real reply. TERMINATE"),
            ChatMessage::new(RELAY_ROLE, None),
        ];
        assert_eq!(extract_summary(&transcript).unwrap(), "The real reply.");
    }

    #[test]
    fn non_relay_roles_are_skipped() {
        let transcript = vec![
            ChatMessage::relayed(PROMPT),
            ChatMessage::new("assistant", Some("Not recorded by the relay. TERMINATE")),
        ];
        assert!(matches!(
            extract_summary(&transcript),
            Err(AppError::ExtractionError(_))
        ));
    }

    #[test]
    fn last_valid_reply_wins() {
        let transcript = vec![
            ChatMessage::relayed(PROMPT),
            ChatMessage::relayed("First attempt. TERMINATE"),
            ChatMessage::relayed(""),
            ChatMessage::relayed("Second, fuller attempt. TERMINATE"),
        ];
        assert_eq!(
            extract_summary(&transcript).unwrap(),
            "Second, fuller attempt."
        );
    }

    #[test]
    fn empty_transcript_is_extraction_failure() {
        assert!(matches!(
            extract_summary(&[]),
            Err(AppError::ExtractionError(_))
        ));
    }
}
