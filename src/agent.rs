use crate::error::{AppError, Result};
use crate::llm::{GeminiClient, WireTurn};
use crate::transcript::{extract_summary, ChatMessage, TERMINATION_SENTINEL};

const SUMMARIZER_SYSTEM_MESSAGE: &str = "You are an expert AI assistant specialized in summarizing web content. \
     Analyze the provided text, identify the key information and main points. \
     Generate a concise and clear summary of the text. \
     Your output should be *only* the summary paragraph itself, without any introductory phrases \
     like 'Here is the summary:' or any other explanations. \
     End your response with the word TERMINATE.";

/// The relay proxy replies on its own at most this many times before the
/// conversation is forced to stop.
const MAX_CONSECUTIVE_AUTO_REPLY: usize = 1;

/// What the proxy says when it auto-replies.
const DEFAULT_AUTO_REPLY: &str = "";

/// Summarizes `context` through a scripted two-persona exchange with the
/// model and recovers the reply from the resulting transcript.
pub async fn summarize_with_agent(context: &str, api_key: &str, model: &str) -> Result<String> {
    if context.trim().is_empty() {
        return Err(AppError::InputError(
            "no content provided to summarize".to_string(),
        ));
    }

    let client = GeminiClient::new(api_key, model)?;
    let prompt = build_summary_prompt(context);

    tracing::info!(
        model = client.model_name(),
        prompt_chars = prompt.len(),
        "initiating summarization chat"
    );

    let transcript = run_conversation(&client, &prompt).await?;

    if tracing::enabled!(tracing::Level::DEBUG) {
        for (i, msg) in transcript.iter().enumerate() {
            let preview: String = msg
                .content
                .as_deref()
                .unwrap_or("<non-string content>")
                .chars()
                .take(150)
                .collect();
            tracing::debug!(index = i, role = %msg.role, %preview, "transcript entry");
        }
    }

    let summary = extract_summary(&transcript)?;
    tracing::info!(summary_chars = summary.len(), "extracted summary from transcript");
    Ok(summary)
}

pub fn build_summary_prompt(context: &str) -> String {
    format!(
        "Please summarize the following web page content:\n\n---\n{}\n---\n\n\
         Provide only the summary. End your response with {}",
        context, TERMINATION_SENTINEL
    )
}

/// Drives the scripted exchange: the proxy sends the prompt, the
/// summarizer persona replies, and the proxy either terminates on the
/// sentinel or auto-replies until its cap forces a stop.
///
/// The proxy records both the outbound prompt and the replies it relays
/// under its own role; `extract_summary` accounts for that when it skips
/// the prompt.
async fn run_conversation(client: &GeminiClient, prompt: &str) -> Result<Vec<ChatMessage>> {
    let mut wire = vec![WireTurn::user(prompt)];
    let mut transcript = vec![ChatMessage::relayed(prompt)];
    let mut total_tokens: Option<u32> = None;
    let mut rounds = 0;
    let mut auto_replies = 0;

    loop {
        let reply = client.chat(SUMMARIZER_SYSTEM_MESSAGE, &wire).await?;
        add_round_tokens(&mut total_tokens, rounds, reply.total_tokens)?;
        rounds += 1;

        wire.push(WireTurn::model(&reply.text));
        transcript.push(ChatMessage::relayed(&reply.text));

        if is_termination(&reply.text) {
            tracing::debug!(rounds, "reply ended with the termination sentinel");
            break;
        }
        if auto_replies >= MAX_CONSECUTIVE_AUTO_REPLY {
            tracing::warn!(rounds, "auto-reply cap reached, forcing chat termination");
            break;
        }

        auto_replies += 1;
        wire.push(WireTurn::user(DEFAULT_AUTO_REPLY));
        transcript.push(ChatMessage::relayed(DEFAULT_AUTO_REPLY));
    }

    match total_tokens {
        Some(total) => tracing::debug!(total_tokens = total, rounds, "chat finished"),
        None => tracing::debug!(rounds, "chat finished, endpoint reported no usage"),
    }

    Ok(transcript)
}

fn is_termination(reply: &str) -> bool {
    reply.trim_end().ends_with(TERMINATION_SENTINEL)
}

/// Folds one round's token count into the running total. The first round
/// establishes whether the endpoint reports usage at all; a later round
/// that disagrees has no meaningful sum, and that integer-plus-absent
/// mismatch is reported under its own variant.
fn add_round_tokens(
    total: &mut Option<u32>,
    rounds: usize,
    round_tokens: Option<u32>,
) -> Result<()> {
    if rounds == 0 {
        *total = round_tokens;
        return Ok(());
    }

    match (*total, round_tokens) {
        (Some(sum), Some(tokens)) => {
            *total = Some(sum + tokens);
            Ok(())
        }
        (None, None) => Ok(()),
        _ => Err(AppError::TokenAccountingError(
            "cannot add an integer token count and an absent one".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::PROMPT_PREAMBLE;

    #[tokio::test]
    async fn blank_context_fails_before_any_network_call() {
        let result = summarize_with_agent("   \n\t", "some-key", "gemini-1.5-pro").await;
        assert!(matches!(result, Err(AppError::InputError(_))));
    }

    #[tokio::test]
    async fn blank_api_key_is_auth_error() {
        let result = summarize_with_agent("some page text", "", "gemini-1.5-pro").await;
        assert!(matches!(result, Err(AppError::AuthError(_))));
    }

    #[test]
    fn prompt_starts_with_the_preamble_the_heuristic_skips() {
        let prompt = build_summary_prompt("page body");
        assert!(prompt.starts_with(PROMPT_PREAMBLE));
        assert!(prompt.contains("page body"));
        assert!(prompt.trim_end().ends_with(TERMINATION_SENTINEL));
    }

    #[test]
    fn termination_tolerates_trailing_whitespace() {
        assert!(is_termination("Summary text. TERMINATE"));
        assert!(is_termination("Summary text. TERMINATE  \n"));
        assert!(!is_termination("Summary text."));
        assert!(!is_termination("TERMINATE midway through"));
    }

    #[test]
    fn consistent_round_tokens_sum() {
        let mut total = None;
        add_round_tokens(&mut total, 0, Some(120)).unwrap();
        add_round_tokens(&mut total, 1, Some(80)).unwrap();
        assert_eq!(total, Some(200));
    }

    #[test]
    fn absent_usage_throughout_is_fine() {
        let mut total = None;
        add_round_tokens(&mut total, 0, None).unwrap();
        add_round_tokens(&mut total, 1, None).unwrap();
        assert_eq!(total, None);
    }

    #[test]
    fn mixed_usage_presence_is_the_known_accounting_fault() {
        let mut total = None;
        add_round_tokens(&mut total, 0, Some(120)).unwrap();
        let err = add_round_tokens(&mut total, 1, None).unwrap_err();
        assert!(matches!(err, AppError::TokenAccountingError(_)));

        let mut total = None;
        add_round_tokens(&mut total, 0, None).unwrap();
        let err = add_round_tokens(&mut total, 1, Some(80)).unwrap_err();
        assert!(matches!(err, AppError::TokenAccountingError(_)));
    }
}
