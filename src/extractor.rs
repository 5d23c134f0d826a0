use reqwest::{Client, ClientBuilder};
use scraper::{Html, Selector};
use std::time::Duration;
use once_cell::sync::Lazy;
use crate::error::{AppError, Result};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

// Create a static client to reuse connections
static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .timeout(Duration::from_secs(15))
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .expect("Failed to build HTTP client")
});

// Create a static selector to avoid recompiling it each time
static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("Failed to parse paragraph selector"));

/// Fetches a page and returns its readable paragraph text.
///
/// Non-2xx statuses and transport errors surface as `FetchError`; a page
/// with no paragraph text surfaces as `NoContentError`.
pub async fn fetch_and_clean(url: &str) -> Result<String> {
    let response = CLIENT
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::FetchError(format!("{}. Error: {}", url, e)))?;

    let response = response
        .error_for_status()
        .map_err(|e| AppError::FetchError(format!("{}. Error: {}", url, e)))?;

    let html = response.text().await?;
    let text = clean_paragraph_text(&html);

    if text.is_empty() {
        return Err(AppError::NoContentError(url.to_string()));
    }

    Ok(text)
}

/// Concatenates the visible text of every `<p>` element, trimmed, joined
/// by single spaces, with all whitespace runs collapsed to one space.
pub fn clean_paragraph_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let joined = document
        .select(&PARAGRAPH_SELECTOR)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .collect::<Vec<_>>()
        .join(" ");

    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paragraphs_with_single_spaces() {
        let html = "<html><body>\
            <p>First paragraph.</p>\
            <p>Second paragraph.</p>\
            <p>Third paragraph.</p>\
            </body></html>";
        assert_eq!(
            clean_paragraph_text(html),
            "First paragraph. Second paragraph. Third paragraph."
        );
    }

    #[test]
    fn collapses_internal_whitespace() {
        let html = "<p>Spaced   out\n\ttext</p><p>  padded  </p>";
        let text = clean_paragraph_text(html);
        assert_eq!(text, "Spaced out text padded");
        assert!(!text.chars().zip(text.chars().skip(1)).any(|(a, b)| {
            a.is_whitespace() && b.is_whitespace()
        }));
    }

    #[test]
    fn preserves_paragraph_order() {
        let html = "<p>one</p><div><p>two</p></div><p>three</p>";
        assert_eq!(clean_paragraph_text(html), "one two three");
    }

    #[test]
    fn includes_nested_inline_text() {
        let html = "<p>Hello <a href=\"/x\">linked <b>world</b></a>!</p>";
        assert_eq!(clean_paragraph_text(html), "Hello linked world!");
    }

    #[test]
    fn ignores_non_paragraph_markup() {
        let html = "<html><body><h1>Title</h1><div>sidebar</div>\
            <script>var x = 1;</script></body></html>";
        assert_eq!(clean_paragraph_text(html), "");
    }

    #[test]
    fn empty_paragraphs_do_not_leave_extra_spaces() {
        let html = "<p>one</p><p>   </p><p>two</p>";
        assert_eq!(clean_paragraph_text(html), "one two");
    }
}
