use reqwest::{Client, Url};
use scraper::{Html, Node, Selector};
use once_cell::sync::Lazy;
use crate::error::{AppError, Result};

// Create static selectors to avoid recompiling them each time
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("body").expect("Failed to parse body selector")
});

const SKIPPED_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Only plain `http`/`https` sources are scraped.
pub fn validate_source(source: &str) -> Result<Url> {
    let url = Url::parse(source)
        .map_err(|e| AppError::FetchError(format!("Invalid URL '{}': {}", source, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(AppError::FetchError(format!(
            "URL scheme '{}' is not supported (only http/https)",
            scheme
        ))),
    }
}

pub async fn fetch_html(client: &Client, url: Url) -> Result<String> {
    let response = client.get(url.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::FetchError(format!("HTTP {} for {}", status.as_u16(), url)));
    }

    let html = response.text().await?;
    Ok(html)
}

/// Visible text of `<body>`, one text node per line.
///
/// Script, style and similar non-content nodes are dropped. Returns `None`
/// when the document has no body element.
pub fn extract_body_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let body = document.select(&BODY_SELECTOR).next()?;

    let mut text = String::new();
    for node in body.descendants() {
        let Node::Text(chunk) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| SKIPPED_TAGS.contains(&el.name()))
        });
        if !hidden {
            text.push_str(chunk);
            text.push('\n');
        }
    }

    Some(text)
}

pub fn collapse_lines(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last_was_whitespace = true;

    for line in text.lines() {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            if !last_was_whitespace {
                result.push('\n');
            }
            result.push_str(trimmed);
            last_was_whitespace = false;
        }
    }

    result
}

/// Cuts `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn build_prompt(user_prompt: &str, source: &str, content: &str) -> String {
    let mut result = String::with_capacity(content.len() + user_prompt.len() + source.len() + 400);
    result.push_str("You are a website scraper. Below is the text content of the page at ");
    result.push_str(source);
    result.push_str(".\n\nAnswer the following request using only information found on the page:\n");
    result.push_str(user_prompt);
    result.push_str("\n\nRespond with a single valid JSON object and nothing else. ");
    result.push_str("If the page does not contain the requested information, respond with {\"content\": \"NA\"}.\n\n");
    result.push_str("Page content:\n");
    result.push_str(content);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::spawn_server;
    use axum::{http::StatusCode, routing::get, Router};

    #[test]
    fn accepts_http_and_https() {
        assert!(validate_source("https://example.com/a?b=c").is_ok());
        assert!(validate_source("http://example.com").is_ok());
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        let err = validate_source("file:///etc/passwd").unwrap_err();
        assert!(err.to_string().contains("not supported"));
        assert!(matches!(validate_source("not a url"), Err(AppError::FetchError(_))));
    }

    #[tokio::test]
    async fn fetch_returns_page_body() {
        let app = Router::new().route("/page", get(|| async { "<html><body>ok</body></html>" }));
        let base = spawn_server(app).await;

        let url = validate_source(&format!("{}/page", base)).unwrap();
        let html = fetch_html(&Client::new(), url).await.unwrap();
        assert!(html.contains("<body>ok</body>"));
    }

    #[tokio::test]
    async fn fetch_maps_non_success_status_to_fetch_error() {
        let app = Router::new().route("/gone", get(|| async { (StatusCode::NOT_FOUND, "nope") }));
        let base = spawn_server(app).await;

        let url = validate_source(&format!("{}/gone", base)).unwrap();
        let err = fetch_html(&Client::new(), url).await.unwrap_err();
        assert!(matches!(err, AppError::FetchError(_)));
        assert!(err.to_string().contains("HTTP 404"));
    }

    #[test]
    fn body_text_skips_scripts_and_styles() {
        let html = r#"<html><head><title>T</title></head><body>
            <h1>Hello</h1>
            <script>var secret = 1;</script>
            <style>.x { color: red }</style>
            <p>World <b>bold</b></p>
        </body></html>"#;

        let text = collapse_lines(&extract_body_text(html).unwrap());
        assert_eq!(text, "Hello\nWorld\nbold");
    }

    #[test]
    fn head_text_is_not_included() {
        let html = "<html><head><title>Only in head</title></head><body><p>Body</p></body></html>";
        let text = extract_body_text(html).unwrap();
        assert!(!text.contains("Only in head"));
        assert!(text.contains("Body"));
    }

    #[test]
    fn collapse_drops_blank_lines() {
        assert_eq!(collapse_lines("\n  a  \n\n\t\n b\n"), "a\nb");
        assert_eq!(collapse_lines("   "), "");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn prompt_contains_request_source_and_content() {
        let prompt = build_prompt("List the titles", "https://example.com", "Title one");
        assert!(prompt.contains("List the titles"));
        assert!(prompt.contains("https://example.com"));
        assert!(prompt.ends_with("Title one"));
        assert!(prompt.contains("JSON"));
    }
}
