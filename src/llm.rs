use serde::{Deserialize, Serialize};
use reqwest::Client;
use crate::error::{Result, AppError};

const GROQ_PROVIDER_PREFIX: &str = "groq/";

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Model name as Groq's API expects it, without the `groq/` provider prefix.
pub fn provider_model(model: &str) -> &str {
    model.strip_prefix(GROQ_PROVIDER_PREFIX).unwrap_or(model)
}

/// Sends one chat completion to a Groq (OpenAI-compatible) endpoint and
/// returns the raw content of the first choice.
pub async fn call_groq(
    client: &Client,
    base_url: &str,
    api_key: &str,
    model: &str,
    prompt: &str,
) -> Result<String> {
    let body = ChatRequest {
        model: provider_model(model).to_string(),
        messages: vec![
            Message {
                role: "user".into(),
                content: prompt.into(),
            }
        ],
        temperature: 0.0,
        response_format: ResponseFormat {
            format_type: "json_object".into(),
        },
    };

    let res = client
        .post(format!("{}/chat/completions", base_url))
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                AppError::LlmError(format!("LLM request timeout: {}", e))
            } else {
                AppError::LlmError(format!("LLM request failed: {}", e))
            }
        })?;

    let status = res.status();
    if !status.is_success() {
        let text = res.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&text)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("HTTP {}: {}", status.as_u16(), text));
        return Err(AppError::LlmError(message));
    }

    let chat: ChatResponse = res
        .json()
        .await
        .map_err(|e| AppError::LlmError(format!("Invalid response format from LLM: {}", e)))?;

    chat.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AppError::LlmError("Empty response from LLM".to_string()))
}

/// Parses a completion as JSON, tolerating a surrounding Markdown code fence.
pub fn parse_completion(content: &str) -> Result<serde_json::Value> {
    let trimmed = strip_code_fence(content.trim());
    serde_json::from_str(trimmed).map_err(|e| {
        AppError::ParseError(format!("LLM returned invalid JSON: {}. Raw: {}", e, content))
    })
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.trim_end();
    let rest = rest.strip_suffix("```").unwrap_or(rest).trim();
    // Drop the info string (e.g. "json") after the opening fence, which may
    // sit on the same line as the payload.
    let info_len = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    match rest[info_len..].trim() {
        "" => rest,
        body => body,
    }
}
