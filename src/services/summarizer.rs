use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

pub const FALLBACK_ERROR: &str = "Could not shorten the data. Please edit manually.";

static THINKING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<think(?:ing)?>.*?</think(?:ing)?>").expect("valid thinking-block regex")
});

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("Could not reach the summarization service: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("Summarization service answered with status {0}")]
    Status(u16),

    #[error("{}", FALLBACK_ERROR)]
    Empty,
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError>;
}

/// `{"success": true, "data": {"summary": ...}}` or `{"success": false, "error": ...}`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SummaryResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SummaryData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SummaryData {
    pub summary: String,
}

impl From<Result<String, SummarizeError>> for SummaryResponse {
    fn from(result: Result<String, SummarizeError>) -> Self {
        match result {
            Ok(summary) => SummaryResponse {
                success: true,
                data: Some(SummaryData { summary }),
                error: None,
            },
            Err(e) => SummaryResponse {
                success: false,
                data: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Summarizes through a local Ollama server's `/api/generate`.
pub struct OllamaSummarizer {
    client: Client,
    base_url: String,
    model: String,
    max_chars: usize,
}

impl OllamaSummarizer {
    pub fn new(
        base_url: &str,
        model: &str,
        max_chars: usize,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            max_chars,
        })
    }

    pub async fn is_running(&self) -> bool {
        self.client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map(|res| res.status().is_success())
            .unwrap_or(false)
    }

    fn prompt(&self, text: &str) -> String {
        format!(
            r#"The following student record is too long to fit in a QR code.
Rewrite it as a shorter "Label: value" list of at most {} characters.

Rules:
- Keep the first line "Password: ..." exactly as it is.
- Keep the full name, roll number, contact details, course and department.
- Shorten or drop free-text fields such as hobbies and additional info first.
- Reply with the shortened record only, no commentary.

Record:
{}"#,
            self.max_chars, text
        )
    }
}

#[async_trait]
impl Summarizer for OllamaSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        info!(
            "Requesting summary from model {} for {} chars",
            self.model,
            text.chars().count()
        );

        let res = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&json!({
                "model": self.model,
                "prompt": self.prompt(text),
                "stream": false
            }))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            warn!("Summarization request failed with status {}", status);
            return Err(SummarizeError::Status(status.as_u16()));
        }

        let body: Value = res.json().await?;
        let raw = body["response"].as_str().unwrap_or_default();

        let summary = clean_model_output(raw);
        if summary.is_empty() {
            return Err(SummarizeError::Empty);
        }

        Ok(keep_password_line(text, summary))
    }
}

/// Drops `<think>` blocks and a surrounding code fence from model output.
pub fn clean_model_output(raw: &str) -> String {
    let without_thinking = THINKING.replace_all(raw, "");
    let trimmed = without_thinking.trim();

    for prefix in ["```text\n", "```markdown\n", "```\n"] {
        if let Some(inner) = trimmed
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix("```"))
        {
            return inner.trim().to_string();
        }
    }

    trimmed.to_string()
}

/// The viewer unlocks on the `Password:` line, so a summary must still carry it.
pub fn keep_password_line(original: &str, summary: String) -> String {
    let Some(password_line) = original.lines().next().filter(|l| l.starts_with("Password:")) else {
        return summary;
    };

    if summary.lines().any(|line| line == password_line) {
        summary
    } else {
        format!("{}\n{}", password_line, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_thinking_and_fences() {
        let raw = "<think>count the chars first</think>\n```text\nPassword: abc123\nFull Name: A\n```\n";
        assert_eq!(clean_model_output(raw), "Password: abc123\nFull Name: A");

        assert_eq!(clean_model_output("  plain  "), "plain");
        assert_eq!(clean_model_output("<thinking>\nhm\n</thinking>"), "");
    }

    #[test]
    fn prepends_password_line_when_model_drops_it() {
        let original = "Password: abc123\nFull Name: Santhosh A";

        assert_eq!(
            keep_password_line(original, "Full Name: Santhosh A".to_string()),
            "Password: abc123\nFull Name: Santhosh A"
        );
        assert_eq!(
            keep_password_line(original, "Password: abc123\nName: Santhosh".to_string()),
            "Password: abc123\nName: Santhosh"
        );
    }

    #[test]
    fn password_line_with_padding_is_not_duplicated() {
        let text = "Password:   secret12  \nFull Name: Santhosh A";

        let kept = keep_password_line(text, text.to_string());
        assert_eq!(kept, text);
        assert_eq!(kept.lines().filter(|l| l.starts_with("Password:")).count(), 1);
    }

    #[test]
    fn response_shape_matches_action_contract() {
        let ok = serde_json::to_value(SummaryResponse::from(Ok("short".to_string()))).unwrap();
        assert_eq!(ok, json!({ "success": true, "data": { "summary": "short" } }));

        let failed = serde_json::to_value(SummaryResponse::from(Err(SummarizeError::Empty))).unwrap();
        assert_eq!(failed, json!({ "success": false, "error": FALLBACK_ERROR }));
    }

    #[test]
    fn prompt_carries_limit_and_record() {
        let summarizer =
            OllamaSummarizer::new("http://127.0.0.1:11434/", "gemma3", 2000, None).unwrap();
        let prompt = summarizer.prompt("Password: abc123");

        assert!(prompt.contains("at most 2000 characters"));
        assert!(prompt.ends_with("Record:\nPassword: abc123"));
        assert_eq!(summarizer.base_url, "http://127.0.0.1:11434");
    }
}
