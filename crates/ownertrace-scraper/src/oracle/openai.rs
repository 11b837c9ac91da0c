use std::time::Duration;

use async_trait::async_trait;
use ownertrace_core::{PersonName, PhoneLabel};
use serde::{Deserialize, Serialize};

use super::{NameExtractor, PhoneClassifier, SemanticOracle};
use crate::error::ScraperError;

const COMPARE_SYSTEM_PROMPT: &str = "You are an assistant that compares two names or addresses. \
Only respond with \"true\" or \"false\".";

const CLASSIFY_SYSTEM_PROMPT: &str = "You are an assistant that knows US phone line types. \
Only respond with Wireless, Landline or Unknown.";

const NAME_SYSTEM_PROMPT: &str = "You are an assistant skilled at finding the first and last name \
of a person in a given string.";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
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
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI chat-completions client implementing the oracle traits.
#[derive(Clone)]
pub struct OpenAiOracle {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl OpenAiOracle {
    /// `base_url` is the API root, e.g. `https://api.openai.com/v1`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_owned(),
            model: model.to_owned(),
        })
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, ScraperError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|source| ScraperError::Deserialize {
                context: "chat completion".to_string(),
                source,
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_owned())
            .ok_or_else(|| ScraperError::Oracle("completion returned no content".to_string()))
    }
}

impl std::fmt::Debug for OpenAiOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiOracle")
            .field("url", &self.url)
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// Reads `First name: X` / `Last name: Y` lines from a completion.
fn parse_name_reply(answer: &str) -> Option<PersonName> {
    let mut first = None;
    let mut last = None;
    for line in answer.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().trim_matches(|c: char| c == '"' || c == '.');
        if value.is_empty() {
            continue;
        }
        let key = key.to_ascii_lowercase();
        if key.contains("first") {
            first.get_or_insert_with(|| value.to_owned());
        } else if key.contains("last") {
            last.get_or_insert_with(|| value.to_owned());
        }
    }
    let name = PersonName::new(first.as_deref(), last.as_deref());
    (!name.is_empty()).then_some(name)
}

#[async_trait]
impl SemanticOracle for OpenAiOracle {
    async fn same_entity(&self, a: &str, b: &str) -> Result<bool, ScraperError> {
        let prompt = format!(
            "Do \"{a}\" and \"{b}\" refer to the same person or address? Reply only with true or false."
        );
        let answer = self.complete(COMPARE_SYSTEM_PROMPT, &prompt).await?;
        match answer.to_ascii_lowercase().trim_end_matches('.') {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(ScraperError::Oracle(format!(
                "expected true or false, got {other:?}"
            ))),
        }
    }
}

#[async_trait]
impl PhoneClassifier for OpenAiOracle {
    async fn classify(&self, number: &str) -> Result<PhoneLabel, ScraperError> {
        let prompt = format!(
            "Is the US phone number {number} a Wireless or a Landline number? \
Reply with exactly one word: Wireless, Landline or Unknown."
        );
        let answer = self.complete(CLASSIFY_SYSTEM_PROMPT, &prompt).await?;
        Ok(PhoneLabel::parse(answer.trim_end_matches('.')).unwrap_or(PhoneLabel::Unknown))
    }

    async fn classify_batch(&self, numbers: &[String]) -> Result<Vec<String>, ScraperError> {
        if numbers.is_empty() {
            return Ok(Vec::new());
        }
        let prompt = format!(
            "Classify each phone number below as Wireless, Landline or Unknown. \
Answer with one line per number in the form \"(AAA) BBB-CCCC - Label\". \
Skip anything that is not a valid 10-digit US number.\n\n{}",
            numbers.join("\n")
        );
        let answer = self.complete(CLASSIFY_SYSTEM_PROMPT, &prompt).await?;
        Ok(answer
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect())
    }
}

#[async_trait]
impl NameExtractor for OpenAiOracle {
    async fn extract_name(&self, raw: &str) -> Result<PersonName, ScraperError> {
        let prompt = format!(
            "From the following string, extract the first name and last name. \
Leave out titles and special characters. Answer in two lines, \
\"First name: ...\" and \"Last name: ...\".\n\"{raw}\""
        );
        let answer = self.complete(NAME_SYSTEM_PROMPT, &prompt).await?;
        parse_name_reply(&answer)
            .ok_or_else(|| ScraperError::Oracle(format!("no name found in {answer:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_reply_reads_labelled_lines() {
        let name = parse_name_reply("First name: John\nLast name: Doe").unwrap();
        assert_eq!(name, PersonName::new(Some("John"), Some("Doe")));
    }

    #[test]
    fn name_reply_tolerates_noise_and_missing_half() {
        let name = parse_name_reply("Sure!\nLast Name: \"Lopez\".").unwrap();
        assert_eq!(name.first, None);
        assert_eq!(name.last.as_deref(), Some("Lopez"));
        assert!(parse_name_reply("I cannot tell.").is_none());
    }
}
