//! OpenAI chat-completions provider for the context oracle.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ContextOracle, DominantFocus, NarrativeContext, OracleError};

const ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(4);

const CONTEXT_SYSTEM_PROMPT: &str = "You extract narrative context from stories.\n\n\
Return ONLY a JSON object with these keys:\n\
- setting\n\
- tone\n\
- themes\n\n\
Rules:\n\
- Do NOT mention genres\n\
- Do NOT classify the story\n\
- Do NOT add explanations\n\
- Output JSON only\n";

const FOCUS_SYSTEM_PROMPT: &str = "You identify the DOMINANT narrative focus of a story snippet.\n\
Return ONLY one of these exact strings:\n\
- emotional_evolution (if focus is relationships, feelings, love)\n\
- technical_scientific (if focus is technology, physics, systems)\n\
- atmosphere (if focus is dread, setting, mood)\n\
- action_conflict (if focus is fighting, legal battles, spies)\n\n\
Rules:\n\
- Pick the single strongest driver.\n\
- Do NOT mention genres.\n\
- Output ONLY the label.\n";

pub struct OpenAiOracle {
    http: reqwest::Client,
    timeout: Duration,
    api_key: String,
    model: String,
}

impl OpenAiOracle {
    /// `timeout` bounds each HTTP request; it should match the handle's per-call timeout.
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Result<Self, OracleError> {
        let http = reqwest::Client::builder()
            .user_agent("fiction-genre-mapper/0.1")
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()?;
        let model = if model.trim().is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            model.to_string()
        };
        Ok(Self {
            http,
            timeout,
            api_key: api_key.to_string(),
            model,
        })
    }

    fn classify_transport(&self, err: reqwest::Error) -> OracleError {
        if err.is_timeout() {
            OracleError::Timeout(self.timeout)
        } else {
            OracleError::Transport(err)
        }
    }

    async fn chat(&self, system: &str, user: &str, temperature: f32) -> Result<String, OracleError> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: Option<String>,
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
        };

        let resp = self
            .http
            .post(ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        if !resp.status().is_success() {
            return Err(OracleError::Status(resp.status().as_u16()));
        }
        let body: Resp = resp.json().await.map_err(|e| self.classify_transport(e))?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .ok_or_else(|| OracleError::Malformed("no choices in response".into()))
    }
}

#[async_trait]
impl ContextOracle for OpenAiOracle {
    async fn extract_context(&self, text: &str) -> Result<NarrativeContext, OracleError> {
        let user = format!("Story: \"\"\"{text}\"\"\"\nExtract the setting, tone, and themes.");
        let content = self.chat(CONTEXT_SYSTEM_PROMPT, &user, 0.2).await?;
        parse_context(&content)
    }

    async fn dominant_focus(&self, text: &str) -> Result<DominantFocus, OracleError> {
        let user = format!("Story: \"\"\"{text}\"\"\"");
        let content = self.chat(FOCUS_SYSTEM_PROMPT, &user, 0.0).await?;
        Ok(DominantFocus::parse(&content))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

/// Parse the model's JSON reply. Missing keys become empty strings; string arrays are joined.
pub fn parse_context(content: &str) -> Result<NarrativeContext, OracleError> {
    let v: Value =
        serde_json::from_str(content).map_err(|e| OracleError::Malformed(e.to_string()))?;
    let obj = v
        .as_object()
        .ok_or_else(|| OracleError::Malformed("expected a JSON object".into()))?;

    let field = |key: &str| -> String {
        match obj.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            _ => String::new(),
        }
    };

    Ok(NarrativeContext {
        setting: field("setting"),
        tone: field("tone"),
        themes: field("themes"),
    })
}
