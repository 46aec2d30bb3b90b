use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::domain::{FrameworkKind, Orientation, Subject};
use super::generation::{GenerationClient, GenerationError, GenerationRequest};
use super::taxonomy::{OPPORTUNITY_CATEGORIES, MAX_GENERATED_PER_CATEGORY};
use crate::config::GenerationConfig;

const SYSTEM_PROMPT: &str = "You are a climate risk analyst. Respond with a single JSON object \
     using exactly the fields requested and no surrounding prose.";

/// Generation collaborator backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiGenerationClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiGenerationClient {
    pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| GenerationError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete_json(&self, prompt: String) -> Result<Value, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::NotConfigured)?;
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        debug!(model = %self.model, "sending chat completion request");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(status_error(status, message));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|err| GenerationError::InvalidResponse(err.to_string()))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        parse_content(&content)
    }
}

#[async_trait]
impl GenerationClient for OpenAiGenerationClient {
    async fn assess(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        self.complete_json(assessment_prompt(request)?).await
    }

    async fn opportunity_subcategories(&self, subject: &Subject) -> Result<Value, GenerationError> {
        self.complete_json(opportunity_prompt(subject)?).await
    }
}

fn assessment_prompt(request: &GenerationRequest) -> Result<String, GenerationError> {
    let context = serde_json::to_string_pretty(request)
        .map_err(|err| GenerationError::InvalidRequest(err.to_string()))?;
    let score_fields = request
        .framework
        .metrics(request.orientation)
        .iter()
        .map(|metric| format!("\"{}\" (integer 1-5)", metric.score_field()))
        .collect::<Vec<_>>()
        .join(", ");
    let ranking_fields = request
        .framework
        .metrics(request.orientation)
        .iter()
        .map(|metric| format!("\"{}\"", metric.ranking_field()))
        .collect::<Vec<_>>()
        .join(", ");
    let composite = match request.framework {
        FrameworkKind::Standard => "",
        FrameworkKind::Advanced => "\"overallRisk\" (number 0-5), ",
    };
    let subject_role = match request.orientation {
        Orientation::Risk => "risk",
        Orientation::Opportunity => "opportunity",
    };

    Ok(format!(
        "Assess the following climate {subject_role} for the subject described below.\n\
         Context:\n{context}\n\n\
         Return a JSON object with: {score_fields}, {composite}\
         \"narrative\" (string), \"reasoning\" (string), \
         \"peerComparison\" {{\"peers\": up to 5 peer names, \"rankings\": {{{ranking_fields}}} \
         each an integer 1-6, \"rationale\": string}}, and \"sources\": up to 4 objects \
         with \"title\", \"url\", \"organization\", \"relevance\"."
    ))
}

fn opportunity_prompt(subject: &Subject) -> Result<String, GenerationError> {
    let context = serde_json::to_string_pretty(subject)
        .map_err(|err| GenerationError::InvalidRequest(err.to_string()))?;
    let categories = OPPORTUNITY_CATEGORIES
        .iter()
        .map(|category| format!("\"{category}\""))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "Identify climate opportunities for the subject described below.\n\
         Context:\n{context}\n\n\
         Return a JSON object whose keys are {categories} and whose values are arrays of \
         exactly {MAX_GENERATED_PER_CATEGORY} specific opportunity subcategory names."
    ))
}

fn parse_content(content: &str) -> Result<Value, GenerationError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(trimmed).map_err(|err| GenerationError::InvalidResponse(err.to_string()))
}

fn transport_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Transport(err.to_string())
    }
}

fn status_error(status: StatusCode, message: String) -> GenerationError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Authentication,
        StatusCode::TOO_MANY_REQUESTS if message.contains("insufficient_quota") => {
            GenerationError::QuotaExhausted
        }
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GenerationError::Timeout,
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            GenerationError::InvalidRequest(message)
        }
        _ => GenerationError::Upstream {
            status: status.as_u16(),
            message,
        },
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
