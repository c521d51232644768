//! Talks to OpenAI-compatible APIs for extraction, transcription and vision.
//! All optional — see AiConfig::from_env().

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CrmError;

fn ai_err(msg: impl Into<String>) -> CrmError {
    CrmError::AiBackend(msg.into())
}

const AI_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct AiConfig {
    pub llm_url: String,
    pub llm_key: String,
    pub llm_model: String,
    pub transcribe_url: String,
    pub transcribe_model: String,
    pub vision_model: String,
    pub client: reqwest::Client,
}

impl AiConfig {
    /// Returns `None` if `ROLODEX_LLM_URL` is not set.
    pub fn from_env() -> Option<Self> {
        let llm_url = std::env::var("ROLODEX_LLM_URL").ok()?;
        let llm_key = std::env::var("ROLODEX_LLM_KEY").unwrap_or_default();
        let llm_model =
            std::env::var("ROLODEX_LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        let transcribe_url = std::env::var("ROLODEX_TRANSCRIBE_URL").unwrap_or_else(|_| {
            // Only rewrite if this looks like a chat completions endpoint
            if llm_url.contains("/chat/completions") {
                llm_url.replace("/chat/completions", "/audio/transcriptions")
            } else {
                format!("{}/audio/transcriptions", llm_url.trim_end_matches('/'))
            }
        });
        let transcribe_model = std::env::var("ROLODEX_TRANSCRIBE_MODEL")
            .unwrap_or_else(|_| "gpt-4o-mini-transcribe".into());
        let vision_model =
            std::env::var("ROLODEX_VISION_MODEL").unwrap_or_else(|_| llm_model.clone());

        let client = reqwest::Client::builder()
            .timeout(AI_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Some(Self {
            llm_url,
            llm_key,
            llm_model,
            transcribe_url,
            transcribe_model,
            vision_model,
            client,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

async fn chat(cfg: &AiConfig, model: &str, messages: Vec<ChatMessage>) -> Result<String, CrmError> {
    let req = ChatRequest {
        model: model.to_string(),
        messages,
        temperature: 0.0,
    };

    let mut builder = cfg.client.post(&cfg.llm_url).json(&req);
    if !cfg.llm_key.is_empty() {
        builder = builder.header("Authorization", format!("Bearer {}", cfg.llm_key));
    }

    let resp = builder
        .send()
        .await
        .map_err(|e| ai_err(format!("LLM request failed: {e}")))?;
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(ai_err(format!("LLM returned {status}: {body}")));
    }

    let parsed: ChatResponse = resp
        .json()
        .await
        .map_err(|e| ai_err(format!("LLM response parse failed: {e}")))?;
    Ok(parsed
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .unwrap_or_default())
}

/// Send a system + user chat completion, return the response text.
pub async fn llm_chat(cfg: &AiConfig, system: &str, user: &str) -> Result<String, CrmError> {
    let messages = vec![
        ChatMessage {
            role: "system".into(),
            content: system.into(),
        },
        ChatMessage {
            role: "user".into(),
            content: user.into(),
        },
    ];
    chat(cfg, &cfg.llm_model, messages).await
}

/// Describe a screenshot through the vision model: the instruction plus the
/// image as a data-URL content block. Returns whatever text the model emits;
/// the extractor parses it like any other output.
pub async fn vision_extract(
    cfg: &AiConfig,
    instruction: &str,
    image_b64: &str,
) -> Result<String, CrmError> {
    let content = serde_json::json!([
        { "type": "text", "text": instruction },
        { "type": "image_url",
          "image_url": { "url": format!("data:image/jpeg;base64,{image_b64}") } }
    ]);
    let messages = vec![ChatMessage {
        role: "user".into(),
        content,
    }];
    chat(cfg, &cfg.vision_model, messages).await
}

#[derive(Deserialize)]
struct TranscribeResponse {
    text: String,
}

/// Upload a voice memo to the transcription endpoint, return the transcript.
pub async fn transcribe(cfg: &AiConfig, audio: Vec<u8>, format: &str) -> Result<String, CrmError> {
    let tx_err = |msg: String| CrmError::Transcription(msg);

    let part = reqwest::multipart::Part::bytes(audio)
        .file_name(format!("memo.{format}"))
        .mime_str(&format!("audio/{format}"))
        .map_err(|e| tx_err(format!("bad audio format: {e}")))?;
    let form = reqwest::multipart::Form::new()
        .text("model", cfg.transcribe_model.clone())
        .part("file", part);

    let mut builder = cfg.client.post(&cfg.transcribe_url).multipart(form);
    if !cfg.llm_key.is_empty() {
        builder = builder.header("Authorization", format!("Bearer {}", cfg.llm_key));
    }

    let resp = builder
        .send()
        .await
        .map_err(|e| tx_err(format!("request failed: {e}")))?;
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(tx_err(format!("service returned {status}: {body}")));
    }

    let parsed: TranscribeResponse = resp
        .json()
        .await
        .map_err(|e| tx_err(format!("response parse failed: {e}")))?;
    Ok(parsed.text)
}
