//! Inbound message handlers: the boundary the platform adapters speak to.
//!
//! Whatever goes wrong inside, the reply is an apologetic message, not a
//! 5xx — one bad message must never wedge a conversation.

use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ai;
use crate::confirm::ConvKey;
use crate::error::CrmError;
use crate::prompts;
use crate::AppState;

const GENERIC_APOLOGY: &str = "Sorry, I couldn't process that message.";
const VOICE_APOLOGY: &str =
    "Sorry, I couldn't make out that voice memo. Please try again or send it as text.";
const IMAGE_APOLOGY: &str = "Couldn't process that image.";

#[derive(Deserialize)]
pub(super) struct TextMessage {
    channel: String,
    user: String,
    text: String,
}

#[derive(Deserialize)]
pub(super) struct VoiceMessage {
    channel: String,
    user: String,
    audio_b64: String,
    /// Container format of the recording, e.g. "ogg" or "mp3".
    #[serde(default = "default_audio_format")]
    format: String,
}

fn default_audio_format() -> String {
    "ogg".into()
}

#[derive(Deserialize)]
pub(super) struct ImageMessage {
    channel: String,
    user: String,
    image_b64: String,
}

#[derive(Serialize)]
pub(super) struct Replies {
    replies: Vec<String>,
}

async fn run_text(state: &AppState, key: &ConvKey, text: &str) -> Replies {
    match state
        .orchestrator
        .handle_message(state.ai.as_ref(), key, text)
        .await
    {
        Ok(replies) => Replies { replies },
        Err(e @ CrmError::AiNotConfigured) => Replies {
            replies: vec![e.to_string()],
        },
        Err(e) => {
            warn!(channel = %key.channel, error = %e, "message handling failed");
            Replies {
                replies: vec![GENERIC_APOLOGY.to_string()],
            }
        }
    }
}

pub(super) async fn inbound_text(
    State(state): State<AppState>,
    Json(msg): Json<TextMessage>,
) -> Json<Replies> {
    let key = ConvKey::new(msg.channel, msg.user);
    Json(run_text(&state, &key, &msg.text).await)
}

pub(super) async fn inbound_voice(
    State(state): State<AppState>,
    Json(msg): Json<VoiceMessage>,
) -> Json<Replies> {
    let key = ConvKey::new(msg.channel, msg.user);

    let Some(ref cfg) = state.ai else {
        return Json(Replies {
            replies: vec![CrmError::AiNotConfigured.to_string()],
        });
    };

    let audio = match BASE64.decode(msg.audio_b64.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(channel = %key.channel, error = %e, "voice payload not valid base64");
            return Json(Replies {
                replies: vec![VOICE_APOLOGY.to_string()],
            });
        }
    };

    // The record is never created on a failed transcription; the user is
    // invited to retry or type it out.
    let transcript = match ai::transcribe(cfg, audio, &msg.format).await {
        Ok(text) => text,
        Err(e) => {
            warn!(channel = %key.channel, error = %e, "transcription failed");
            return Json(Replies {
                replies: vec![VOICE_APOLOGY.to_string()],
            });
        }
    };

    Json(run_text(&state, &key, &transcript).await)
}

pub(super) async fn inbound_image(
    State(state): State<AppState>,
    Json(msg): Json<ImageMessage>,
) -> Json<Replies> {
    let key = ConvKey::new(msg.channel, msg.user);

    let Some(ref cfg) = state.ai else {
        return Json(Replies {
            replies: vec![CrmError::AiNotConfigured.to_string()],
        });
    };

    let described =
        match ai::vision_extract(cfg, prompts::IMAGE_EXTRACT_PROMPT, &msg.image_b64).await {
            Ok(text) => text,
            Err(e) => {
                warn!(channel = %key.channel, error = %e, "image extraction failed");
                return Json(Replies {
                    replies: vec![IMAGE_APOLOGY.to_string()],
                });
            }
        };

    Json(run_text(&state, &key, &described).await)
}
