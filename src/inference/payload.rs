use crate::config::InferenceSettings;
use crate::transcript::{Role, Transcript};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub max_tokens: u32,
    pub temperature: f64,
}

impl From<&InferenceSettings> for GenerationConfig {
    fn from(settings: &InferenceSettings) -> Self {
        Self {
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TextBlock<'a> {
    pub text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestMessage<'a> {
    pub role: Role,
    pub content: Vec<TextBlock<'a>>,
}

/// Body of an `invoke` call: every turn as a single-text-block message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeRequest<'a> {
    pub messages: Vec<RequestMessage<'a>>,
    pub inference_config: GenerationConfig,
}

pub fn build_invoke_request(transcript: &Transcript, config: GenerationConfig) -> InvokeRequest<'_> {
    InvokeRequest {
        messages: transcript
            .iter()
            .map(|turn| RequestMessage {
                role: turn.role(),
                content: vec![TextBlock {
                    text: turn.content(),
                }],
            })
            .collect(),
        inference_config: config,
    }
}
