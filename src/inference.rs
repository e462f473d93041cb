pub mod client;
pub mod output_parse;
pub mod payload;

pub use client::{InferenceClient, ENDPOINT_ENV};
pub use output_parse::parse_reply;
pub use payload::{build_invoke_request, GenerationConfig, InvokeRequest};

pub const ERROR_REPLY_PREFIX: &str = "⚠️ Error: ";

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("missing credentials: environment variable `{0}` is not set")]
    MissingCredentials(String),
    #[error("failed to encode inference request: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("inference request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("model `{model_id}` responded with status {status}: {body}")]
    Status {
        model_id: String,
        status: u16,
        body: String,
    },
    #[error("malformed inference response: {0}")]
    MalformedResponse(String),
    #[error("inference worker stopped before replying")]
    WorkerStopped,
}

/// Text recorded as the assistant turn when a request fails.
pub fn error_reply(err: &InferenceError) -> String {
    format!("{ERROR_REPLY_PREFIX}{err}")
}

pub fn is_error_reply(content: &str) -> bool {
    content.starts_with(ERROR_REPLY_PREFIX)
}
