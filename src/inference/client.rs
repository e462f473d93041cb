use crate::config::Settings;
use crate::inference::{
    build_invoke_request, error_reply, parse_reply, GenerationConfig, InferenceError,
};
use crate::transcript::Transcript;
use std::time::Duration;

/// Overrides the runtime endpoint base url, e.g. for a local proxy.
pub const ENDPOINT_ENV: &str = "SUGARCHAT_BEDROCK_ENDPOINT";

#[derive(Debug, Clone)]
pub struct InferenceClient {
    agent: ureq::Agent,
    endpoint: String,
    model_id: String,
    api_key_env: String,
    generation: GenerationConfig,
    timeout: Duration,
}

impl InferenceClient {
    pub fn new(settings: &Settings) -> Self {
        let endpoint = std::env::var(ENDPOINT_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| settings.endpoint_base());
        let timeout = Duration::from_secs(settings.inference.timeout_secs);
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            endpoint,
            model_id: settings.model_id.trim().to_string(),
            api_key_env: settings.api_key_env.trim().to_string(),
            generation: GenerationConfig::from(&settings.inference),
            timeout,
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn invoke_url(&self) -> String {
        format!(
            "{}/model/{}/invoke",
            self.endpoint,
            urlencoding::encode(&self.model_id)
        )
    }

    /// Never fails: any error becomes a visible placeholder reply.
    pub fn complete(&self, transcript: &Transcript) -> String {
        self.try_complete(transcript)
            .unwrap_or_else(|err| error_reply(&err))
    }

    pub fn try_complete(&self, transcript: &Transcript) -> Result<String, InferenceError> {
        let api_key = std::env::var(&self.api_key_env)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| InferenceError::MissingCredentials(self.api_key_env.clone()))?;
        let body = serde_json::to_string(&build_invoke_request(transcript, self.generation))
            .map_err(InferenceError::Encode)?;

        let url = self.invoke_url();
        let response = match self
            .agent
            .post(&url)
            .set("content-type", "application/json")
            .set("accept", "application/json")
            .set("authorization", &format!("Bearer {}", api_key.trim()))
            .send_string(&body)
        {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                return Err(InferenceError::Status {
                    model_id: self.model_id.clone(),
                    status,
                    body: response.into_string().unwrap_or_default().trim().to_string(),
                })
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(InferenceError::Transport {
                    url,
                    reason: transport.to_string(),
                })
            }
        };

        let raw = response
            .into_string()
            .map_err(|err| InferenceError::Transport {
                url: url.clone(),
                reason: format!("failed to read response body: {err}"),
            })?;
        parse_reply(&raw)
    }
}
