//! One generation call against the configured backend.

use anyhow::{anyhow, Result};
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::generation::options::GenerationOptions;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use crate::{LLMClient, LLMParams, TARGET_LLM_REQUEST};

pub const LLM_TIMEOUT: Duration = Duration::from_secs(120);

/// Issue a single generation call and return every candidate completion it
/// produced. The OpenAI backend can sample several candidates per call via
/// `n`; Ollama always returns exactly one.
pub async fn generate_candidates(
    params: &LLMParams,
    system: &str,
    instruction: &str,
    candidates: u8,
) -> Result<Vec<String>> {
    debug!(target: TARGET_LLM_REQUEST, "Starting generation with model {}", params.model);

    match &params.llm_client {
        LLMClient::Ollama(ollama) => {
            let prompt = format!("{}\n\n{}", system, instruction);
            let mut request = GenerationRequest::new(params.model.clone(), prompt);
            request.options = Some(GenerationOptions::default().temperature(params.temperature));

            let response = timeout(LLM_TIMEOUT, ollama.generate(request))
                .await
                .map_err(|_| anyhow!("LLM request timed out after {}s", LLM_TIMEOUT.as_secs()))?
                .map_err(|e| anyhow!("Ollama generation failed: {}", e))?;

            Ok(vec![response.response])
        }
        LLMClient::OpenAI(client) => {
            let request = CreateChatCompletionRequestArgs::default()
                .model(params.model.as_str())
                .temperature(params.temperature)
                .n(candidates.max(1))
                .messages([
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(system)
                        .build()?
                        .into(),
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(instruction)
                        .build()?
                        .into(),
                ])
                .build()?;

            let response = timeout(LLM_TIMEOUT, client.chat().create(request))
                .await
                .map_err(|_| anyhow!("LLM request timed out after {}s", LLM_TIMEOUT.as_secs()))?
                .map_err(|e| anyhow!("OpenAI generation failed: {}", e))?;

            Ok(response
                .choices
                .into_iter()
                .filter_map(|choice| choice.message.content)
                .collect())
        }
    }
}
