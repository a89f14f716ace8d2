//! Environment-derived configuration, loaded once at startup.
//!
//! The resulting [`Config`] is injected into the retriever and the
//! orchestrator rather than read ambiently, so the pipeline stays testable
//! without environment mutation.

use anyhow::Result;
use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use ollama_rs::Ollama;
use std::env;
use tracing::info;

use crate::LLMClient;

#[derive(Clone, Debug)]
pub struct Config {
    /// Port the HTTP server binds on.
    pub port: u16,
    /// Model identifier passed to the generation backend.
    pub model: String,
    /// Base sampling temperature; jittered per call by the orchestrator.
    pub base_temperature: f32,
    /// Candidates requested per generation call where the backend supports it.
    pub candidates_per_call: u8,
    /// Feed search endpoint queried in current mode.
    pub news_endpoint: String,
    /// Feed language hint (`hl`).
    pub news_language: String,
    /// Feed region hint (`gl`).
    pub news_region: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let model = env::var("SENRYU_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let base_temperature: f32 = env::var("LLM_TEMPERATURE")
            .unwrap_or_else(|_| "0.9".to_string())
            .parse()
            .unwrap_or(0.9);

        let candidates_per_call: u8 = env::var("LLM_CANDIDATES")
            .ok()
            .and_then(|n| n.parse().ok())
            .filter(|n| *n >= 1)
            .unwrap_or(1);

        let news_endpoint = env::var("NEWS_ENDPOINT")
            .unwrap_or_else(|_| "https://news.google.com/rss/search".to_string());
        let news_language = env::var("NEWS_LANGUAGE").unwrap_or_else(|_| "ja".to_string());
        let news_region = env::var("NEWS_REGION").unwrap_or_else(|_| "JP".to_string());

        Ok(Config {
            port,
            model,
            base_temperature,
            candidates_per_call,
            news_endpoint,
            news_language,
            news_region,
        })
    }

    /// The `ceid` pair expected by Google-News-style feed endpoints.
    pub fn news_ceid(&self) -> String {
        format!("{}:{}", self.news_region, self.news_language)
    }
}

/// Select the generation backend from the environment: OpenAI when an API key
/// is present, otherwise a local Ollama instance.
pub fn build_llm_client() -> Result<LLMClient> {
    if let Ok(api_key) = env::var("OPENAI_API_KEY") {
        let config = OpenAIConfig::new().with_api_key(api_key);
        return Ok(LLMClient::OpenAI(OpenAIClient::with_config(config)));
    }

    let host = env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port: u16 = env::var("OLLAMA_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(11434);

    info!("Connecting to Ollama at {}:{}", host, port);
    Ok(LLMClient::Ollama(Ollama::new(host, port)))
}
