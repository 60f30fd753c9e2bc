//! OpenAI互換 chat/completions クライアント（ストリーミング）

use super::sse::{SseDecoder, StreamAccumulator};
use super::ChatModel;
use crate::config::Config;
use crate::error::{Result, RoiRelabelError};
use roi_relabel_common::ChatMessage;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    top_p: f32,
    stream: bool,
}

/// ベースURLから chat/completions エンドポイントを組み立てる
pub fn chat_completions_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else {
        format!("{}/chat/completions", base)
    }
}

pub struct OpenAiCompatClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    top_p: f32,
}

impl OpenAiCompatClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            endpoint: chat_completions_url(&config.base_url),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ChatModel for OpenAiCompatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            top_p: self.top_p,
            stream: true,
        };

        let mut response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RoiRelabelError::ApiCall(format!(
                "{} failed with status {}: {}",
                self.endpoint, status, body
            )));
        }

        let mut decoder = SseDecoder::default();
        let mut acc = StreamAccumulator::default();

        while let Some(bytes) = response.chunk().await? {
            for event in decoder.push(&bytes) {
                acc.apply(event)?;
            }
            if acc.is_done() {
                break;
            }
        }
        for event in decoder.finish() {
            acc.apply(event)?;
        }

        debug!(
            "応答完了 (model: {}, reasoning: {} chars, done: {})",
            self.model,
            acc.reasoning_chars(),
            acc.is_done()
        );

        Ok(acc.into_content())
    }
}
