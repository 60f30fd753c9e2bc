//! Server-Sent Events のデコードとチャンク連結
//!
//! ストリーム応答は `data: {json}` 行の列で、`data: [DONE]` で終わる。
//! バイト列の途中で行やUTF-8文字が分割されても正しく扱う。

use crate::error::{Result, RoiRelabelError};
use serde::Deserialize;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Data(String),
    Done,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// 受信バイト列を追加し、完結した行のイベントを返す
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = parse_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// 末尾の改行なし行を処理
    pub fn finish(&mut self) -> Vec<SseEvent> {
        let line = std::mem::take(&mut self.buffer);
        parse_line(&line).into_iter().collect()
    }
}

fn parse_line(line: &[u8]) -> Option<SseEvent> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim_end_matches(['\r', '\n']);

    // ":" で始まるコメント行（keep-alive）や event: 行は無視
    let data = text.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);

    match data.trim() {
        "" => None,
        "[DONE]" => Some(SseEvent::Done),
        _ => Some(SseEvent::Data(data.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

/// ストリームチャンクの連結
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    content: String,
    reasoning_chars: usize,
    done: bool,
}

impl StreamAccumulator {
    pub fn apply(&mut self, event: SseEvent) -> Result<()> {
        let data = match event {
            SseEvent::Done => {
                self.done = true;
                return Ok(());
            }
            SseEvent::Data(data) => data,
        };

        let chunk: StreamChunk = serde_json::from_str(&data).map_err(|e| {
            RoiRelabelError::ApiParse(format!("ストリームチャンク: {}: {}", e, data))
        })?;

        if let Some(error) = chunk.error {
            return Err(RoiRelabelError::ApiCall(format!("ストリームエラー: {}", error)));
        }

        if let Some(choice) = chunk.choices.first() {
            if let Some(reasoning) = &choice.delta.reasoning_content {
                self.reasoning_chars += reasoning.chars().count();
                trace!("reasoning: {}", reasoning);
            }
            if let Some(content) = &choice.delta.content {
                self.content.push_str(content);
            }
        }

        Ok(())
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn reasoning_chars(&self) -> usize {
        self.reasoning_chars
    }

    pub fn into_content(self) -> String {
        self.content
    }
}
