//! 言語モデル呼び出し
//!
//! パイプラインは `ChatModel` だけに依存する。実装は OpenAI互換API（DeepSeek等）。

mod openai;
pub mod sse;

pub use openai::{chat_completions_url, OpenAiCompatClient};

use crate::error::Result;
use roi_relabel_common::ChatMessage;

/// チャット補完（ストリームを最後まで連結したテキストを返す）
#[allow(async_fn_in_trait)]
pub trait ChatModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}
