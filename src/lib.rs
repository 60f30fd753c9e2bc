//! roi-relabel
//!
//! 放射線治療ストラクチャセット（RTSTRUCT）のROI名を抽出し、
//! 言語モデルで部位判定・カテゴリ分類・名称標準化を行って表に出力する。

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod rtstruct;
pub mod scanner;
