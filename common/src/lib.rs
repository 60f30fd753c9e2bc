//! ROI Relabel Common Library
//!
//! CLIとライブラリ利用者で共有される型・プロンプト・パーサー

pub mod types;
pub mod error;
pub mod protocol;
pub mod prompts;
pub mod parser;
pub mod export;

pub use types::{AnatomicalSite, ChatMessage, Classification, FileResult, RelabelEntry, RoiCategory};
pub use error::{Error, Result};
pub use prompts::{
    build_classification_messages, build_relabel_messages, build_site_messages, format_name_list,
};
pub use parser::{
    extract_braced, extract_json_object, parse_classification, parse_name_list, parse_relabel,
    parse_site, strip_reasoning, ParsedClassification,
};
