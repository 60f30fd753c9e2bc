//! モデル出力パーサー
//!
//! 推論モデルのストリーム出力（連結済みテキスト）から
//! 部位・分類・標準化結果を取り出す。
//! 出力形式は保証されないため、いずれも寛容に解釈する。

use crate::error::{Error, Result};
use crate::types::{AnatomicalSite, Classification, RelabelEntry, RoiCategory};
use regex::Regex;
use serde_json::{Map, Value};

/// 推論区間の終端マーカー
pub const REASONING_END_MARKER: &str = "</think>";

/// 推論区間を除去
///
/// `</think>` が含まれていれば最初の出現より後ろを、
/// なければ全体を返す（いずれも前後の空白を除去）。
///
/// # Examples
/// ```
/// use roi_relabel_common::strip_reasoning;
///
/// assert_eq!(strip_reasoning("<think>hmm</think>\n lung "), "lung");
/// assert_eq!(strip_reasoning(" breast\n"), "breast");
/// ```
pub fn strip_reasoning(text: &str) -> &str {
    match text.find(REASONING_END_MARKER) {
        Some(idx) => text[idx + REASONING_END_MARKER.len()..].trim(),
        None => text.trim(),
    }
}

/// 最初の `{` と最初の `}` の間を抽出
///
/// どちらかが見つからない場合は全体を、`}` が `{` より前にある場合は空文字列を返す。
pub fn extract_braced(text: &str) -> &str {
    match (text.find('{'), text.find('}')) {
        (Some(start), Some(end)) if end > start => text[start + 1..end].trim(),
        (Some(_), Some(_)) => "",
        _ => text.trim(),
    }
}

/// レスポンスからJSONオブジェクト部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 最初の `{` から最後の `}` まで
/// 3. エラー
pub fn extract_json_object(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end > start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSONオブジェクトが見つかりません".into()))
}

/// 部位テキストから5部位のいずれかを判定
///
/// 大文字小文字を無視した単語一致で、最も先に現れた部位を採用する。
pub fn parse_site(text: &str) -> Option<AnatomicalSite> {
    lazy_static::lazy_static! {
        static ref SITE_RE: Regex =
            Regex::new(r"(?i)\b(nasopharynx|breast|lung|rectum|cervix)\b").unwrap();
    }

    let found = SITE_RE.captures(text)?;
    let label = found[1].to_lowercase();
    AnatomicalSite::ALL.into_iter().find(|s| s.label() == label)
}

/// 分類結果（出力用テキストと構造化結果）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedClassification {
    /// 波括弧内のテキスト（CSVにそのまま出力）
    pub text: String,
    pub classification: Classification,
}

/// Step2レスポンスをパース
///
/// 1. 推論区間を除去し、最初の波括弧内を取り出す
/// 2. JSONオブジェクトとして読めればそれを使う
/// 3. 読めなければ行ごとに最初の `:` で分割する
///
/// `:` を含まない空でない行はパースエラー。未知のキーは無視する。
pub fn parse_classification(response: &str) -> Result<ParsedClassification> {
    let text = extract_braced(strip_reasoning(response));

    let classification = match parse_classification_json(text) {
        Some(classification) => classification,
        None => parse_classification_lines(text)?,
    };

    Ok(ParsedClassification {
        text: text.to_string(),
        classification,
    })
}

fn parse_classification_json(text: &str) -> Option<Classification> {
    let object: Map<String, Value> = serde_json::from_str(&format!("{{{}}}", text)).ok()?;

    let mut classification = Classification::default();
    for (key, value) in object {
        let Some(category) = RoiCategory::from_label(&key) else {
            continue;
        };
        let names = match value {
            Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Value::String(s) => parse_name_list(&s),
            _ => Vec::new(),
        };
        classification.set(category, names);
    }
    Some(classification)
}

fn parse_classification_lines(text: &str) -> Result<Classification> {
    let mut classification = Classification::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| Error::Parse(format!("区切り文字 ':' がありません: {}", line)))?;

        let key = key.trim().trim_matches('"');
        let value = value.trim().trim_matches('"').trim_matches(',');

        if let Some(category) = RoiCategory::from_label(key) {
            classification.set(category, parse_name_list(value));
        }
    }

    Ok(classification)
}

/// ROI名リスト文字列をパース
///
/// JSON文字列配列として読めなければ、角括弧を外してカンマ区切りで分割する。
pub fn parse_name_list(value: &str) -> Vec<String> {
    let value = value.trim().trim_end_matches(',').trim();

    if let Ok(list) = serde_json::from_str::<Vec<String>>(value) {
        return list
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    value
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|s| s.trim().trim_matches('"').trim_matches('\'').trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Step3レスポンスを構造化（ベストエフォート）
///
/// 対応形式:
/// - `{"Target Volume": {"Input": [...], "Relabeled": [...]}}`
/// - `{"Target Volume": {"元の名前": "標準名"}}`
///
/// 解釈できない場合は空のVecを返す。
pub fn parse_relabel(response: &str) -> Vec<RelabelEntry> {
    let body = strip_reasoning(response);
    let Ok(json_str) = extract_json_object(body) else {
        return Vec::new();
    };
    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(json_str) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for (key, value) in &object {
        let category = RoiCategory::from_label(key)
            .map(|c| c.label().to_string())
            .unwrap_or_else(|| key.clone());

        let Value::Object(inner) = value else {
            continue;
        };

        let inputs = string_array_field(inner, "input");
        let relabeled = string_array_field(inner, "relabeled");

        if let (Some(inputs), Some(relabeled)) = (inputs, relabeled) {
            for (input, output) in inputs.into_iter().zip(relabeled) {
                entries.push(RelabelEntry {
                    category: category.clone(),
                    input,
                    relabeled: output,
                });
            }
        } else {
            for (input, output) in inner {
                if let Some(output) = output.as_str() {
                    entries.push(RelabelEntry {
                        category: category.clone(),
                        input: input.clone(),
                        relabeled: output.to_string(),
                    });
                }
            }
        }
    }

    entries
}

fn string_array_field(object: &Map<String, Value>, name: &str) -> Option<Vec<String>> {
    object
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .and_then(|(_, v)| v.as_array())
        .map(|items| {
            items
                .iter()
                .map(|v| match v.as_str() {
                    Some(s) => s.to_string(),
                    None => v.to_string(),
                })
                .collect()
        })
}
