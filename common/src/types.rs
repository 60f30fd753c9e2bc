//! 解析結果の型定義
//!
//! CLIとライブラリで共有される型:
//! - AnatomicalSite: Step1（部位判定）の出力
//! - Classification: Step2（カテゴリ分類）の出力
//! - RelabelEntry: Step3（名称標準化）の構造化ビュー
//! - FileResult: 1ファイル分の最終出力

use serde::{Deserialize, Serialize};
use std::fmt;

/// チャットメッセージ（OpenAI互換）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// 解剖学的部位（5種固定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnatomicalSite {
    Nasopharynx,
    Breast,
    Lung,
    Rectum,
    Cervix,
}

impl AnatomicalSite {
    pub const ALL: [AnatomicalSite; 5] = [
        AnatomicalSite::Nasopharynx,
        AnatomicalSite::Breast,
        AnatomicalSite::Lung,
        AnatomicalSite::Rectum,
        AnatomicalSite::Cervix,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AnatomicalSite::Nasopharynx => "nasopharynx",
            AnatomicalSite::Breast => "breast",
            AnatomicalSite::Lung => "lung",
            AnatomicalSite::Rectum => "rectum",
            AnatomicalSite::Cervix => "cervix",
        }
    }
}

impl fmt::Display for AnatomicalSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// ROIカテゴリ（4種固定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoiCategory {
    #[serde(rename = "Target Volume")]
    TargetVolume,
    #[serde(rename = "Organs at Risk")]
    OrgansAtRisk,
    #[serde(rename = "Plan-Specific Auxiliary Results")]
    PlanSpecificAuxiliary,
    #[serde(rename = "Dose Calculation-Specific")]
    DoseCalculationSpecific,
}

impl RoiCategory {
    pub const ALL: [RoiCategory; 4] = [
        RoiCategory::TargetVolume,
        RoiCategory::OrgansAtRisk,
        RoiCategory::PlanSpecificAuxiliary,
        RoiCategory::DoseCalculationSpecific,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RoiCategory::TargetVolume => "Target Volume",
            RoiCategory::OrgansAtRisk => "Organs at Risk",
            RoiCategory::PlanSpecificAuxiliary => "Plan-Specific Auxiliary Results",
            RoiCategory::DoseCalculationSpecific => "Dose Calculation-Specific",
        }
    }

    /// モデル出力のキーからカテゴリを判定
    ///
    /// 表記ゆれ（"Organs at Risk (OAR)"、"Dose Calculation-Specific ROIs"、
    /// 末尾のピリオド、大文字小文字）を許容する。
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label
            .trim()
            .trim_matches('"')
            .trim_end_matches('.')
            .trim()
            .to_lowercase()
            .replace(['-', '_'], " ");

        if normalized.starts_with("target volume") {
            Some(RoiCategory::TargetVolume)
        } else if normalized.starts_with("organs at risk")
            || normalized == "oar"
            || normalized == "oars"
        {
            Some(RoiCategory::OrgansAtRisk)
        } else if normalized.starts_with("plan specific") {
            Some(RoiCategory::PlanSpecificAuxiliary)
        } else if normalized.starts_with("dose calculation") {
            Some(RoiCategory::DoseCalculationSpecific)
        } else {
            None
        }
    }
}

impl fmt::Display for RoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Step2の出力: カテゴリ別ROI名
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Classification {
    pub target_volume: Vec<String>,
    pub organs_at_risk: Vec<String>,
    pub plan_specific: Vec<String>,
    pub dose_calculation: Vec<String>,
}

impl Classification {
    pub fn get(&self, category: RoiCategory) -> &[String] {
        match category {
            RoiCategory::TargetVolume => &self.target_volume,
            RoiCategory::OrgansAtRisk => &self.organs_at_risk,
            RoiCategory::PlanSpecificAuxiliary => &self.plan_specific,
            RoiCategory::DoseCalculationSpecific => &self.dose_calculation,
        }
    }

    /// 同じキーが複数回出現した場合は後勝ち
    pub fn set(&mut self, category: RoiCategory, names: Vec<String>) {
        match category {
            RoiCategory::TargetVolume => self.target_volume = names,
            RoiCategory::OrgansAtRisk => self.organs_at_risk = names,
            RoiCategory::PlanSpecificAuxiliary => self.plan_specific = names,
            RoiCategory::DoseCalculationSpecific => self.dose_calculation = names,
        }
    }

    /// 標準化対象（ターゲット・OAR）が存在するか
    pub fn needs_relabel(&self) -> bool {
        !self.target_volume.is_empty() || !self.organs_at_risk.is_empty()
    }
}

/// Step3の構造化ビュー: 1つの名称変換
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelabelEntry {
    pub category: String,
    pub input: String,
    pub relabeled: String,
}

/// 1ファイル分の処理結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResult {
    pub file_name: String,

    #[serde(default)]
    pub file_path: String,

    /// 重複除去済みROI名（出現順）
    #[serde(default)]
    pub roi_query: Vec<String>,

    /// 部位判定の生テキスト（推論マーカー除去済み）
    #[serde(default)]
    pub site_text: String,

    #[serde(default)]
    pub site: Option<AnatomicalSite>,

    /// 分類結果テキスト（波括弧内）
    #[serde(default)]
    pub classification_text: String,

    #[serde(default)]
    pub classification: Classification,

    /// 標準化結果の生テキスト（未検証）
    #[serde(default)]
    pub relabel_text: String,
}

impl FileResult {
    /// ROIクエリをJSON配列文字列として表示
    pub fn roi_query_text(&self) -> String {
        crate::prompts::format_name_list(&self.roi_query)
    }
}
