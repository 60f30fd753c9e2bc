//! 参照プロトコル
//!
//! 分類・標準化プロンプトに埋め込む施設固有の参照表。

use crate::types::RoiCategory;

/// 分類プロトコル: 既知のROI名 → カテゴリ
pub const CLASSIFICATION_PROTOCOL: &[(&str, RoiCategory)] = &[
    ("GTV", RoiCategory::TargetVolume),
    ("CTVnd", RoiCategory::TargetVolume),
    ("PGTVnx", RoiCategory::TargetVolume),
    ("PGTV-m", RoiCategory::PlanSpecificAuxiliary),
    ("PTV-all", RoiCategory::PlanSpecificAuxiliary),
    ("PTV-skin", RoiCategory::PlanSpecificAuxiliary),
    ("Spinal Cord", RoiCategory::OrgansAtRisk),
    ("Brain Stem", RoiCategory::OrgansAtRisk),
    ("Couch", RoiCategory::DoseCalculationSpecific),
    ("Laser", RoiCategory::DoseCalculationSpecific),
    ("Body", RoiCategory::DoseCalculationSpecific),
];

/// ターゲット標準名（TG-263より優先）
pub const PTV_RELABEL_PROTOCOL: &[&str] = &[
    "PTV1",
    "PTVln",
    "PTVg",
    "PTV_60Gy",
    "PTVtb_50Gy",
    "PTVg^st",
];

/// OAR標準名（TG-263より優先）
pub const OAR_RELABEL_PROTOCOL: &[&str] = &[
    "LargeBowel",
    "SmallBowel",
    "Lens_Left",
    "Lens_Right",
    "TemporalLobe_Left",
    "TemporalLobe_Right",
    "Lung_Left",
    "Lung_Right",
];

/// 分類プロトコルをプロンプト埋め込み用の文字列に整形
///
/// `{"GTV": "Target Volume", ...}` 形式
pub fn classification_protocol_text() -> String {
    let pairs = CLASSIFICATION_PROTOCOL
        .iter()
        .map(|(name, category)| format!("\"{}\": \"{}\"", name, category.label()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", pairs)
}

/// 名称集合をプロンプト埋め込み用の文字列に整形
pub fn name_set_text(names: &[&str]) -> String {
    let quoted = names
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", quoted)
}
