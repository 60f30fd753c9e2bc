//! プロンプト生成モジュール
//!
//! 3段階パイプラインのメッセージ構築:
//! - build_site_messages: Step1（部位判定）
//! - build_classification_messages: Step2（カテゴリ分類）
//! - build_relabel_messages: Step3（名称標準化）
//!
//! 文面はデータとして扱い、パーサー側は文面に依存しない。

use crate::protocol::{
    classification_protocol_text, name_set_text, OAR_RELABEL_PROTOCOL, PTV_RELABEL_PROTOCOL,
};
use crate::types::{AnatomicalSite, ChatMessage};

/// 推論モデルに思考を省略させるための空ブロック
pub const EMPTY_THINK_BLOCK: &str = "<think>\n\n</think>";

/// ROI名リストをJSON配列形式の文字列に整形
///
/// `["PTV_70", "Heart"]` 形式（要素はJSONエスケープ済み）
pub fn format_name_list(names: &[String]) -> String {
    let items = names
        .iter()
        .map(|n| serde_json::Value::String(n.clone()).to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", items)
}

fn site_list() -> String {
    AnatomicalSite::ALL
        .iter()
        .map(|s| format!("    - {}", s.label()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Step1用の部位判定指示
pub fn anatomical_prompt() -> String {
    format!(
        r#"You are a radiotherapy assistant specializing in classifying anatomical sites.
Given a list of ROI names from one structure set, determine which one of the following five anatomical sites it most likely belongs to:
{sites}

### Your task
Output only the most appropriate anatomical site from the list above.
Remember this anatomical site for use in subsequent tasks and reasoning.

### Important
Do not explain your choice. Respond only with the exact anatomical site name from the list."#,
        sites = site_list()
    )
}

/// Step2用の分類指示
pub fn classification_prompt() -> String {
    let protocol = classification_protocol_text();
    format!(
        r#"You are an intelligent assistant specializing in the classification of ROI (Region of Interest) names in radiotherapy. Classify every ROI name provided by the user into one of the following four classes:
    1. **Target Volume**: CTV, PTV, GTV and related volumes (e.g. PTV_70, GTV_60). These often contain numbers indicating prescription doses.
    2. **Organs at Risk**: normal organs and tissues needing protection (e.g. Lung, Heart, Spinal Cord).
    3. **Plan-Specific Auxiliary Results**: structures created for optimization or constraints, such as margins, rings or helper ROIs (e.g. R60, R60+, Paro_M, 56+, 0.3).
    4. **Dose Calculation-Specific**: structures used for dose calculation, like Couch, laser or iso.

### Working process
    1. Device-related terms (couch, laser, iso, body, external) are Dose Calculation-Specific.
    2. Classify according to the reference protocol {protocol}. If the protocol contains a similarly named ROI, use its category.
    3. When two targets appear in one ROI name (e.g. PTV2-PTVnx, PTV-all) it is a processed target and belongs to Plan-Specific Auxiliary Results.
    4. Only if site_result is "nasopharynx" or "breast": an ROI containing "PTV" without an exactly corresponding "CTV" or "GTV" name (digits, format and suffix considered) is Plan-Specific Auxiliary Results. For other sites skip this rule.
    5. ROIs starting with PTV, GTV, CTV, ITV, IGTV, ICTV or PGTV may be Target Volumes.
    6. ROIs that are not clearly Organs at Risk or Target Volume are Plan-Specific Auxiliary Results.
    7. A '-' or '_' followed by a number or margin usually marks a derived structure.

### Output requirements
    1. Check the query one by one so that no ROI is missed. Keep the order of the query inside each category.
    2. The Target Volume list must contain the PTVs. If it does not, some PTVs were probably misclassified as Plan-Specific; reclassify them.
    3. Output format, one category per line:
{{
    "Target Volume": ["PTV_high", "GTV_tumor"],
    "Organs at Risk": ["Lung_L"],
    "Plan-Specific Auxiliary Results": ["R60"],
    "Dose Calculation-Specific": ["Couch"]
}}

### Important
    Return ONLY a valid JSON object with no additional text, explanation or code block markers."#
    )
}

/// Step3用の標準化指示
pub fn relabel_prompt() -> String {
    let ptv_protocol = name_set_text(PTV_RELABEL_PROTOCOL);
    let oar_protocol = name_set_text(OAR_RELABEL_PROTOCOL);
    format!(
        r#"You are an intelligent assistant specializing in refining and correcting ROI (Region of Interest) names in radiotherapy datasets. Relabel the user-provided ROI names into standardized, clean and accurate names.

### Target volume nomenclature
Standardize according to {ptv_protocol} first, even where it conflicts with the rules below; standardize the rest according to AAPM TG-263.
    1. Prefix: GTV, CTV, ITV, IGTV, ICTV, PTV or PTV! (low-dose PTV excluding high-dose overlap). PCTV and PGTV become PTVc and PTVg.
    2. Classifier directly follows the prefix: n, p, sb, par, v, vas, b, tb, rpn, imn, scn, aln, icv, cw.
    3. Multiple targets: Arabic numerals after type/classifier (PTV1, GTVp1).
    4. Imaging modality and order after _ (PTVp1_CT1PT1).
    5. Structure indicators after _ (CTV_A_Aorta, GTV_Preop).
    6. Dose level after _: relative (_High, _Mid, _Low), physical in cGy or Gy (PTV_5040, PTV_50.4Gy), per fraction with x (PTV_Liver_20Gyx3).
    7. Cropped structures: -XX in mm (PTV-03).
    8. Custom qualifiers after ^ (PTV^Physician1).
    9. At most 16 characters; remove underscores from left to right when exceeded.

### OAR nomenclature
Standardize according to {oar_protocol} first, even where it conflicts with the rules below; standardize the rest according to AAPM TG-263.
    1. At most 16 characters, unique case-insensitively.
    2. Compound structures use the plural (Lungs, Kidneys).
    3. First letter of each category uppercase (Femur_Head).
    4. No spaces; use _ (Bowel_Bag).
    5. Spatial indicators at the end: L, R, A, P, I, S, RUL, RLL, RML, LUL, LLL, NAdj, Dist, Prox.
    6. Standard roots: A_, V_, LN_, CN_, Glnd_, Bone_, Musc_, Spc_, VB, Sinus_.
    7. Planning OAR volumes: _PRV plus optional mm expansion (SpinalCord_PRV05).
    8. Partial structures use ~ (Brain~); custom qualifiers use ^ (Lungs^Ex).
    9. Camel case only when distinct categories do not exist (CaudaEquina).
    10. Non-dose evaluation structures are prefixed with z (zPTVopt).

### Output requirements
Output a valid JSON object in the following format:
{{
    "Target Volume": {{"Input": ["GTV-LN-70", "CTV-LN-54"], "Relabeled": ["GTVln_70Gy", "CTVln_54Gy"]}},
    "Organs at Risk": {{"Input": ["Heart"], "Relabeled": ["Heart"]}}
}}"#
    )
}

/// Step1メッセージ構築
pub fn build_site_messages(query: &[String]) -> Vec<ChatMessage> {
    let sites = AnatomicalSite::ALL
        .iter()
        .map(|s| s.label())
        .collect::<Vec<_>>()
        .join(", ");
    vec![
        ChatMessage::system(format!(
            "You are a medical assistant specializing in radiotherapy. Given ROI names, determine which anatomical site they belong to: {}. Work as follows:\n{}\nRespond with only the site name.",
            sites,
            anatomical_prompt()
        )),
        ChatMessage::assistant(EMPTY_THINK_BLOCK),
        ChatMessage::user(format!(
            "Respond with only the site name of: {} without thinking process.",
            format_name_list(query)
        )),
    ]
}

/// Step2メッセージ構築
pub fn build_classification_messages(query: &[String], site_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "You are an intelligent assistant specializing in the classification of ROI (Region of Interest) names used in radiotherapy. Classify the ROI names provided by the user into four categories. Respond as follows:\n{}",
            classification_prompt()
        )),
        ChatMessage::user(format!(
            "Classify the ROI names in query {} and the corresponding site_result {}.",
            format_name_list(query),
            site_text
        )),
    ]
}

/// Step3メッセージ構築
pub fn build_relabel_messages(targets: &[String], oars: &[String]) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "You are an intelligent assistant specializing in renaming ROI (Region of Interest) names used in radiotherapy. Systematically rename the ROI names provided by the user. Respond according to:\n{}\nReturn only the standardized names in JSON format without explanation.",
            relabel_prompt()
        )),
        ChatMessage::user(format!(
            "Rename the ROI names in the given Target Volume list {} and OAR list {}.",
            format_name_list(targets),
            format_name_list(oars)
        )),
    ]
}
