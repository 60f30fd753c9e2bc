//! RTSTRUCT読み込み
//!
//! StructureSetROISequence の各項目から ROIName を取り出す。

use crate::error::{Result, RoiRelabelError};
use dicom_dictionary_std::tags;
use dicom_object::open_file;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::warn;

const RTSTRUCT_MODALITY: &str = "RTSTRUCT";

fn clean_value(value: &str) -> &str {
    value.trim_end_matches('\0').trim()
}

/// ストラクチャセットからROI名を読み込む（ファイル内の順序どおり）
pub fn read_roi_names(path: &Path) -> Result<Vec<String>> {
    let obj = open_file(path)
        .map_err(|e| RoiRelabelError::Dicom(format!("{}: {}", path.display(), e)))?;

    let modality = obj
        .element(tags::MODALITY)
        .map_err(|e| RoiRelabelError::InvalidRtStruct(format!("{}: {}", path.display(), e)))?
        .to_str()
        .map_err(|e| RoiRelabelError::Dicom(format!("{}: {}", path.display(), e)))?;

    if clean_value(&modality) != RTSTRUCT_MODALITY {
        return Err(RoiRelabelError::InvalidRtStruct(format!(
            "{} (Modality: {})",
            path.display(),
            clean_value(&modality)
        )));
    }

    let sequence = obj
        .element(tags::STRUCTURE_SET_ROI_SEQUENCE)
        .map_err(|e| RoiRelabelError::InvalidRtStruct(format!("{}: {}", path.display(), e)))?;

    let items = sequence.items().ok_or_else(|| {
        RoiRelabelError::InvalidRtStruct(format!(
            "{}: StructureSetROISequence がシーケンスではありません",
            path.display()
        ))
    })?;

    let mut names = Vec::with_capacity(items.len());
    for item in items {
        let name = item
            .element(tags::ROI_NAME)
            .map_err(|e| RoiRelabelError::Dicom(format!("{}: {}", path.display(), e)))?
            .to_str()
            .map_err(|e| RoiRelabelError::Dicom(format!("{}: {}", path.display(), e)))?;
        names.push(clean_value(&name).to_string());
    }

    Ok(names)
}

/// 重複を除去したROIクエリ（最初の出現順を保持）
pub fn roi_query(names: &[String]) -> Vec<String> {
    let mut seen: HashSet<&String> = HashSet::new();
    names.iter().filter(|&n| seen.insert(n)).cloned().collect()
}

/// 複数ファイルのROI名を集約（ソート済み・重複なし）
///
/// 読めないファイルやRTSTRUCT以外はスキップする。
pub fn collect_roi_names<P: AsRef<Path>>(paths: &[P]) -> Vec<String> {
    let mut all = BTreeSet::new();

    for path in paths {
        let path = path.as_ref();
        match read_roi_names(path) {
            Ok(names) => all.extend(names),
            Err(e) => warn!("スキップ: {}: {}", path.display(), e),
        }
    }

    all.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_roi_query_preserves_order() {
        let query = roi_query(&names(&["PTV1", "Heart", "PTV1", "Couch", "Heart"]));
        assert_eq!(query, names(&["PTV1", "Heart", "Couch"]));
    }

    #[test]
    fn test_clean_value() {
        assert_eq!(clean_value("RTSTRUCT "), "RTSTRUCT");
        assert_eq!(clean_value("Lung_L\0"), "Lung_L");
    }

    #[test]
    fn test_read_roi_names_not_dicom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("RS.txt");
        std::fs::write(&path, "not a dicom file").unwrap();

        let result = read_roi_names(&path);
        assert!(matches!(result, Err(RoiRelabelError::Dicom(_))));
    }
}
