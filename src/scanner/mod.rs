use crate::error::{Result, RoiRelabelError};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureSetFile {
    pub path: PathBuf,
    pub file_name: String,
}

/// ストラクチャセットとみなすファイル名の部分文字列
const STRUCTURE_SET_MARKERS: &[&str] = &["RS", "RTSTRUCT"];

pub fn is_structure_set_name(file_name: &str) -> bool {
    STRUCTURE_SET_MARKERS.iter().any(|m| file_name.contains(m))
}

/// 症例フォルダ群からストラクチャセットを列挙
///
/// 既定は `root/<症例フォルダ>/<ファイル>` の2階層のみ。
/// root直下のファイルは対象外。`recursive` で2階層以上を全て走査する。
pub fn scan_structure_sets(root: &Path, recursive: bool) -> Result<Vec<StructureSetFile>> {
    if !root.is_dir() {
        return Err(RoiRelabelError::FolderNotFound(root.display().to_string()));
    }

    let max_depth = if recursive { usize::MAX } else { 2 };
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(2)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        if is_structure_set_name(&file_name) {
            files.push(StructureSetFile {
                path: entry.path().to_path_buf(),
                file_name,
            });
        } else {
            debug!("対象外: {}", entry.path().display());
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(files)
}

/// フォルダ直下の通常ファイルを列挙（名前フィルタなし）
pub fn list_files(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(RoiRelabelError::FolderNotFound(folder.display().to_string()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();

    files.sort();
    Ok(files)
}
