pub mod csv;
pub mod excel;

use crate::cli::OutputFormat;
use std::path::{Path, PathBuf};

/// 既定の出力先: `<rootの親>/<root名>_result_customized.csv`
pub fn default_output_path(root: &Path) -> PathBuf {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "roi".to_string());
    let parent = root.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("{}_result_customized.csv", name))
}

/// 出力形式に応じた (CSVパス, Excelパス)
pub fn output_paths(output: &Path, format: &OutputFormat) -> (Option<PathBuf>, Option<PathBuf>) {
    match format {
        OutputFormat::Csv => (Some(output.with_extension("csv")), None),
        OutputFormat::Excel => (None, Some(output.with_extension("xlsx"))),
        OutputFormat::Both => (
            Some(output.with_extension("csv")),
            Some(output.with_extension("xlsx")),
        ),
    }
}
