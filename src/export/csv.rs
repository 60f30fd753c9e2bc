//! CSV出力（1ファイル1行の追記）

use crate::error::Result;
use roi_relabel_common::export::RESULT_HEADERS;
use roi_relabel_common::FileResult;
use std::fs::OpenOptions;
use std::path::Path;

/// 結果を1行追記
///
/// 毎回追記モードで開くため、途中で中断しても処理済みの行は残る。
/// 新規または空のファイルには先にヘッダー行を書く。
pub fn append_row(path: &Path, result: &FileResult) -> Result<()> {
    let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if needs_header {
        writer.write_record(RESULT_HEADERS)?;
    }

    let query = result.roi_query_text();
    writer.write_record([
        result.file_name.as_str(),
        query.as_str(),
        result.site_text.as_str(),
        result.classification_text.as_str(),
        result.relabel_text.as_str(),
    ])?;
    writer.flush()?;

    Ok(())
}
