//! Excel生成（共通ライブラリ）
//!
//! - Results シート: CSVと同じ5列
//! - Relabel シート: 標準化結果を1行1変換に展開

use super::RESULT_HEADERS;
use crate::parser::parse_relabel;
use crate::types::FileResult;
use rust_xlsxwriter::*;

/// Excelのセル文字数上限
const MAX_CELL_CHARS: usize = 32_767;

pub const RELABEL_HEADERS: [&str; 4] = ["filename", "category", "input", "relabeled"];

fn clamp_cell(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_CHARS {
        text.to_string()
    } else {
        text.chars().take(MAX_CELL_CHARS).collect()
    }
}

fn write_header(
    worksheet: &mut Worksheet,
    headers: &[&str],
    format: &Format,
) -> Result<(), String> {
    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, format)
            .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
    }
    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("ウィンドウ枠固定エラー: {}", e))?;
    Ok(())
}

/// Excelをバッファに生成
pub fn generate_excel_buffer(results: &[FileResult]) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let value_format = Format::new()
        .set_align(FormatAlign::Top)
        .set_text_wrap();

    {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name("Results")
            .map_err(|e| format!("シート名設定エラー: {}", e))?;
        write_header(worksheet, &RESULT_HEADERS, &header_format)?;

        for (col, width) in [28.0, 48.0, 14.0, 60.0, 60.0].into_iter().enumerate() {
            worksheet
                .set_column_width(col as u16, width)
                .map_err(|e| format!("列幅設定エラー: {}", e))?;
        }

        for (idx, result) in results.iter().enumerate() {
            let row = idx as u32 + 1;
            let values = [
                result.file_name.clone(),
                result.roi_query_text(),
                result.site_text.clone(),
                result.classification_text.clone(),
                result.relabel_text.clone(),
            ];
            for (col, value) in values.iter().enumerate() {
                worksheet
                    .write_string_with_format(row, col as u16, clamp_cell(value), &value_format)
                    .map_err(|e| format!("値書き込みエラー: {}", e))?;
            }
        }
    }

    {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name("Relabel")
            .map_err(|e| format!("シート名設定エラー: {}", e))?;
        write_header(worksheet, &RELABEL_HEADERS, &header_format)?;

        for (col, width) in [28.0, 24.0, 24.0, 24.0].into_iter().enumerate() {
            worksheet
                .set_column_width(col as u16, width)
                .map_err(|e| format!("列幅設定エラー: {}", e))?;
        }

        let mut row: u32 = 1;
        for result in results {
            for entry in parse_relabel(&result.relabel_text) {
                let values = [&result.file_name, &entry.category, &entry.input, &entry.relabeled];
                for (col, value) in values.iter().enumerate() {
                    worksheet
                        .write_string(row, col as u16, clamp_cell(value))
                        .map_err(|e| format!("値書き込みエラー: {}", e))?;
                }
                row += 1;
            }
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}
