//! Excel生成（CLI版）

use crate::error::{Result, RoiRelabelError};
use roi_relabel_common::export::excel_core::generate_excel_buffer;
use roi_relabel_common::FileResult;
use std::path::Path;

pub fn generate_excel(results: &[FileResult], output_path: &Path) -> Result<()> {
    let buffer = generate_excel_buffer(results).map_err(RoiRelabelError::ExcelGeneration)?;
    std::fs::write(output_path, buffer)?;
    Ok(())
}
