//! Export core modules shared by the CLI writers.

#[cfg(feature = "excel")]
pub mod excel_core;

/// 結果表の列（CSV・Excel共通）
pub const RESULT_HEADERS: [&str; 5] = [
    "filename",
    "roi_query",
    "site",
    "classification",
    "relabel",
];
