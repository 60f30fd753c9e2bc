//! 3段階パイプライン
//!
//! ファイルごとに逐次実行:
//! - Step1: 部位判定
//! - Step2: カテゴリ分類
//! - Step3: 名称標準化（ターゲット・OARが空ならスキップ）
//!
//! 1ファイル内のどの段階で失敗しても、そのファイルをスキップして次へ進む。

pub mod cache;

pub use cache::{compute_file_hash, CacheFile};

use crate::error::Result;
use crate::llm::ChatModel;
use crate::rtstruct::{read_roi_names, roi_query};
use crate::scanner::StructureSetFile;
use indicatif::ProgressBar;
use roi_relabel_common::{
    build_classification_messages, build_relabel_messages, build_site_messages,
    parse_classification, parse_site, strip_reasoning, Classification, FileResult,
    ParsedClassification, RoiCategory,
};
use std::path::Path;
use tracing::{debug, info, warn};

/// Step1: 部位判定（推論マーカー除去済みテキストを返す）
pub async fn detect_site<M: ChatModel>(model: &M, query: &[String]) -> Result<String> {
    let response = model.complete(&build_site_messages(query)).await?;
    Ok(strip_reasoning(&response).to_string())
}

/// Step2: カテゴリ分類
pub async fn classify<M: ChatModel>(
    model: &M,
    query: &[String],
    site_text: &str,
) -> Result<ParsedClassification> {
    let response = model
        .complete(&build_classification_messages(query, site_text))
        .await?;
    debug!("分類レスポンス長: {} chars", response.len());
    Ok(parse_classification(&response)?)
}

/// Step3: 名称標準化（生テキストを検証せずに返す）
pub async fn relabel<M: ChatModel>(model: &M, classification: &Classification) -> Result<String> {
    let response = model
        .complete(&build_relabel_messages(
            classification.get(RoiCategory::TargetVolume),
            classification.get(RoiCategory::OrgansAtRisk),
        ))
        .await?;
    Ok(strip_reasoning(&response).to_string())
}

/// 読み込み済みROI名に対して3段階を実行
pub async fn process_names<M: ChatModel>(
    model: &M,
    file_name: &str,
    file_path: &str,
    names: &[String],
) -> Result<FileResult> {
    let query = roi_query(names);
    debug!("[{}] ROI {}件（重複除去後）", file_name, query.len());

    let site_text = detect_site(model, &query).await?;
    let site = parse_site(&site_text);
    info!("[{}] 部位: {}", file_name, site_text);
    if site.is_none() {
        warn!("[{}] 部位を判定できません: {}", file_name, site_text);
    }

    let parsed = classify(model, &query, &site_text).await?;
    debug!("[{}] 分類: {}", file_name, parsed.text);

    let relabel_text = if parsed.classification.needs_relabel() {
        let text = relabel(model, &parsed.classification).await?;
        debug!("[{}] 標準化: {}", file_name, text);
        text
    } else {
        info!("[{}] 標準化対象のターゲット・OARがないためStep3をスキップ", file_name);
        String::new()
    };

    Ok(FileResult {
        file_name: file_name.to_string(),
        file_path: file_path.to_string(),
        roi_query: query,
        site_text,
        site,
        classification_text: parsed.text,
        classification: parsed.classification,
        relabel_text,
    })
}

/// 1ファイルを処理
pub async fn process_file<M: ChatModel>(model: &M, file: &StructureSetFile) -> Result<FileResult> {
    let names = read_roi_names(&file.path)?;
    process_names(model, &file.file_name, &file.path.display().to_string(), &names).await
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub cached: usize,
    pub skipped: usize,
}

/// 全ファイルを逐次処理
///
/// 結果は1件ごとに `on_result` へ渡す。処理・書き込みの失敗は
/// ログに記録してスキップ扱いにする（再試行・ロールバックなし）。
/// キャッシュは (キャッシュ, 保存先フォルダ) で渡し、新しい結果ごとに保存する。
pub async fn run<M, F>(
    model: &M,
    files: &[StructureSetFile],
    mut cache: Option<(&mut CacheFile, &Path)>,
    progress: &ProgressBar,
    mut on_result: F,
) -> RunSummary
where
    M: ChatModel,
    F: FnMut(&FileResult) -> Result<()>,
{
    let mut summary = RunSummary::default();

    for file in files {
        progress.set_message(file.file_name.clone());

        let hash = match cache {
            Some(_) => match compute_file_hash(&file.path) {
                Ok(h) => Some(h),
                Err(e) => {
                    warn!("ハッシュ計算失敗（キャッシュなしで処理）: {}: {}", file.path.display(), e);
                    None
                }
            },
            None => None,
        };

        let cached = match (&cache, &hash) {
            (Some((c, _)), Some((h, _))) => c.get(h).cloned(),
            _ => None,
        };

        let (result, from_cache) = match cached {
            Some(mut result) => {
                debug!("[{}] キャッシュヒット", file.file_name);
                result.file_name = file.file_name.clone();
                result.file_path = file.path.display().to_string();
                (result, true)
            }
            None => match process_file(model, file).await {
                Ok(result) => {
                    if let (Some((c, folder)), Some((h, size))) = (cache.as_mut(), &hash) {
                        c.insert(h.clone(), *size, result.clone());
                        if let Err(e) = c.save(folder) {
                            warn!("キャッシュ保存失敗: {}: {}", folder.display(), e);
                        }
                    }
                    (result, false)
                }
                Err(e) => {
                    warn!("スキップ: {}: {}", file.path.display(), e);
                    summary.skipped += 1;
                    progress.inc(1);
                    continue;
                }
            },
        };

        match on_result(&result) {
            Ok(()) if from_cache => summary.cached += 1,
            Ok(()) => summary.processed += 1,
            Err(e) => {
                warn!("書き込み失敗のためスキップ: {}: {}", file.path.display(), e);
                summary.skipped += 1;
            }
        }
        progress.inc(1);
    }

    summary
}
