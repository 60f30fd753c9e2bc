//! パイプライン統合テスト
//!
//! 応答を固定したモデルで3段階の流れ・スキップ・キャッシュを検証

mod common;

use common::{write_rtstruct, ScriptedModel, CLASSIFICATION_REPLY, RELABEL_REPLY, SITE_REPLY};
use indicatif::ProgressBar;
use roi_relabel::error::RoiRelabelError;
use roi_relabel::pipeline::{self, compute_file_hash, CacheFile, RunSummary};
use roi_relabel::scanner::{scan_structure_sets, StructureSetFile};
use roi_relabel_common::{AnatomicalSite, FileResult};
use std::path::Path;
use tempfile::tempdir;

fn setup_case(root: &Path, case: &str, file_name: &str, modality: &str, names: &[&str]) {
    let dir = root.join(case);
    std::fs::create_dir_all(&dir).unwrap();
    write_rtstruct(&dir.join(file_name), modality, names);
}

async fn run_collect(
    model: &ScriptedModel,
    files: &[StructureSetFile],
    cache: Option<(&mut CacheFile, &Path)>,
) -> (RunSummary, Vec<FileResult>) {
    let mut results = Vec::new();
    let summary = pipeline::run(model, files, cache, &ProgressBar::hidden(), |r| {
        results.push(r.clone());
        Ok(())
    })
    .await;
    (summary, results)
}

#[tokio::test]
async fn test_three_stages_in_order() {
    let dir = tempdir().unwrap();
    let names = ["PTV_70", "Heart", "PTV_70", "Couch"];
    setup_case(dir.path(), "patient1", "RS.1.dcm", "RTSTRUCT", &names);

    let files = scan_structure_sets(dir.path(), false).unwrap();
    let model = ScriptedModel::new([SITE_REPLY, CLASSIFICATION_REPLY, RELABEL_REPLY]);

    let (summary, results) = run_collect(&model, &files, None).await;

    assert_eq!(summary, RunSummary { processed: 1, cached: 0, skipped: 0 });
    assert_eq!(results.len(), 1);

    let result = &results[0];
    assert_eq!(result.file_name, "RS.1.dcm");
    assert_eq!(result.roi_query, vec!["PTV_70", "Heart", "Couch"]);
    assert_eq!(result.site_text, "nasopharynx");
    assert_eq!(result.site, Some(AnatomicalSite::Nasopharynx));
    assert_eq!(result.classification.target_volume, vec!["PTV_70"]);
    assert_eq!(result.classification.dose_calculation, vec!["Couch"]);
    assert!(result.classification_text.starts_with("\"Target Volume\""));
    assert!(result.relabel_text.starts_with("```json"));
    assert!(result.relabel_text.contains("PTV_70Gy"));

    // 3回の呼び出しとプロンプト内容
    assert_eq!(model.calls().len(), 3);
    assert!(model.user_message(0).contains(r#"["PTV_70", "Heart", "Couch"]"#));
    assert!(model.user_message(1).contains("site_result nasopharynx"));
    assert!(model.user_message(2).contains(r#"Target Volume list ["PTV_70"]"#));
    assert!(model.user_message(2).contains(r#"OAR list ["Heart"]"#));
}

#[tokio::test]
async fn test_relabel_skipped_without_targets_or_oars() {
    let dir = tempdir().unwrap();
    setup_case(dir.path(), "phantom", "RS.phantom.dcm", "RTSTRUCT", &["Couch", "Laser"]);

    let files = scan_structure_sets(dir.path(), false).unwrap();
    let model = ScriptedModel::new([
        "lung",
        r#"{"Target Volume": [], "Organs at Risk": [], "Dose Calculation-Specific": ["Couch", "Laser"]}"#,
    ]);

    let (summary, results) = run_collect(&model, &files, None).await;

    assert_eq!(summary.processed, 1);
    assert_eq!(model.calls().len(), 2);
    assert_eq!(results[0].relabel_text, "");
    assert_eq!(results[0].site, Some(AnatomicalSite::Lung));
}

#[tokio::test]
async fn test_failed_file_is_skipped() {
    let dir = tempdir().unwrap();
    setup_case(dir.path(), "a_patient", "RS.a.dcm", "RTSTRUCT", &["PTV_70"]);
    setup_case(dir.path(), "b_patient", "RS.b.dcm", "RTSTRUCT", &["PTV_70", "Heart", "Couch"]);

    let files = scan_structure_sets(dir.path(), false).unwrap();
    let model = ScriptedModel::default();
    model.push_err("connection reset");
    model.push_ok(SITE_REPLY);
    model.push_ok(CLASSIFICATION_REPLY);
    model.push_ok(RELABEL_REPLY);

    let (summary, results) = run_collect(&model, &files, None).await;

    assert_eq!(summary, RunSummary { processed: 1, cached: 0, skipped: 1 });
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].file_name, "RS.b.dcm");
}

#[tokio::test]
async fn test_malformed_classification_skips_file() {
    let dir = tempdir().unwrap();
    setup_case(dir.path(), "patient", "RS.1.dcm", "RTSTRUCT", &["PTV_70"]);

    let files = scan_structure_sets(dir.path(), false).unwrap();
    let model = ScriptedModel::new(["breast", "{\n\"Target Volume\": [\n\"PTV_70\",\n]\n}"]);

    let (summary, results) = run_collect(&model, &files, None).await;

    assert_eq!(summary.skipped, 1);
    assert!(results.is_empty());
    // 標準化は呼ばれない
    assert_eq!(model.calls().len(), 2);
}

#[tokio::test]
async fn test_non_rtstruct_file_is_skipped_without_model_calls() {
    let dir = tempdir().unwrap();
    setup_case(dir.path(), "patient", "RS_but_ct.dcm", "CT", &["Body"]);

    let files = scan_structure_sets(dir.path(), false).unwrap();
    assert_eq!(files.len(), 1);

    let model = ScriptedModel::default();
    let (summary, _) = run_collect(&model, &files, None).await;

    assert_eq!(summary.skipped, 1);
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_writer_error_counts_as_skipped() {
    let dir = tempdir().unwrap();
    setup_case(dir.path(), "patient", "RS.1.dcm", "RTSTRUCT", &["PTV_70", "Heart", "Couch"]);

    let files = scan_structure_sets(dir.path(), false).unwrap();
    let model = ScriptedModel::new([SITE_REPLY, CLASSIFICATION_REPLY, RELABEL_REPLY]);

    let summary = pipeline::run(&model, &files, None, &ProgressBar::hidden(), |_| {
        Err(RoiRelabelError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")))
    })
    .await;

    assert_eq!(summary, RunSummary { processed: 0, cached: 0, skipped: 1 });
}

#[tokio::test]
async fn test_cache_hit_skips_model_calls() {
    let dir = tempdir().unwrap();
    setup_case(dir.path(), "patient", "RS.1.dcm", "RTSTRUCT", &["PTV_70", "Heart", "Couch"]);
    let files = scan_structure_sets(dir.path(), false).unwrap();

    // 1回目: モデルで処理してキャッシュに保存
    let mut cache = CacheFile::load(dir.path());
    let model = ScriptedModel::new([SITE_REPLY, CLASSIFICATION_REPLY, RELABEL_REPLY]);
    let (summary, first) = run_collect(&model, &files, Some((&mut cache, dir.path()))).await;
    assert_eq!(summary.processed, 1);
    assert_eq!(cache.len(), 1);

    // 2回目: モデル呼び出しなし
    let mut cache = CacheFile::load(dir.path());
    let model = ScriptedModel::default();
    let (summary, second) = run_collect(&model, &files, Some((&mut cache, dir.path()))).await;

    assert_eq!(summary, RunSummary { processed: 0, cached: 1, skipped: 0 });
    assert!(model.calls().is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_process_names_directly() {
    let model = ScriptedModel::new([
        "<think>x</think> Cervix",
        CLASSIFICATION_REPLY,
        RELABEL_REPLY,
    ]);
    let names: Vec<String> = vec!["PTV_70".into(), "Heart".into()];

    let result = pipeline::process_names(&model, "RS.x.dcm", "/data/RS.x.dcm", &names)
        .await
        .unwrap();

    assert_eq!(result.site_text, "Cervix");
    assert_eq!(result.site, Some(AnatomicalSite::Cervix));
    assert_eq!(result.file_path, "/data/RS.x.dcm");
}

#[tokio::test]
async fn test_cache_persisted_after_each_file() {
    let dir = tempdir().unwrap();
    setup_case(dir.path(), "a_patient", "RS.a.dcm", "RTSTRUCT", &["PTV_70", "Heart", "Couch"]);
    setup_case(dir.path(), "b_patient", "RS.b.dcm", "RTSTRUCT", &["PTV_60"]);
    let files = scan_structure_sets(dir.path(), false).unwrap();

    // 2件目はモデル失敗（中断相当）。1件目の結果はディスクに残る
    let model = ScriptedModel::new([SITE_REPLY, CLASSIFICATION_REPLY, RELABEL_REPLY]);
    let mut cache = CacheFile::load(dir.path());
    let (summary, _) = run_collect(&model, &files, Some((&mut cache, dir.path()))).await;
    assert_eq!(summary, RunSummary { processed: 1, cached: 0, skipped: 1 });

    let on_disk = CacheFile::load(dir.path());
    assert_eq!(on_disk.len(), 1);
    let (hash, _) = compute_file_hash(&files[0].path).unwrap();
    assert_eq!(on_disk.get(&hash).unwrap().file_name, "RS.a.dcm");
}

#[tokio::test]
async fn test_relabel_receives_targets_and_oars_only() {
    let model = ScriptedModel::new([
        "rectum",
        r#"{"Target Volume": ["CTV", "PTV"], "Organs at Risk": ["Bladder"], "Plan-Specific Auxiliary Results": ["R60"]}"#,
        "{}",
    ]);
    let names: Vec<String> = vec!["CTV".into(), "PTV".into(), "Bladder".into(), "R60".into()];

    pipeline::process_names(&model, "RS.r.dcm", "/data/RS.r.dcm", &names).await.unwrap();

    let relabel_prompt = model.user_message(2);
    assert!(relabel_prompt.contains(r#"Target Volume list ["CTV", "PTV"]"#));
    assert!(relabel_prompt.contains(r#"OAR list ["Bladder"]"#));
    assert!(!relabel_prompt.contains("R60"));
}
