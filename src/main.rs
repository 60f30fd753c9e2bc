use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use roi_relabel::{cli, config, error, export, llm, logging, pipeline, rtstruct, scanner};
use cli::{Cli, Commands};
use config::Config;
use pipeline::CacheFile;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Run { folder, output, format, recursive, use_cache } => {
            println!("🩻 roi-relabel - ROI名の分類・標準化\n");

            // 1. スキャン
            println!("[1/3] ストラクチャセットをスキャン中...");
            let files = scanner::scan_structure_sets(&folder, recursive)?;
            println!("✔ {}件のストラクチャセットを検出\n", files.len());

            if files.is_empty() {
                let folder = folder.display().to_string();
                return Err(error::RoiRelabelError::NoFilesFound(folder).into());
            }

            // 2. モデル解析
            let client = llm::OpenAiCompatClient::new(&config)?;
            println!(
                "[2/3] モデル解析中... (model: {}){}",
                client.model(),
                if use_cache { " (キャッシュ有効)" } else { "" }
            );

            let output = output.unwrap_or_else(|| export::default_output_path(&folder));
            let (csv_path, excel_path) = export::output_paths(&output, &format);
            info!("出力形式: {}", format);

            let mut cache = use_cache.then(|| CacheFile::load(&folder));
            let mut collected = Vec::new();

            let progress = ProgressBar::new(files.len() as u64);
            progress.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")?);

            let cache_target = cache.as_mut().map(|c| (c, folder.as_path()));
            let summary = pipeline::run(&client, &files, cache_target, &progress, |result| {
                if let Some(path) = &csv_path {
                    export::csv::append_row(path, result)?;
                }
                if excel_path.is_some() {
                    collected.push(result.clone());
                }
                Ok(())
            })
            .await;
            progress.finish_and_clear();

            println!(
                "✔ 解析完了 (処理: {}, キャッシュ: {}, スキップ: {})\n",
                summary.processed, summary.cached, summary.skipped
            );

            // 3. 結果保存
            println!("[3/3] 結果を保存中...");
            if let Some(path) = &csv_path {
                println!("✔ CSV出力: {}", path.display());
            }
            if let Some(path) = &excel_path {
                export::excel::generate_excel(&collected, path)?;
                println!("✔ Excel出力: {}", path.display());
            }

            println!("\n✅ 完了");
        }

        Commands::Names { folder, output } => {
            let files = scanner::list_files(&folder)?;
            let names = rtstruct::collect_roi_names(&files);
            info!("{}ファイルから{}件のROI名", files.len(), names.len());

            match output {
                Some(path) => {
                    std::fs::write(&path, serde_json::to_string_pretty(&names)?)?;
                    println!("✔ ROI名を保存: {}", path.display());
                }
                None => {
                    for name in &names {
                        println!("{}", name);
                    }
                }
            }
        }

        Commands::Config { set_api_key, set_model, set_base_url, show } => {
            let mut config = config;
            let changed = set_model.is_some() || set_base_url.is_some();

            if let Some(model) = set_model {
                config.model = model;
            }
            if let Some(base_url) = set_base_url {
                config.base_url = base_url;
            }

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            } else if changed {
                config.save()?;
            }
            if changed {
                println!("✔ 設定を保存しました");
            }

            if show {
                println!("設定:");
                println!("  ベースURL: {}", config.base_url);
                println!("  モデル: {}", config.model);
                println!("  temperature: {}", config.temperature);
                println!("  top_p: {}", config.top_p);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                let key_status = if config.get_api_key().is_ok() {
                    "設定済み"
                } else {
                    "未設定"
                };
                println!("  APIキー: {}", key_status);
            }
        }

        Commands::Cache { clear, folder, info } => {
            let target = folder.unwrap_or_else(|| std::path::PathBuf::from("."));
            let cache_path = CacheFile::cache_path(&target);

            if info || !clear {
                // デフォルトまたは--info: 情報表示
                if cache_path.exists() {
                    let cache = CacheFile::load(&target);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match CacheFile::clear(&target) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}
