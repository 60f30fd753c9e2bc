use tracing_subscriber::EnvFilter;

/// ログ出力を初期化
///
/// `RUST_LOG` が設定されていればそれを優先し、なければ `--verbose` で debug、既定は info。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "roi_relabel={0},roi_relabel_common={0}",
            default_level
        ))
    });

    // 二重初期化（テスト等）は無視
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
