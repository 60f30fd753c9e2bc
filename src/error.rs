use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoiRelabelError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`roi-relabel config --set-api-key YOUR_KEY` または環境変数 DEEPSEEK_API_KEY で設定してください")]
    MissingApiKey,

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("DICOM読み込みエラー: {0}")]
    Dicom(String),

    #[error("RTSTRUCTファイルではありません: {0}")]
    InvalidRtStruct(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("CSV出力エラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("ストラクチャセットが見つかりません: {0}")]
    NoFilesFound(String),

    #[error(transparent)]
    Common(#[from] roi_relabel_common::Error),
}

impl From<reqwest::Error> for RoiRelabelError {
    fn from(e: reqwest::Error) -> Self {
        RoiRelabelError::ApiCall(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RoiRelabelError>;
