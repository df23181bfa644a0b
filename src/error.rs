use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("ドライバが見つかりません: {0}")]
    DriverNotFound(PathBuf),

    #[error("ブラウザが見つかりません: {0}")]
    BrowserNotFound(PathBuf),

    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("タイムアウト: {0}")]
    Timeout(String),

    #[error("要素が見つかりません: {0}")]
    ElementNotFound(String),

    #[error("セレクタが不正です: {0}")]
    InvalidSelector(String),

    #[error("不明な都市: '{0}'")]
    UnknownCity(String),

    #[error("都市データベース読み込みエラー ({path}): {source}")]
    CityDb {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("都市データが不正です (行 {line}): {reason}")]
    CityRecord { line: u64, reason: String },

    #[error("都市選択エラー: {0}")]
    Selection(String),

    #[error("エクスポートエラー: {0}")]
    Export(#[from] polars::prelude::PolarsError),

    #[error("シリアライズエラー: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("データベースエラー: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),
}

impl ScraperError {
    /// ブラウザ起動前に検出されたエラーか
    pub fn is_launch_error(&self) -> bool {
        matches!(
            self,
            ScraperError::DriverNotFound(_) | ScraperError::BrowserNotFound(_)
        )
    }
}
