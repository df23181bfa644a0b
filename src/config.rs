use std::path::PathBuf;
use std::time::Duration;

/// 既定のドライバ格納ディレクトリ
pub const DEFAULT_DRIVER_DIR: &str = "./drivers";
/// 既定の都市データベース
pub const DEFAULT_CITY_DB: &str = "./city_coords.csv";
/// 既定の実行履歴データベース
pub const DEFAULT_DATABASE: &str = "yaws.db";

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// 明示指定されたブラウザ実行ファイル
    pub browser_path: Option<PathBuf>,
    /// 明示指定されたドライバ実行ファイル
    pub driver_path: Option<PathBuf>,
    /// `driver_path` 未指定時にドライバを探すディレクトリ
    pub driver_dir: PathBuf,
    pub headless: bool,
    /// 失敗時にスクリーンショットをログ出力する
    pub debug: bool,
    /// 予報カードの出現待ち時間
    pub page_timeout: Duration,
    /// CDPリクエストのタイムアウト
    pub request_timeout: Duration,
    pub output_dir: PathBuf,
    pub city_db_path: PathBuf,
    /// `None` なら実行履歴を記録しない
    pub database_path: Option<PathBuf>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            browser_path: None,
            driver_path: None,
            driver_dir: PathBuf::from(DEFAULT_DRIVER_DIR),
            headless: true,
            debug: false,
            page_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            output_dir: PathBuf::from("."),
            city_db_path: PathBuf::from(DEFAULT_CITY_DB),
            database_path: Some(PathBuf::from(DEFAULT_DATABASE)),
        }
    }
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_browser_path(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.browser_path = path.map(Into::into);
        self
    }

    pub fn with_driver_path(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.driver_path = path.map(Into::into);
        self
    }

    pub fn with_driver_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.driver_dir = dir.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_city_db(mut self, path: impl Into<PathBuf>) -> Self {
        self.city_db_path = path.into();
        self
    }

    pub fn with_database(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.database_path = path.map(Into::into);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScraperConfig::default();
        assert!(config.headless);
        assert!(config.browser_path.is_none());
        assert!(config.driver_path.is_none());
        assert_eq!(config.driver_dir, PathBuf::from("./drivers"));
        assert_eq!(config.page_timeout, Duration::from_secs(5));
        assert_eq!(config.database_path, Some(PathBuf::from("yaws.db")));
    }

    #[test]
    fn test_config_builder() {
        let config = ScraperConfig::new()
            .with_browser_path(Some("/opt/chromium/chrome"))
            .with_driver_path(None::<PathBuf>)
            .with_headless(false)
            .with_output_dir("/tmp/out")
            .with_page_timeout(Duration::from_secs(12))
            .with_database(None::<PathBuf>);

        assert_eq!(
            config.browser_path,
            Some(PathBuf::from("/opt/chromium/chrome"))
        );
        assert!(config.driver_path.is_none());
        assert!(!config.headless);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.page_timeout, Duration::from_secs(12));
        assert!(config.database_path.is_none());
    }
}
