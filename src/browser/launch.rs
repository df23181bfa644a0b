use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ScraperConfig;
use crate::error::ScraperError;

/// `driver_dir` 内の既定ドライバ名
#[cfg(windows)]
pub const DEFAULT_DRIVER_NAME: &str = "chrome-headless-shell.exe";
#[cfg(not(windows))]
pub const DEFAULT_DRIVER_NAME: &str = "chrome-headless-shell";

/// 起動する実行ファイルの決定結果
///
/// ブラウザプロセスを起動する前に作られ、存在しないパスはここで弾かれる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    /// DevToolsを話すドライバ（chrome-headless-shell 等）
    pub driver: PathBuf,
    /// 明示指定されたブラウザ
    pub browser: Option<PathBuf>,
}

impl LaunchPlan {
    pub fn resolve(config: &ScraperConfig) -> Result<Self, ScraperError> {
        let driver = config
            .driver_path
            .clone()
            .unwrap_or_else(|| config.driver_dir.join(DEFAULT_DRIVER_NAME));

        if let Some(browser) = &config.browser_path {
            if !browser.is_file() {
                return Err(ScraperError::BrowserNotFound(browser.clone()));
            }
        }

        // ブラウザ指定がなければドライバ自体を起動するので必須。
        // 明示指定されたドライバは常に検証する。
        let driver_required = config.browser_path.is_none() || config.driver_path.is_some();
        if driver_required && !driver.is_file() {
            return Err(ScraperError::DriverNotFound(driver));
        }

        if let (Some(browser), Some(driver)) = (&config.browser_path, &config.driver_path) {
            debug!(
                "Browser {:?} is launched directly; driver {:?} is only checked",
                browser, driver
            );
        }

        let plan = Self {
            driver,
            browser: config.browser_path.clone(),
        };
        debug!("Launch plan: {:?}", plan);
        Ok(plan)
    }

    /// 実際に起動する実行ファイル
    pub fn executable(&self) -> &Path {
        self.browser.as_deref().unwrap_or(&self.driver)
    }
}
