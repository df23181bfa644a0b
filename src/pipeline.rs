//! スクレイプ → 書き出し → 履歴記録 の一連の処理

use std::path::PathBuf;

use chrono::Local;
use tracing::{info, warn};

use crate::city::CityData;
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::export::{self, DumpFiles, OutputRow};
use crate::ledger::RunLedger;
use crate::traits::Scraper;
use crate::urls::weather_url;
use crate::weather::WeatherReport;

/// 天気取得リクエスト
#[derive(Debug, Clone)]
pub struct WeatherRequest {
    /// ユーザーが入力した都市名（履歴記録用）
    pub query: String,
    pub city: CityData,
    pub config: ScraperConfig,
}

impl WeatherRequest {
    pub fn new(query: impl Into<String>, city: CityData) -> Self {
        Self {
            query: query.into(),
            city,
            config: ScraperConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScraperConfig) -> Self {
        self.config = config;
        self
    }
}

/// 天気取得結果
#[derive(Debug, Clone)]
pub struct WeatherOutcome {
    pub url: String,
    pub report: WeatherReport,
    pub dump: DumpFiles,
    pub history_path: PathBuf,
    pub row: OutputRow,
}

/// 任意の `Scraper` でパイプラインを実行
///
/// 抽出まで成功した場合のみ書き出しを行い、履歴行の追記は最後に1回だけ行う。
pub async fn run<S: Scraper + ?Sized>(
    scraper: &mut S,
    request: &WeatherRequest,
) -> Result<WeatherOutcome, ScraperError> {
    let url = weather_url(&request.city);
    info!("Fetching weather for {} from {}", request.city, url);

    let report = scraper.execute(&url).await?;
    info!("Extracted {} forecast days", report.len());

    let now = Local::now();
    let output_dir = &request.config.output_dir;
    let dump = export::write_dump(&report, output_dir, now)?;

    let row = OutputRow::new(&report, &request.city, now);
    let history_path = export::append_history(&row, output_dir)?;

    Ok(WeatherOutcome {
        url,
        report,
        dump,
        history_path,
        row,
    })
}

/// 実行結果を履歴DBに記録（DB無効時は何もしない）
///
/// 記録の失敗は実行結果を変えず、警告ログのみ出す。
pub fn record_run(config: &ScraperConfig, query: &str, success: bool) {
    let Some(path) = &config.database_path else {
        return;
    };

    match RunLedger::open(path).and_then(|ledger| ledger.record(query, success, None)) {
        Ok(_) => info!("Recorded run result: city={}, success={}", query, success),
        Err(e) => warn!("Failed to record run result in {:?}: {}", path, e),
    }
}
