use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::Service;
use tracing::{error, info};

use crate::browser::ChromeScraper;
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::pipeline::{self, WeatherOutcome, WeatherRequest};
use crate::traits::Scraper;

/// 設定からスクレイパーを作る関数
pub type MakeScraper =
    Arc<dyn Fn(&ScraperConfig) -> Result<Box<dyn Scraper>, ScraperError> + Send + Sync>;

/// tower::Serviceを実装した天気取得サービス
///
/// 1回の呼び出しでパイプライン全体を実行し、成否を履歴DBに記録する。
#[derive(Clone)]
pub struct WeatherService {
    make_scraper: MakeScraper,
}

impl Default for WeatherService {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherService {
    /// chromiumoxide を使うサービス
    pub fn new() -> Self {
        Self::with_scraper(|config| {
            // 起動パスの検証はここで行われ、失敗時はブラウザを起動しない
            let scraper = ChromeScraper::from_config(config.clone())?;
            Ok(Box::new(scraper) as Box<dyn Scraper>)
        })
    }

    pub fn with_scraper<F>(make_scraper: F) -> Self
    where
        F: Fn(&ScraperConfig) -> Result<Box<dyn Scraper>, ScraperError> + Send + Sync + 'static,
    {
        Self {
            make_scraper: Arc::new(make_scraper),
        }
    }
}

impl Service<WeatherRequest> for WeatherService {
    type Response = WeatherOutcome;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: WeatherRequest) -> Self::Future {
        info!("Weather request received: city={}", req.city);
        let make_scraper = self.make_scraper.clone();

        Box::pin(async move {
            let result = match make_scraper(&req.config) {
                Ok(mut scraper) => pipeline::run(scraper.as_mut(), &req).await,
                Err(e) => Err(e),
            };

            match &result {
                Ok(outcome) => info!(
                    "Weather request completed: dump={:?}, history={:?}",
                    outcome.dump.csv, outcome.history_path
                ),
                Err(e) => error!("Weather request failed: {}", e),
            }

            pipeline::record_run(&req.config, &req.query, result.is_ok());
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::HISTORY_FILE;
    use crate::ledger::RunLedger;
    use crate::pipeline::testing::{moscow, StaticPage};
    use crate::weather::fixtures;

    fn request(dir: &std::path::Path) -> WeatherRequest {
        WeatherRequest::new("Москва", moscow()).with_config(
            ScraperConfig::new()
                .with_driver_dir(dir.join("drivers"))
                .with_output_dir(dir)
                .with_database(Some(dir.join("yaws.db"))),
        )
    }

    fn ledger_results(dir: &std::path::Path) -> Vec<bool> {
        RunLedger::open(&dir.join("yaws.db"))
            .unwrap()
            .records()
            .unwrap()
            .iter()
            .map(|r| r.result)
            .collect()
    }

    #[tokio::test]
    async fn test_service_success_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = WeatherService::with_scraper(|_| {
            Ok(Box::new(StaticPage::new(fixtures::sample_page())) as Box<dyn Scraper>)
        });

        let outcome = service.call(request(dir.path())).await.unwrap();

        assert!(outcome.history_path.ends_with(HISTORY_FILE));
        assert_eq!(ledger_results(dir.path()), vec![true]);
    }

    #[tokio::test]
    async fn test_service_failure_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = WeatherService::with_scraper(|_| {
            Ok(Box::new(StaticPage::new("<html></html>")) as Box<dyn Scraper>)
        });

        let err = service.call(request(dir.path())).await.unwrap_err();

        assert!(matches!(err, ScraperError::ElementNotFound(_)));
        assert!(!dir.path().join(HISTORY_FILE).exists());
        assert_eq!(ledger_results(dir.path()), vec![false]);
    }

    #[tokio::test]
    async fn test_missing_driver_fails_before_launch() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = WeatherService::new();

        let err = service.call(request(dir.path())).await.unwrap_err();

        assert!(err.is_launch_error());
        assert!(!dir.path().join(HISTORY_FILE).exists());
        assert_eq!(ledger_results(dir.path()), vec![false]);
    }

    #[test]
    fn test_weather_request_builder() {
        let req = WeatherRequest::new("москва", moscow())
            .with_config(ScraperConfig::new().with_headless(false));

        assert_eq!(req.query, "москва");
        assert_eq!(req.city.name, "Москва");
        assert!(!req.config.headless);
    }
}
