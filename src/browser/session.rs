use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::Scraper;
use crate::weather::CARD_SELECTOR;

use super::launch::LaunchPlan;

/// 予報カード出現チェックの間隔
const CARD_POLL_INTERVAL_MS: u64 = 250;

/// chromiumoxide でブラウザを操作するスクレイパー
pub struct ChromeScraper {
    config: ScraperConfig,
    plan: LaunchPlan,
    browser: Option<Browser>,
    page: Option<Arc<Page>>,
    handler: Option<JoinHandle<()>>,
}

impl ChromeScraper {
    pub fn new(config: ScraperConfig, plan: LaunchPlan) -> Self {
        Self {
            config,
            plan,
            browser: None,
            page: None,
            handler: None,
        }
    }

    /// 起動パスを検証してから作成（ブラウザはまだ起動しない）
    pub fn from_config(config: ScraperConfig) -> Result<Self, ScraperError> {
        let plan = LaunchPlan::resolve(&config)?;
        Ok(Self::new(config, plan))
    }

    pub fn plan(&self) -> &LaunchPlan {
        &self.plan
    }

    fn get_page(&self) -> Result<&Arc<Page>, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("ブラウザが初期化されていません".into()))
    }

    /// 予報カードが現れるまで待機
    async fn wait_for_cards(&self, page: &Page) -> Result<(), ScraperError> {
        let timeout = self.config.page_timeout;
        let start = Instant::now();

        loop {
            match page.find_element(CARD_SELECTOR).await {
                Ok(_) => {
                    debug!("Forecast cards present after {:?}", start.elapsed());
                    return Ok(());
                }
                Err(e) => debug!("Forecast cards not present yet: {}", e),
            }

            if start.elapsed() > timeout {
                if self.config.debug {
                    self.log_screenshot(page).await;
                }
                return Err(ScraperError::Timeout(format!(
                    "{}が{}秒以内に表示されませんでした",
                    CARD_SELECTOR,
                    timeout.as_secs_f32()
                )));
            }

            tokio::time::sleep(Duration::from_millis(CARD_POLL_INTERVAL_MS)).await;
        }
    }

    async fn log_screenshot(&self, page: &Page) {
        match page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
        {
            Ok(screenshot) => {
                use base64::Engine;
                let encoded = base64::engine::general_purpose::STANDARD.encode(&screenshot);
                debug!("Page screenshot: data:image/png;base64,{}", encoded);
            }
            Err(e) => debug!("Failed to take screenshot: {}", e),
        }
    }
}

#[async_trait]
impl Scraper for ChromeScraper {
    async fn initialize(&mut self) -> Result<(), ScraperError> {
        let executable = self.plan.executable().to_path_buf();
        info!("Launching browser: {:?}", executable);

        let mut builder = BrowserConfig::builder()
            .chrome_executable(&executable)
            .window_size(1280, 800)
            .request_timeout(self.config.request_timeout)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");

        if !self.config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(format!("ブラウザ設定エラー: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        // ブラウザイベントハンドラをバックグラウンドで実行
        self.handler = Some(tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        }));

        // new_page が失敗しても close() で終了できるよう先に保持する
        let browser = self.browser.insert(browser);
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        self.page = Some(Arc::new(page));

        info!("Browser initialized");
        Ok(())
    }

    async fn load(&mut self, url: &str) -> Result<String, ScraperError> {
        let page = self.get_page()?.clone();
        info!("Opening {}", url);

        page.goto(url)
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;

        self.wait_for_cards(&page).await?;

        let html = page
            .content()
            .await
            .map_err(|e| ScraperError::Navigation(format!("ページ内容の取得: {}", e)))?;
        debug!("Rendered page: {} bytes", html.len());

        Ok(html)
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        self.page = None;

        if let Some(mut browser) = self.browser.take() {
            info!("Closing browser...");
            if let Err(e) = browser.close().await {
                warn!("Browser close failed: {}", e);
            }
            if let Err(e) = browser.wait().await {
                warn!("Waiting for browser exit failed: {}", e);
            }
        }

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        Ok(())
    }
}
