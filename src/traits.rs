use async_trait::async_trait;

use crate::error::ScraperError;
use crate::weather::{parse_report, WeatherReport};

/// ページ取得とDOM解析の境界
///
/// 実ブラウザ実装とテスト用の静的ページ実装がこれを満たす。
#[async_trait]
pub trait Scraper: Send + Sync {
    /// ブラウザ初期化
    async fn initialize(&mut self) -> Result<(), ScraperError>;

    /// ページを開き、予報カードの描画を待って描画済みHTMLを返す
    async fn load(&mut self, url: &str) -> Result<String, ScraperError>;

    /// リソース解放
    async fn close(&mut self) -> Result<(), ScraperError>;

    /// 一括実行（initialize → load → close → 抽出）
    ///
    /// 途中で失敗してもブラウザは必ず閉じる。
    async fn execute(&mut self, url: &str) -> Result<WeatherReport, ScraperError> {
        if let Err(e) = self.initialize().await {
            let _ = self.close().await;
            return Err(e);
        }

        let loaded = self.load(url).await;
        let closed = self.close().await;
        let html = loaded?;
        closed?;

        parse_report(&html)
    }
}
