//! Yandex天気スクレイパーライブラリ
//!
//! - 都市名を座標に解決してYandex天気の詳細ページURLを構築
//! - chromiumoxide でページを描画し、7日分の予報を抽出
//! - CSVダンプと履歴スプレッドシートに書き出し、成否をSQLiteに記録
//!
//! # 使用例
//!
//! ```rust,ignore
//! use yaws::{CityDirectory, ScraperConfig, WeatherRequest, WeatherService};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ScraperConfig::new().with_output_dir("./out");
//!     let cities = CityDirectory::load(&config.city_db_path).unwrap();
//!     let city = cities.lookup("Москва")[0].clone();
//!
//!     let mut service = WeatherService::new();
//!     let request = WeatherRequest::new("Москва", city).with_config(config);
//!
//!     let outcome = service.call(request).await.unwrap();
//!     println!("履歴: {:?}", outcome.history_path);
//! }
//! ```

pub mod browser;
pub mod city;
pub mod config;
pub mod error;
pub mod export;
pub mod ledger;
pub mod pipeline;
pub mod service;
pub mod traits;
pub mod urls;
pub mod weather;

// 主要な型をリエクスポート
pub use browser::{ChromeScraper, LaunchPlan};
pub use city::{CityData, CityDirectory};
pub use config::ScraperConfig;
pub use error::ScraperError;
pub use export::OutputRow;
pub use ledger::RunLedger;
pub use pipeline::{WeatherOutcome, WeatherRequest};
pub use service::WeatherService;
pub use traits::Scraper;
pub use weather::{WeatherBlock, WeatherReport, WeatherRow};
