//! 天気レポートモジュール
//!
//! 描画済みの予報ページを解析して7日分のレポートを組み立てる

mod extract;
mod types;

pub use extract::{parse_report, CARD_SELECTOR};
pub use types::{
    DayPart, WeatherBlock, WeatherReport, WeatherRow, PARTS_PER_DAY, REPORT_DAYS,
    WARNING_PRESSURE_DROP, WARNING_PRESSURE_RAISE, WARNING_PRESSURE_UNSTABLE,
};

#[cfg(test)]
pub(crate) use extract::tests as fixtures;
