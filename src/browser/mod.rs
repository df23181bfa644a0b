//! ブラウザセッション管理
//!
//! 起動パスを検証し、chromiumoxide でページを開いて描画済みHTMLを取得する

mod launch;
mod session;

pub use launch::{LaunchPlan, DEFAULT_DRIVER_NAME};
pub use session::ChromeScraper;
