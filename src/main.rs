//! `yaws` コマンド
//!
//! 引数解析・ログ初期化・都市の対話選択を担当し、処理本体はライブラリに任せる。

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_logging(cli.debug);
    cli.run().await
}

fn init_logging(debug: bool) {
    let default = if debug { "info,yaws=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
