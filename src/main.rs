use affirm_tui::Config;
use color_eyre::Result;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    color_eyre::install()?;

    // Load .env (optional). AFFIRM_API_URL などをローカルの .env から読めるようにする。
    // If the file doesn't exist, ignore the error.
    let _ = dotenvy::dotenv();

    // ログ: 標準出力は使わず、ファイルへのみ出力してratatuiと衝突しないようにする
    let file_appender = rolling::daily("logs", "app.log");
    // _guardはdropするとログが失われるため、main終了まで保持
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // ファイルにANSIカラー不要
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    let config = Config::from_env()?;
    tracing::info!(target: "app", api_url = %config.api_url, "frontend starting");

    let terminal = ratatui::init();
    let res = affirm_tui::run(terminal, config);
    ratatui::restore();
    res
}
