pub mod api; // Backend HTTP client + worker thread
pub mod app;
pub mod config;
pub mod event;
pub mod form; // Form controller (view-model + state machine)
pub mod ui;

pub use app::App;
pub use config::Config;
pub use form::{FormController, UiState};

use color_eyre::Result;
use crossterm::event::{self as crossterm_event, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

// Ensure .env is loaded for tests before anything else runs in the test process.
#[cfg(test)]
#[ctor::ctor]
fn load_dotenv_for_tests() {
    let _ = dotenvy::dotenv();
}

/// アプリケーションのメインループを実行
pub fn run(mut terminal: DefaultTerminal, config: Config) -> Result<()> {
    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    let mut app = App::new(config)?;

    loop {
        // 応答の取り込みとエラーパネルのタイマー
        app.update(Instant::now());

        // 画面を描画
        terminal.draw(|f| ui::render(f, &app))?;

        // poll_interval 以内にイベントが来たら処理
        if crossterm_event::poll(poll_interval)? {
            match crossterm_event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match event::handle_key(&mut app, key, Instant::now()) {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => {
                            // エラーが発生した場合はフォームを初期化して継続
                            tracing::error!("Error handling key: {:?}", e);
                            app.reset();
                        }
                    }
                }
                Event::Resize(_, _) => {
                    // 次ループで再描画されるので特別な処理なし
                }
                _ => {}
            }
        }
    }
    tracing::info!(target: "app", elapsed_secs = app.elapsed_time().as_secs_f32(), "exiting");
    Ok(())
}
