//! イベント処理モジュール

use crate::app::App;
use crate::form::Field;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

/// キーイベントを処理
///
/// # Returns
/// - `Ok(true)` - アプリケーションを終了
/// - `Ok(false)` - 処理を継続
/// - `Err(_)` - エラーが発生
pub fn handle_key(app: &mut App, key: KeyEvent, now: Instant) -> Result<bool> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return Ok(true),
        KeyCode::Char('c') if ctrl => return Ok(true),
        // "New Affirmation" ボタン相当
        KeyCode::Char('n') if ctrl => app.reset(),
        KeyCode::F(2) => app.toggle_history(),
        KeyCode::Tab => app.form.focus_next(),
        KeyCode::BackTab => app.form.focus_prev(),
        KeyCode::Enter => match app.form.focus {
            Field::Mood => app.form.focus_next(),
            // 状況欄での Enter は送信ボタンと同じ
            Field::Situation | Field::Submit => {
                app.submit(now);
            }
        },
        KeyCode::Up | KeyCode::Left if app.form.focus == Field::Mood => app.form.prev_mood(),
        KeyCode::Down | KeyCode::Right if app.form.focus == Field::Mood => app.form.next_mood(),
        KeyCode::Backspace if app.form.focus == Field::Situation => app.form.pop_char(),
        KeyCode::Char(ch) if app.form.focus == Field::Situation && !ctrl => app.form.push_char(ch),
        _ => {}
    }
    Ok(false)
}
