//! UI描画モジュール

use crate::app::{App, HistoryView};
use crate::form::{Field, FormController, UiState};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

/// メインUI描画関数
pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // ヘッダ
            Constraint::Length(3), // 気分
            Constraint::Length(3), // 状況
            Constraint::Length(1), // 送信ボタン
            Constraint::Min(5),    // パネル
            Constraint::Length(1), // フッター
        ])
        .split(area);

    render_header(f, chunks[0]);
    render_mood(f, &app.form, chunks[1]);
    render_situation(f, &app.form, chunks[2]);
    render_submit(f, &app.form, chunks[3]);
    match &app.history {
        HistoryView::Hidden => render_panel(f, &app.form, chunks[4]),
        history => render_history(f, history, chunks[4]),
    }
    render_footer(f, app, chunks[5]);
}

/// ヘッダー/ガイド部分を描画
fn render_header(f: &mut Frame, area: Rect) {
    let guide = vec![
        Line::from("Wellness Affirmation Generator".bold().fg(Color::Cyan)),
        Line::from("Tab で項目移動 / ↑↓ で気分を選択 / Enter で生成"),
        Line::from("Ctrl+N で新しく / F2 で履歴 / Esc or Ctrl+C で終了"),
    ];
    let guide_widget = Paragraph::new(guide)
        .block(Block::default().borders(Borders::ALL).title("Guide"));
    f.render_widget(guide_widget, area);
}

fn field_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default().borders(Borders::ALL).title(title).border_style(style)
}

/// 気分セレクタを描画
fn render_mood(f: &mut Frame, form: &FormController, area: Rect) {
    let text = match form.mood {
        Some(m) => format!("◀ {m} ▶"),
        None => "◀ -- select how you're feeling -- ▶".to_string(),
    };
    let widget = Paragraph::new(text).block(field_block("Mood", form.focus == Field::Mood));
    f.render_widget(widget, area);
}

/// 状況入力欄を描画
fn render_situation(f: &mut Frame, form: &FormController, area: Rect) {
    let mut current = form.situation.clone();
    if form.focus == Field::Situation {
        current.push('_'); // 簡易カーソル表示
    }
    let widget = Paragraph::new(current)
        .block(field_block("Situation (optional)", form.focus == Field::Situation));
    f.render_widget(widget, area);
}

fn render_submit(f: &mut Frame, form: &FormController, area: Rect) {
    let label = if form.submit_enabled() {
        "[ Generate Affirmation ]"
    } else {
        "[ Generating... ]"
    };
    let mut style = Style::default();
    if !form.submit_enabled() {
        style = style.fg(Color::DarkGray);
    } else if form.focus == Field::Submit {
        style = style.fg(Color::Black).bg(Color::Yellow).bold();
    }
    let widget = Paragraph::new(Span::styled(label, style)).alignment(Alignment::Center);
    f.render_widget(widget, area);
}

/// 状態に応じてパネルを一つだけ描画
fn render_panel(f: &mut Frame, form: &FormController, area: Rect) {
    let panels = form.panels();
    let widget = match form.state() {
        UiState::Idle => Paragraph::new("(気分を選んで Enter)")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL)),
        UiState::Loading => Paragraph::new("Generating your affirmation...")
            .block(Block::default().borders(Borders::ALL).title("Loading")),
        UiState::Result(a) => {
            let mut lines = vec![Line::from(Span::styled(
                a.text.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ))];
            if a.ai_generated == Some(true) {
                lines.push(Line::from(""));
                lines.push(Line::from("✨ AI generated".fg(Color::Magenta)));
            }
            lines.push(Line::from(""));
            lines.push(Line::from("Ctrl+N: New Affirmation".fg(Color::DarkGray)));
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("Your Affirmation"))
        }
        UiState::Error(msg) => Paragraph::new(msg.clone())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Error")),
    };
    debug_assert!(panels.visible_count() <= 1);
    f.render_widget(widget, area);
}

fn render_history(f: &mut Frame, history: &HistoryView, area: Rect) {
    let lines: Vec<Line> = match history {
        HistoryView::Hidden => Vec::new(),
        HistoryView::Loading => vec![Line::from("読み込み中...")],
        HistoryView::Failed(msg) => {
            vec![Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Red)))]
        }
        HistoryView::Loaded(records) if records.is_empty() => {
            vec![Line::from("(まだ履歴はありません)")]
        }
        HistoryView::Loaded(records) => records
            .iter()
            .rev()
            .map(|r| {
                Line::from(vec![
                    Span::styled(format!("#{} ", r.id), Style::default().fg(Color::DarkGray)),
                    Span::styled(format!("[{}] ", r.mood), Style::default().fg(Color::Cyan)),
                    Span::raw(r.affirmation.clone()),
                ])
            })
            .collect(),
    };
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("History (F2 to close)"));
    f.render_widget(widget, area);
}

/// フッター部分を描画
fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let elapsed = app.elapsed_time().as_secs_f32();
    let footer = Paragraph::new(Line::from(vec![Span::raw(format!(
        "{}  経過: {elapsed:.1}s",
        app.config.api_url
    ))]))
    .alignment(Alignment::Right);
    f.render_widget(footer, area);
}
