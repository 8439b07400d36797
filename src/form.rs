//! フォームコントローラ
//!
//! 入力欄（気分・状況）と表示状態 [`UiState`] を1か所で持つビューモデル。
//! I/O は一切行わず、送信時は [`SubmitOutcome::Dispatch`] を返して呼び出し側に
//! HTTP を任せる。応答は世代番号付きで [`FormController::complete`] に戻す。
//!
//! 時刻は引数で受け取るので、エラーパネルの自動非表示もテストから決定的に扱える。

use crate::api::error::ApiError;
use crate::api::types::{Affirmation, AffirmationRequest, Mood};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 表示状態。常にどれか一つだけ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState {
    Idle,
    Loading,
    Result(Affirmation),
    Error(String),
}

/// 3つのパネルの可視状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Panels {
    pub loading: bool,
    pub result: bool,
    pub error: bool,
}

impl Panels {
    pub fn visible_count(&self) -> usize {
        [self.loading, self.result, self.error].iter().filter(|v| **v).count()
    }
}

/// フォーカス対象
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Mood,
    Situation,
    Submit,
}

impl Field {
    pub fn next(self) -> Field {
        match self {
            Field::Mood => Field::Situation,
            Field::Situation => Field::Submit,
            Field::Submit => Field::Mood,
        }
    }

    pub fn prev(self) -> Field {
        match self {
            Field::Mood => Field::Submit,
            Field::Situation => Field::Mood,
            Field::Submit => Field::Situation,
        }
    }
}

/// `submit` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 検証エラー。ネットワークには出ない。
    Rejected,
    /// 処理中のため無視
    Busy,
    /// この世代番号でリクエストを1回送ること
    Dispatch { generation: u64, request: AffirmationRequest },
}

#[derive(Debug, Clone)]
pub struct FormController {
    pub mood: Option<Mood>,
    pub situation: String,
    pub focus: Field,
    state: UiState,
    generation: u64,
    error_display: Duration,
    error_deadline: Option<Instant>,
}

impl FormController {
    pub fn new(error_display: Duration) -> Self {
        Self {
            mood: None,
            situation: String::new(),
            focus: Field::Mood,
            state: UiState::Idle,
            generation: 0,
            error_display,
            error_deadline: None,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 送信ボタンが押せるか（処理中は無効）
    pub fn submit_enabled(&self) -> bool {
        !matches!(self.state, UiState::Loading)
    }

    pub fn error_deadline(&self) -> Option<Instant> {
        self.error_deadline
    }

    /// 状態から可視パネルへの純粋な写像
    pub fn panels(&self) -> Panels {
        match self.state {
            UiState::Idle => Panels::default(),
            UiState::Loading => Panels { loading: true, ..Panels::default() },
            UiState::Result(_) => Panels { result: true, ..Panels::default() },
            UiState::Error(_) => Panels { error: true, ..Panels::default() },
        }
    }

    /// 現在の入力値で送信する。Enter キー経由でも同じ経路を通る。
    pub fn submit(&mut self, now: Instant) -> SubmitOutcome {
        if !self.submit_enabled() {
            debug!(target: "form", generation = self.generation, "submit ignored while loading");
            return SubmitOutcome::Busy;
        }
        let Some(mood) = self.mood else {
            self.show_error(ApiError::Validation.user_message(), now);
            return SubmitOutcome::Rejected;
        };

        let request = AffirmationRequest::new(mood, &self.situation);
        self.generation += 1;
        self.set_state(UiState::Loading);
        info!(target: "form", generation = self.generation, mood = %request.mood, "submit");
        SubmitOutcome::Dispatch { generation: self.generation, request }
    }

    /// 応答を反映する。古い世代の応答は捨てて `false` を返す。
    pub fn complete(
        &mut self,
        generation: u64,
        result: Result<Affirmation, ApiError>,
        now: Instant,
    ) -> bool {
        if generation != self.generation || !matches!(self.state, UiState::Loading) {
            warn!(target: "form", generation, current = self.generation, "stale response dropped");
            return false;
        }
        match result {
            Ok(affirmation) => self.set_state(UiState::Result(affirmation)),
            Err(e) => {
                if e.is_transport() {
                    warn!(target: "form", error = %e, "transport failure");
                }
                self.show_error(e.user_message(), now);
            }
        }
        true
    }

    /// 初期状態に戻す。処理中でも有効で、飛行中の応答は無効化される。
    pub fn reset(&mut self) {
        self.generation += 1;
        self.mood = None;
        self.situation.clear();
        self.focus = Field::Mood;
        self.set_state(UiState::Idle);
        debug!(target: "form", generation = self.generation, "reset");
    }

    /// 時間経過の処理。期限を過ぎたエラーパネルを隠す。
    pub fn tick(&mut self, now: Instant) {
        if let Some(deadline) = self.error_deadline {
            if now >= deadline {
                debug!(target: "form", "error panel auto-hidden");
                self.set_state(UiState::Idle);
            }
        }
    }

    /// エラーを表示し、自動非表示の期限を張り直す
    pub fn show_error(&mut self, message: impl Into<String>, now: Instant) {
        self.set_state(UiState::Error(message.into()));
        self.error_deadline = Some(now + self.error_display);
    }

    fn set_state(&mut self, state: UiState) {
        self.error_deadline = None;
        self.state = state;
    }

    // ===== 入力操作 =====

    pub fn next_mood(&mut self) {
        self.mood = Mood::cycle_next(self.mood);
    }

    pub fn prev_mood(&mut self) {
        self.mood = Mood::cycle_prev(self.mood);
    }

    pub fn push_char(&mut self, ch: char) {
        self.situation.push(ch);
    }

    pub fn pop_char(&mut self) {
        self.situation.pop();
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }
}

impl Default for FormController {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
