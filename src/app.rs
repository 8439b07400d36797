//! アプリケーション状態管理モジュール

use crate::api::error::UNREACHABLE_MESSAGE;
use crate::api::{start_api_worker, AffirmationRecord, ApiClient, Job, Outcome};
use crate::config::Config;
use crate::form::{FormController, SubmitOutcome};
use color_eyre::Result;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;
use tracing::{debug, error, info};

/// 履歴ビューの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView {
    Hidden,
    Loading,
    Loaded(Vec<AffirmationRecord>),
    Failed(String),
}

/// アプリケーションの状態を管理する構造体
pub struct App {
    /// フォームと表示状態
    pub form: FormController,
    /// 履歴ビュー
    pub history: HistoryView,
    /// 履歴取得の世代番号。開閉のたびに進める。
    history_generation: u64,
    /// 設定
    pub config: Config,
    /// アプリケーション開始時刻
    pub started: Instant,
    /// ジョブ送信用チャンネル
    pub tx: Sender<Job>,
    /// 結果受信用チャンネル
    pub rx: Receiver<Outcome>,
}

impl App {
    /// ワーカーを起動し、疎通確認を投げた状態で作成
    pub fn new(config: Config) -> Result<Self> {
        let client = ApiClient::new(config.clone())?;
        // ジョブ送信用チャンネル
        let (tx_job, rx_job) = mpsc::channel::<Job>();
        // 結果受信用チャンネル
        let (tx_outcome, rx_outcome) = mpsc::channel::<Outcome>();

        // APIワーカーをバックグラウンドで開始（ハンドルは切り離す）
        start_api_worker(rx_job, tx_outcome, client)?;

        let app = Self::with_channels(config, tx_job, rx_outcome);
        info!(target: "app", api_url = %app.config.api_url, "connecting to backend");
        app.send(Job::Probe);
        Ok(app)
    }

    /// 任意のチャンネルで作成（ワーカーなしのテスト用にも使う）
    pub fn with_channels(config: Config, tx: Sender<Job>, rx: Receiver<Outcome>) -> Self {
        Self {
            form: FormController::new(config.error_display),
            history: HistoryView::Hidden,
            history_generation: 0,
            config,
            started: Instant::now(),
            tx,
            rx,
        }
    }

    /// 生成リクエストを送信
    pub fn submit(&mut self, now: Instant) -> SubmitOutcome {
        let outcome = self.form.submit(now);
        if let SubmitOutcome::Dispatch { generation, request } = &outcome {
            let job = Job::Generate { generation: *generation, request: request.clone() };
            if !self.send(job) {
                self.form.show_error(UNREACHABLE_MESSAGE, now);
            }
        }
        outcome
    }

    /// フォームを初期化
    pub fn reset(&mut self) {
        self.form.reset();
    }

    /// 履歴ビューの開閉。開くたびに取り直す。
    pub fn toggle_history(&mut self) {
        self.history_generation += 1;
        if matches!(self.history, HistoryView::Hidden) {
            self.history = HistoryView::Loading;
            if !self.send(Job::History { generation: self.history_generation }) {
                self.history = HistoryView::Failed(UNREACHABLE_MESSAGE.to_string());
            }
        } else {
            self.history = HistoryView::Hidden;
        }
    }

    /// フレーム毎の非ブロッキング更新（応答の取り込みとタイマー）
    pub fn update(&mut self, now: Instant) {
        while let Ok(outcome) = self.rx.try_recv() {
            self.apply(outcome, now);
        }
        self.form.tick(now);
    }

    fn apply(&mut self, outcome: Outcome, now: Instant) {
        match outcome {
            Outcome::Generated { generation, result } => {
                self.form.complete(generation, result, now);
            }
            Outcome::History { generation, result } => {
                // 閉じた後や開き直す前の取得結果は捨てる
                if generation != self.history_generation
                    || !matches!(self.history, HistoryView::Loading)
                {
                    debug!(
                        target: "app",
                        generation,
                        current = self.history_generation,
                        "stale history dropped"
                    );
                    return;
                }
                self.history = match result {
                    Ok(records) => {
                        info!(target: "app", count = records.len(), "history_loaded");
                        HistoryView::Loaded(records)
                    }
                    Err(e) => {
                        error!(target: "app", error = %e, "history_failed");
                        HistoryView::Failed(e.user_message())
                    }
                };
            }
        }
    }

    fn send(&self, job: Job) -> bool {
        match self.tx.send(job) {
            Ok(()) => true,
            Err(e) => {
                error!(target: "app", "worker unavailable: {e}");
                false
            }
        }
    }

    /// アプリケーション開始からの経過時間を取得
    pub fn elapsed_time(&self) -> std::time::Duration {
        self.started.elapsed()
    }
}
