//! APIワーカー（TUIとは別スレッドで動く）
//!
//! UIスレッドから [`Job`] を受け取り、ジョブごとにTokioタスクを立てて処理し、
//! 結果を [`Outcome`] として返す。古い世代の応答を捨てるのはUI側の責務。

use crate::api::client::{log_probe, ApiClient};
use crate::api::error::ApiError;
use crate::api::types::{Affirmation, AffirmationRecord, AffirmationRequest};
use color_eyre::{eyre::WrapErr, Result};
use std::sync::mpsc::{Receiver, Sender};
use std::thread::JoinHandle;
use tokio::runtime::Runtime;
use tracing::{error, info};

/// ワーカーへの依頼
#[derive(Debug, Clone)]
pub enum Job {
    Generate { generation: u64, request: AffirmationRequest },
    Probe,
    History { generation: u64 },
}

/// ワーカーからの結果
#[derive(Debug)]
pub enum Outcome {
    Generated { generation: u64, result: Result<Affirmation, ApiError> },
    History { generation: u64, result: Result<Vec<AffirmationRecord>, ApiError> },
}

/// APIワーカーを開始
pub fn start_api_worker(
    rx_job: Receiver<Job>,
    tx_outcome: Sender<Outcome>,
    client: ApiClient,
) -> Result<JoinHandle<()>> {
    // 専用スレッド内でTokioランタイムを構築
    let rt = Runtime::new().wrap_err("building tokio runtime for api worker")?;
    let handle = std::thread::Builder::new()
        .name("api-worker".into())
        .spawn(move || {
            rt.block_on(async move {
                while let Ok(job) = rx_job.recv() {
                    info!(target: "api", ?job, "job_received");
                    let client = client.clone();
                    let tx = tx_outcome.clone();
                    tokio::spawn(async move { run_job(&client, job, &tx).await });
                }
                info!(target: "api", "job channel closed, worker exiting");
            });
        })
        .wrap_err("spawning api worker thread")?;
    Ok(handle)
}

async fn run_job(client: &ApiClient, job: Job, tx: &Sender<Outcome>) {
    let outcome = match job {
        Job::Generate { generation, request } => {
            let result = client.generate(&request).await;
            match &result {
                Ok(a) => info!(target: "api", generation, len = a.text.len(), "affirmation_ready"),
                Err(e) => error!(target: "api", generation, error = %e, "affirmation_failed"),
            }
            Outcome::Generated { generation, result }
        }
        Job::Probe => {
            log_probe(client).await;
            return;
        }
        Job::History { generation } => Outcome::History {
            generation,
            result: client.list_affirmations().await,
        },
    };
    // UIが終了している場合は送信エラーを無視
    let _ = tx.send(outcome);
}
