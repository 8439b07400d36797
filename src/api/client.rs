//! アファメーションAPIのHTTPクライアント
//!
//! * `POST /api/generate-affirmation` — 生成
//! * `GET /` — 起動時の疎通確認（結果はログのみ）
//! * `GET /api/affirmations` — サーバー側に溜まった履歴
//!
//! どの呼び出しもリトライしない。失敗は [`ApiError`] に分類して返す。

use crate::api::error::ApiError;
use crate::api::types::{
    Affirmation, AffirmationRecord, AffirmationRequest, AffirmationResponse, HistoryResponse,
    RawAffirmationResponse,
};
use crate::config::Config;
use color_eyre::{eyre::WrapErr, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

pub const GENERATE_PATH: &str = "/api/generate-affirmation";
pub const HISTORY_PATH: &str = "/api/affirmations";

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: Config,
}

impl ApiClient {
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("affirm_tui/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .wrap_err("building reqwest client for affirmation api")?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 1回だけPOSTして結果を分類する
    #[instrument(
        name = "generate_affirmation",
        skip(self),
        fields(mood = %request.mood, situation_len = request.situation.len())
    )]
    pub async fn generate(&self, request: &AffirmationRequest) -> Result<Affirmation, ApiError> {
        let url = self.config.endpoint(GENERATE_PATH);
        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(ApiError::Unreachable)?;

        let raw: RawAffirmationResponse = read_json(resp).await?;
        AffirmationResponse::from(raw).into_result()
    }

    /// 疎通確認。本文は任意のJSON。
    #[instrument(name = "probe", skip(self))]
    pub async fn probe(&self) -> Result<Value, ApiError> {
        let url = self.config.endpoint("/");
        let resp = self.client.get(&url).send().await.map_err(ApiError::Unreachable)?;
        read_json(resp).await
    }

    #[instrument(name = "list_affirmations", skip(self))]
    pub async fn list_affirmations(&self) -> Result<Vec<AffirmationRecord>, ApiError> {
        let url = self.config.endpoint(HISTORY_PATH);
        let resp = self.client.get(&url).send().await.map_err(ApiError::Unreachable)?;
        let history: HistoryResponse = read_json(resp).await?;
        if !history.success {
            return Err(ApiError::Application(history.error));
        }
        if history.count != history.affirmations.len() {
            debug!(
                target: "api",
                count = history.count,
                len = history.affirmations.len(),
                "history_count_mismatch"
            );
        }
        Ok(history.affirmations)
    }
}

/// ステータスを確認してから本文をJSONとして読む
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    // 2xx 以外は本文を読まずにステータスだけ返す
    if !status.is_success() {
        debug!(target: "api", status = %status, "response_not_ok");
        return Err(ApiError::Status(status.as_u16()));
    }
    let text = resp.text().await.map_err(ApiError::Unreachable)?;
    debug!(target: "api", status = %status, len = text.len(), "response_raw");
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

/// 起動時の疎通確認を行い、結果をログに残すだけ
pub async fn log_probe(client: &ApiClient) {
    let api_url = &client.config().api_url;
    match client.probe().await {
        Ok(body) => info!(target: "api", %api_url, %body, "backend_connection_ok"),
        Err(e) => warn!(target: "api", %api_url, error = %e, "backend_connection_failed"),
    }
}
