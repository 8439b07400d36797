//! アプリケーション設定と定数

use color_eyre::{eyre::eyre, eyre::WrapErr, Result};
use std::path::Path;
use std::time::Duration;

/// 開発用バックエンドのURL（Flaskのデフォルトポート）
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// 接続先URLを上書きする環境変数
pub const ENV_API_URL: &str = "AFFIRM_API_URL";
/// リクエストタイムアウト（秒）
pub const ENV_TIMEOUT_SECS: &str = "AFFIRM_TIMEOUT_SECS";
/// エラーパネルの表示時間（秒）
pub const ENV_ERROR_DISPLAY_SECS: &str = "AFFIRM_ERROR_DISPLAY_SECS";

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// バックエンドAPIのベースURL（末尾の `/` なし）
    pub api_url: String,
    /// HTTPリクエスト全体のタイムアウト
    pub request_timeout: Duration,
    /// エラーパネルを自動で隠すまでの時間
    pub error_display: Duration,
    /// イベントポーリング間隔（ミリ秒）
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            // NOTE: Keep in sync with tests (tests/config_tests.rs).
            request_timeout: Duration::from_secs(10),
            error_display: Duration::from_secs(5),
            poll_interval_ms: 100,
        }
    }
}

impl Config {
    /// 新しい設定インスタンスを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続先URLを指定して作成
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: normalize_url(&api_url.into()),
            ..Self::default()
        }
    }

    /// 環境変数で既定値を上書きした設定を作成（`.env` は呼び出し側で読み込み済みの想定）
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 指定の `.env` ファイルから設定を読み込む。プロセス環境は変更しない。
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let vars: Vec<(String, String)> = dotenvy::from_path_iter(path)
            .wrap_err_with(|| format!("reading {}", path.display()))?
            .collect::<std::result::Result<_, _>>()
            .wrap_err_with(|| format!("parsing {}", path.display()))?;
        Self::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_API_URL) {
            let url = normalize_url(&url);
            if url.is_empty() {
                return Err(eyre!("{ENV_API_URL} is empty"));
            }
            config.api_url = url;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            config.request_timeout = parse_secs(ENV_TIMEOUT_SECS, &secs)?;
        }
        if let Some(secs) = lookup(ENV_ERROR_DISPLAY_SECS) {
            config.error_display = parse_secs(ENV_ERROR_DISPLAY_SECS, &secs)?;
        }
        Ok(config)
    }

    /// ベースURLにパスを連結
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .wrap_err_with(|| format!("{key} must be a whole number of seconds, got {raw:?}"))?;
    Ok(Duration::from_secs(secs))
}
