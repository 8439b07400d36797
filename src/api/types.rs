use crate::api::error::ApiError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::{self, Display};

/// サービスが認識する気分の一覧
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Anxious,
    Stressed,
    Sad,
    Overwhelmed,
    Uncertain,
    Excited,
    Grateful,
    Confident,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::Anxious,
        Mood::Stressed,
        Mood::Sad,
        Mood::Overwhelmed,
        Mood::Uncertain,
        Mood::Excited,
        Mood::Grateful,
        Mood::Confident,
    ];

    /// ワイヤ上の表現
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Anxious => "anxious",
            Mood::Stressed => "stressed",
            Mood::Sad => "sad",
            Mood::Overwhelmed => "overwhelmed",
            Mood::Uncertain => "uncertain",
            Mood::Excited => "excited",
            Mood::Grateful => "grateful",
            Mood::Confident => "confident",
        }
    }

    /// 選択肢を一つ進める。末尾の次は未選択（None）に戻る。
    pub fn cycle_next(current: Option<Mood>) -> Option<Mood> {
        match current {
            None => Some(Self::ALL[0]),
            Some(m) => {
                let idx = Self::ALL.iter().position(|x| *x == m).unwrap_or(0);
                Self::ALL.get(idx + 1).copied()
            }
        }
    }

    /// 選択肢を一つ戻す。先頭の前は未選択（None）。
    pub fn cycle_prev(current: Option<Mood>) -> Option<Mood> {
        match current {
            None => Self::ALL.last().copied(),
            Some(m) => {
                let idx = Self::ALL.iter().position(|x| *x == m).unwrap_or(0);
                idx.checked_sub(1).map(|i| Self::ALL[i])
            }
        }
    }
}

impl Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `POST /api/generate-affirmation` のリクエストボディ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffirmationRequest {
    pub mood: Mood,
    pub situation: String,
}

impl AffirmationRequest {
    /// situation は前後の空白を除去して保持する
    pub fn new(mood: Mood, situation: &str) -> Self {
        Self {
            mood,
            situation: situation.trim().to_string(),
        }
    }
}

/// サーバーから返るJSONそのまま（フィールドは全て任意）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAffirmationResponse {
    #[serde(default)]
    pub success: bool,
    pub affirmation: Option<String>,
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub ai_generated: Option<bool>,
}

/// 付加情報用。型が合わない値は None として読み飛ばす。
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// 生成結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AffirmationResponse {
    Success {
        affirmation: String,
        id: Option<u64>,
        ai_generated: Option<bool>,
    },
    Failure {
        error: Option<String>,
    },
}

impl From<RawAffirmationResponse> for AffirmationResponse {
    fn from(raw: RawAffirmationResponse) -> Self {
        match (raw.success, raw.affirmation) {
            (true, Some(affirmation)) => AffirmationResponse::Success {
                affirmation,
                id: raw.id,
                ai_generated: raw.ai_generated,
            },
            // success=true でも本文が無ければ失敗扱い
            _ => AffirmationResponse::Failure { error: raw.error },
        }
    }
}

/// 画面に出す生成結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affirmation {
    pub text: String,
    pub id: Option<u64>,
    pub ai_generated: Option<bool>,
}

impl AffirmationResponse {
    /// Success は本文に、Failure はサーバーのメッセージ付きエラーに
    pub fn into_result(self) -> Result<Affirmation, ApiError> {
        match self {
            AffirmationResponse::Success { affirmation, id, ai_generated } => Ok(Affirmation {
                text: affirmation,
                id,
                ai_generated,
            }),
            AffirmationResponse::Failure { error } => Err(ApiError::Application(error)),
        }
    }
}

/// `GET /api/affirmations` の1件
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AffirmationRecord {
    pub id: u64,
    pub mood: String,
    #[serde(default)]
    pub situation: String,
    pub affirmation: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub ai_generated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub affirmations: Vec<AffirmationRecord>,
    pub error: Option<String>,
}
