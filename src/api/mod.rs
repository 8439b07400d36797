//! バックエンドAPI連携

pub mod client;
pub mod error;
pub mod types;
pub mod worker;

pub use client::ApiClient;
pub use error::ApiError;
pub use types::{Affirmation, AffirmationRecord, AffirmationRequest, AffirmationResponse, Mood};
pub use worker::{start_api_worker, Job, Outcome};
