use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Deserialize)]
pub struct ExtractRequest {
    pub url: String,
}

#[derive(Serialize)]
pub struct ExtractResponse {
    pub url: String,
    pub text: String,
    pub chars: usize,
    pub fetched_at: DateTime<Utc>,
    pub status: String,
}

#[derive(Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub summarized_at: DateTime<Utc>,
    pub status: String,
}
