use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
    pub expiration_in_minutes: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub shortlink: String,
}

#[derive(Debug, Deserialize)]
pub struct InfoQuery {
    pub shortlink: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
