use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::Json;
use shortlink_core::ShortlinkDetail;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::model::{InfoQuery, ShortenRequest, ShortenResponse};
use crate::state::AppState;
use crate::validation::{validate_expiration, validate_url};

pub async fn shorten_handler(
    State(state): State<AppState>,
    request: std::result::Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>> {
    let Json(request) =
        request.map_err(|e| AppError::BadRequest(format!("parse parameters failed: {e}")))?;

    validate_url(&request.url)?;
    let expiration = validate_expiration(request.expiration_in_minutes)?;

    let code = state.shortener().shorten(&request.url, expiration).await?;

    Ok(Json(ShortenResponse {
        shortlink: code.to_string(),
    }))
}

pub async fn info_handler(
    State(state): State<AppState>,
    Query(query): Query<InfoQuery>,
) -> Result<Json<ShortlinkDetail>> {
    let raw = query
        .shortlink
        .ok_or_else(|| AppError::BadRequest("missing shortlink parameter".to_string()))?;
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::BadRequest(format!(
            "shortlink must be a non-empty alphanumeric id: '{raw}'"
        )));
    }

    let detail = state.shortener().shortlink_info(&raw).await?;
    Ok(Json(detail))
}

pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(shortlink): Path<String>,
) -> Result<Redirect> {
    debug!(shortlink = %shortlink, "resolving shortlink");

    let url = state.shortener().unshorten(&shortlink).await?;
    Ok(Redirect::temporary(&url))
}
