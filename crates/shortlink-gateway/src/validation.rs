use crate::error::AppError;
use axum::http::HeaderValue;

/// Checks that `url` is an absolute http(s) URL with a host that can be sent
/// back in a `Location` header.
pub fn validate_url(url: &str) -> Result<(), AppError> {
    if url.trim().is_empty() {
        return Err(AppError::BadRequest("url cannot be empty".to_string()));
    }

    if HeaderValue::from_str(url).is_err() {
        return Err(AppError::BadRequest(
            "url contains characters that cannot be redirected to".to_string(),
        ));
    }

    let Some((scheme, rest)) = url.split_once("://") else {
        return Err(AppError::BadRequest(format!(
            "url must have a valid scheme and host: {url}"
        )));
    };

    let scheme = scheme.to_ascii_lowercase();
    if scheme != "http" && scheme != "https" {
        return Err(AppError::BadRequest(format!(
            "url scheme must be http or https: {scheme}"
        )));
    }

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return Err(AppError::BadRequest(format!(
            "url must have a valid host: {url}"
        )));
    }

    Ok(())
}

/// Converts the requested lifetime, which must be at least one minute.
pub fn validate_expiration(minutes: i64) -> Result<u64, AppError> {
    match u64::try_from(minutes) {
        Ok(minutes) if minutes > 0 => Ok(minutes),
        _ => Err(AppError::BadRequest(format!(
            "expiration_in_minutes must be at least 1, got {minutes}"
        ))),
    }
}
