//! Shared HTTP plumbing for the REST adapters

use reqwest::StatusCode;
use verdict_application::AdapterError;

/// Read an API key from the environment; blank values count as unset
pub fn api_key_from_env(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Map a non-success HTTP status to an adapter error
pub fn status_error(status: StatusCode, body: &str) -> AdapterError {
    let detail = format!("HTTP {}: {}", status.as_u16(), snippet(body));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AdapterError::Auth(detail),
        StatusCode::TOO_MANY_REQUESTS | StatusCode::PAYMENT_REQUIRED => AdapterError::Quota(detail),
        _ => AdapterError::Other(detail),
    }
}

pub fn transport_error(error: reqwest::Error) -> AdapterError {
    AdapterError::Connection(error.to_string())
}

/// First 200 characters of an error body
fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(200) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "bad key"),
            AdapterError::Auth(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            AdapterError::Quota(_)
        ));
        let err = status_error(StatusCode::BAD_GATEWAY, "upstream");
        assert_eq!(err.to_string(), "Other error: HTTP 502: upstream");
    }

    #[test]
    fn test_snippet_truncates_long_bodies() {
        let body = "x".repeat(500);
        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert!(err.to_string().ends_with("..."));
        assert!(err.to_string().len() < 300);
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://api.openai.com/v1/", "/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }
}
