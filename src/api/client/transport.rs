//! HTTP transport helpers: URL building, dispatch, and body decoding.

use crate::api::parse_retry_after_secs;
use crate::error::ApiError;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Build an HTTP client with timeout applied.
pub(super) fn build_http_client(timeout: Duration) -> reqwest::Client {
    // Fall back to reqwest defaults if builder creation fails for any reason.
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Join path segments onto the base URL, percent-encoding each segment.
pub(super) fn endpoint_url(base_url: &str, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = Url::parse(base_url)
        .map_err(|err| ApiError::InvalidUrl(format!("`{base_url}`: {err}")))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidUrl(format!("`{base_url}` cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// One outgoing request, cheap to rebuild for each retry attempt.
pub(super) struct Outgoing<'a, B: Serialize + ?Sized> {
    pub(super) method: Method,
    pub(super) url: &'a Url,
    pub(super) query: &'a [(&'static str, String)],
    pub(super) body: Option<&'a B>,
}

/// Send one request and return the raw body of a 2xx response.
pub(super) async fn dispatch<B: Serialize + ?Sized>(
    http: &reqwest::Client,
    outgoing: &Outgoing<'_, B>,
) -> Result<String, ApiError> {
    let mut req = http
        .request(outgoing.method.clone(), outgoing.url.clone())
        .header("Accept", "application/json");
    if !outgoing.query.is_empty() {
        req = req.query(outgoing.query);
    }
    if let Some(body) = outgoing.body {
        req = req.json(body);
    }

    let response = req.send().await?;
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let retry_after_secs = parse_retry_after_secs(response.headers());
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::status(status, body, retry_after_secs));
    }
    Ok(response.text().await?)
}

/// Decode a response body, reporting shape mismatches as malformed responses.
pub(super) fn decode<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::InvalidResponse(format!("{what}: {err}")))
}

/// Add a base-URL hint to route-level 404s.
///
/// A missing resource answers with a specific detail (`Run 'x' not found`);
/// a bare `Not Found` means the route itself is missing, which almost always
/// means the base URL lacks the `/api` prefix.
pub(super) fn with_diagnostic_hints(base_url: &str, err: ApiError) -> ApiError {
    let ApiError::Status {
        code: 404,
        mut body,
        retry_after_secs,
    } = err
    else {
        return err;
    };
    if body.contains("\"Not Found\"") || body.trim().is_empty() {
        body.push_str(&format!(
            "\nHint: `{base_url}` does not serve this route; check that `backend.base_url` includes the API prefix (for example `/api`)."
        ));
    }
    ApiError::status(404, body, retry_after_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_appends_and_encodes_segments() {
        let url = endpoint_url("http://localhost:8000/api/", &["runs", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/runs/a%20b%2Fc");

        let url = endpoint_url("http://localhost:8000/api", &["runs", "stats", "summary"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/runs/stats/summary");
    }

    #[test]
    fn endpoint_url_rejects_unusable_bases() {
        assert!(matches!(
            endpoint_url("not a url", &["runs"]),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            endpoint_url("mailto:ops@example.com", &["runs"]),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn decode_reports_shape_errors_as_invalid_response() {
        let err = decode::<Vec<u32>>("{\"id\": 1}", "GET /runs").unwrap_err();
        match err {
            ApiError::InvalidResponse(msg) => assert!(msg.starts_with("GET /runs:"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn route_level_404_gets_base_url_hint() {
        let err = with_diagnostic_hints(
            "http://localhost:8000",
            ApiError::status(404, r#"{"detail":"Not Found"}"#.into(), None),
        );
        assert!(err.to_string().contains("/api"), "{err}");

        let err = with_diagnostic_hints(
            "http://localhost:8000/api",
            ApiError::status(404, r#"{"detail":"Run 'x' not found"}"#.into(), None),
        );
        assert!(!err.to_string().contains("Hint"), "{err}");
    }
}
