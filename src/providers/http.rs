use serde::de::DeserializeOwned;

use super::throttle::Throttle;
use crate::error::MigrationError;

/// Status and body of a completed request. The body is kept as text so it can
/// be attached to diagnostics when decoding fails.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        matches!(self.status, 200 | 201)
    }

    pub fn json<T: DeserializeOwned>(&self, what: &str) -> Result<T, MigrationError> {
        serde_json::from_str(&self.body)
            .map_err(|e| MigrationError::decode(what, format!("{e}; body: {}", self.body)))
    }

    pub fn into_upstream_error(self, what: &str) -> MigrationError {
        MigrationError::Upstream {
            what: what.into(),
            status: self.status,
            body: self.body,
        }
    }
}

/// Send a request after the throttle allows it.
pub async fn execute(
    throttle: &Throttle,
    what: &str,
    request: reqwest::RequestBuilder,
) -> Result<HttpResponse, MigrationError> {
    throttle.wait().await;
    tracing::debug!(request = what, "sending request");

    let result = read_response(what, request).await;
    throttle.finish().await;
    result
}

async fn read_response(
    what: &str,
    request: reqwest::RequestBuilder,
) -> Result<HttpResponse, MigrationError> {
    let resp = request
        .send()
        .await
        .map_err(|e| MigrationError::transport(what, e))?;
    let status = resp.status().as_u16();
    let body = resp
        .text()
        .await
        .map_err(|e| MigrationError::transport(what, e))?;

    Ok(HttpResponse { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_200_and_201_are_success() {
        for (status, ok) in [(200, true), (201, true), (204, false), (404, false), (500, false)] {
            let resp = HttpResponse {
                status,
                body: String::new(),
            };
            assert_eq!(resp.is_success(), ok, "status {status}");
        }
    }

    #[test]
    fn decode_error_keeps_body() {
        let resp = HttpResponse {
            status: 200,
            body: "<html>oops</html>".into(),
        };
        let err = resp.json::<serde_json::Value>("suite listing").unwrap_err();
        assert!(matches!(err, MigrationError::Decode { .. }));
        assert!(err.to_string().contains("<html>oops</html>"));
    }
}
