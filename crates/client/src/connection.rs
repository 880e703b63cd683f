//! Connection management for the Encore backend
//!
//! This module wraps a reqwest client together with the base endpoint and the
//! token store. Every response is unwrapped from its `{success, data, error}`
//! envelope and every failure is classified into an [`ErrorKind`].

use core::time::Duration;

use encore_config::ApiConfig;
use encore_primitives::api::{ApiResult, AuthToken, TokenStore};
use encore_primitives::error::{ApiError, ErrorKind};
use encore_primitives::response::ApiResponse;
use eyre::{Result as EyreResult, WrapErr};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

/// Connection to the backend, generic over where the bearer token lives.
#[derive(Clone, Debug)]
pub struct ConnectionInfo<S>
where
    S: TokenStore + Clone,
{
    pub api_url: Url,
    pub client: Client,
    pub token_store: S,
}

impl<S> ConnectionInfo<S>
where
    S: TokenStore + Clone,
{
    pub fn new(api_url: Url, timeout: Duration, token_store: S) -> EyreResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .wrap_err("failed to build HTTP client")?;

        Ok(Self {
            api_url,
            client,
            token_store,
        })
    }

    pub fn from_config(config: &ApiConfig, token_store: S) -> EyreResult<Self> {
        Self::new(config.url.clone(), config.timeout, token_store)
    }

    pub async fn get<O>(&self, path: &[&str], query: &[(&str, &str)]) -> ApiResult<O>
    where
        O: DeserializeOwned,
    {
        self.request(Method::GET, path, query, None::<&()>).await
    }

    pub async fn post<I, O>(&self, path: &[&str], body: &I) -> ApiResult<O>
    where
        I: Serialize + ?Sized + Sync,
        O: DeserializeOwned,
    {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put<I, O>(&self, path: &[&str], query: &[(&str, &str)], body: &I) -> ApiResult<O>
    where
        I: Serialize + ?Sized + Sync,
        O: DeserializeOwned,
    {
        self.request(Method::PUT, path, query, Some(body)).await
    }

    pub async fn patch<I, O>(&self, path: &[&str], body: &I) -> ApiResult<O>
    where
        I: Serialize + ?Sized + Sync,
        O: DeserializeOwned,
    {
        self.request(Method::PATCH, path, &[], Some(body)).await
    }

    pub async fn delete<O>(&self, path: &[&str], query: &[(&str, &str)]) -> ApiResult<O>
    where
        O: DeserializeOwned,
    {
        self.request(Method::DELETE, path, query, None::<&()>).await
    }

    /// Replace the stored bearer token
    pub async fn update_token(&self, token: AuthToken) {
        self.token_store.store(token).await;
    }

    pub async fn sign_out(&self) {
        self.token_store.clear().await;
    }

    async fn request<I, O>(
        &self,
        method: Method,
        path: &[&str],
        query: &[(&str, &str)],
        body: Option<&I>,
    ) -> ApiResult<O>
    where
        I: Serialize + ?Sized + Sync,
        O: DeserializeOwned,
    {
        let url = self.endpoint(path, query)?;
        let path = url.path().to_owned();
        let mut builder = self.client.request(method.clone(), url);

        if let Some(body) = body {
            builder = builder.json(body);
        }

        // Load the token right before sending so a concurrent eviction is honoured
        if let Some(token) = self.token_store.load().await {
            builder = builder.bearer_auth(token.access_token);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!(%method, %path, "Request unauthorized, evicting stored token");
            self.token_store.clear().await;
        }

        let bytes = response.bytes().await.map_err(transport_error)?;

        debug!(%method, %path, %status, len = bytes.len(), "Received response");

        decode(status, &bytes)
    }

    /// Appends each segment to the base path. Segments are percent-encoded,
    /// so an id can never introduce another segment, a query or a fragment.
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> ApiResult<Url> {
        let mut url = self.api_url.clone();

        url.path_segments_mut()
            .map_err(|()| {
                ApiError::new(
                    ErrorKind::Unknown,
                    format!("Base address {} cannot carry a path", self.api_url),
                )
            })?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }
}

/// Unwraps a response body according to its status.
pub(crate) fn decode<O>(status: StatusCode, body: &[u8]) -> ApiResult<O>
where
    O: DeserializeOwned,
{
    let envelope = if body.iter().all(u8::is_ascii_whitespace) {
        Ok(ApiResponse::empty())
    } else {
        serde_json::from_slice::<ApiResponse>(body)
    };

    if status.is_success() {
        return envelope
            .map_err(|err| {
                ApiError::new(ErrorKind::Unknown, format!("Malformed response body: {err}"))
            })?
            .into_data();
    }

    let kind = ErrorKind::from_status(status.as_u16());
    let message = envelope
        .ok()
        .and_then(|envelope| envelope.error_message().map(str::to_owned))
        .unwrap_or_default();

    Err(ApiError::new(kind, message))
}

fn transport_error(err: reqwest::Error) -> ApiError {
    let kind = if err.is_timeout() {
        ErrorKind::Timeout
    } else if err.is_decode() {
        ErrorKind::Unknown
    } else {
        ErrorKind::Network
    };

    debug!(error = %err, %kind, "Transport failure");

    ApiError::from_kind(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTokenStore;

    fn connection(base: &str) -> ConnectionInfo<MemoryTokenStore> {
        ConnectionInfo::new(
            base.parse().unwrap(),
            Duration::from_secs(5),
            MemoryTokenStore::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_appends_segments_with_or_without_trailing_slash() {
        for base in ["https://api.encore.test/v1", "https://api.encore.test/v1/"] {
            let url = connection(base)
                .endpoint(&["users", "u1", "tickets"], &[("page", "0")])
                .unwrap();
            assert_eq!(
                url.as_str(),
                "https://api.encore.test/v1/users/u1/tickets?page=0"
            );
        }
    }

    #[test]
    fn test_endpoint_keeps_each_id_in_one_segment() {
        let url = connection("https://api.encore.test/api")
            .endpoint(&["tickets", "../a/b?c#d"], &[("userId", "u 1")])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.encore.test/api/tickets/..%2Fa%2Fb%3Fc%23d?userId=u+1"
        );
        assert_eq!(url.path_segments().unwrap().count(), 3);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_decode_error_without_body_uses_fallback() {
        let err = decode::<()>(StatusCode::NOT_FOUND, b"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!err.message().is_empty(), "fallback message expected");
    }

    #[test]
    fn test_decode_error_keeps_backend_message() {
        let body = br#"{"success":false,"error":{"code":"VALIDATION","message":"Title is required"}}"#;
        let err = decode::<()>(StatusCode::UNPROCESSABLE_ENTITY, body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), "Title is required");
    }

    #[test]
    fn test_decode_garbage_success_is_unknown() {
        let err = decode::<Vec<u32>>(StatusCode::OK, b"<html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown);
    }

    #[test]
    fn test_decode_empty_success_is_unit() {
        decode::<()>(StatusCode::NO_CONTENT, b"").unwrap();
    }
}
