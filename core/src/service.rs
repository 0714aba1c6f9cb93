//! Request orchestration: endpoint in, typed value (or `ServiceError`) out.
//!
//! # Design
//! A call walks a fixed, one-way sequence: mock check, URL resolution,
//! request construction, execution, status validation, decode. The first
//! failing step ends the call with its `ServiceError`; nothing is retried.
//! The transport call is the only `.await`, so every other step can be
//! exercised deterministically with a stub transport.
//!
//! `Service` holds no per-call state. It can be shared across tasks as long
//! as its transport can.

use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::builder::RequestBuilder;
use crate::config::Configuration;
use crate::endpoint::Endpoint;
use crate::error::ServiceError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Typed client for the endpoints of `E`, executing through `T`.
pub struct Service<E, T> {
    base_url: Url,
    configuration: Configuration,
    transport: T,
    endpoints: PhantomData<fn(E)>,
}

impl<E, T> std::fmt::Debug for Service<E, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("base_url", &self.base_url.as_str())
            .field("configuration", &self.configuration)
            .finish_non_exhaustive()
    }
}

impl<E: Endpoint, T: Transport> Service<E, T> {
    /// Create a service using the process-wide shared configuration.
    pub fn new(base_url: Url, transport: T) -> Self {
        Self::with_configuration(base_url, *Configuration::shared(), transport)
    }

    pub fn with_configuration(base_url: Url, configuration: Configuration, transport: T) -> Self {
        Self {
            base_url,
            configuration,
            transport,
            endpoints: PhantomData,
        }
    }

    /// Create a service talking to the base URL of `configuration.environment`.
    pub fn for_environment(configuration: Configuration, transport: T) -> Result<Self, ServiceError> {
        let base = configuration.environment.base_url();
        let base_url = Url::parse(base).map_err(|_| ServiceError::InvalidUrl {
            url: base.to_string(),
        })?;
        Ok(Self::with_configuration(base_url, configuration, transport))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Request `endpoint` and decode the response body into `R`.
    pub async fn request<R>(&self, endpoint: E) -> Result<R, ServiceError>
    where
        R: DeserializeOwned,
    {
        self.request_with(endpoint, |_| Ok(())).await
    }

    /// Like `request`, but lets `configure` adjust the builder (headers,
    /// method, body) before the request is frozen.
    #[instrument(skip_all, fields(path = %endpoint.path()))]
    pub async fn request_with<R, F>(&self, endpoint: E, configure: F) -> Result<R, ServiceError>
    where
        R: DeserializeOwned,
        F: FnOnce(&mut RequestBuilder) -> Result<(), ServiceError>,
    {
        if self.configuration.enable_mocks {
            if let Some(payload) = endpoint.mock_payload() {
                debug!(len = payload.len(), "serving mock payload");
                return decode_mock(payload);
            }
        }

        let mut builder = self.prepare(&endpoint)?;
        builder.set_method(HttpMethod::Get);
        configure(&mut builder)?;
        let request = builder.build();
        // Not held across the await, so the future does not need `E: Send`.
        drop(endpoint);

        let body = self.send(request).await?;
        decode(&body)
    }

    /// Resolve `endpoint` into a builder without executing anything.
    ///
    /// For callers that need to customize and run the request themselves,
    /// e.g. through `send` or their own transport.
    pub fn build_api_request(&self, endpoint: &E) -> Result<RequestBuilder, ServiceError> {
        self.prepare(endpoint)
    }

    /// Execute `request` and validate the response, returning its non-empty
    /// body undecoded.
    pub async fn send(&self, request: HttpRequest) -> Result<Bytes, ServiceError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self
            .transport
            .execute(request)
            .await
            .map_err(ServiceError::NetworkError)?;
        debug!(status = response.status, "received response");
        validate(response)
    }

    fn prepare(&self, endpoint: &E) -> Result<RequestBuilder, ServiceError> {
        let url = self.resolve_url(endpoint)?;
        let mut builder = RequestBuilder::new(url);
        let query_items = endpoint.query_items();
        if !query_items.is_empty() {
            builder.set_query_items(query_items);
        }
        Ok(builder)
    }

    fn resolve_url(&self, endpoint: &E) -> Result<Url, ServiceError> {
        let path = endpoint.path();
        if endpoint.is_external_url() {
            return Url::parse(&path).map_err(|_| ServiceError::InvalidUrl {
                url: path.into_owned(),
            });
        }
        join_path(&self.base_url, &path)
    }
}

/// Append the segments of `path` to the path of `base`.
///
/// Unlike `Url::join`, a leading `/` does not discard the base path, so
/// `https://api.test/v1` + `/items` is `https://api.test/v1/items`. A trailing
/// `/` on `path` is kept.
fn join_path(base: &Url, path: &str) -> Result<Url, ServiceError> {
    let mut segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();
    if !segments.is_empty() && path.ends_with('/') {
        segments.push("");
    }

    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ServiceError::InvalidUrl {
            url: format!("{base}{path}"),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Map a transport response to its body or the matching error variant.
fn validate(response: HttpResponse) -> Result<Bytes, ServiceError> {
    if !response.has_valid_status() {
        return Err(ServiceError::InvalidResponse);
    }
    if !response.is_success() {
        return Err(ServiceError::HttpError {
            status: response.status,
            body: response.body,
        });
    }
    if response.body.is_empty() {
        return Err(ServiceError::NoData);
    }
    Ok(response.body)
}

/// Decode a response body. Timestamps are expected in ISO-8601 and are read
/// through `chrono::DateTime` fields of `R`.
pub fn decode<R: DeserializeOwned>(body: &[u8]) -> Result<R, ServiceError> {
    serde_json::from_slice(body).map_err(ServiceError::DecodingError)
}

fn decode_mock<R: DeserializeOwned>(payload: &[u8]) -> Result<R, ServiceError> {
    let text = std::str::from_utf8(payload).map_err(|_| ServiceError::MockResponseInvalid)?;
    serde_json::from_str(text).map_err(ServiceError::MockResponseDecodingError)
}
