//! Fluent builder that accumulates request state and freezes it into an
//! `HttpRequest`.
//!
//! # Design
//! Setters take `&mut self` and hand back `&mut Self`, so a builder is owned
//! by exactly one call and can be chained without moving it. Nothing here does
//! I/O; `build` only assembles the final URL and copies the accumulated fields.

use std::collections::BTreeMap;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use url::Url;

use crate::error::ServiceError;
use crate::http::{HttpMethod, HttpRequest, QueryItem};

/// Timeout applied when the caller does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub const CONTENT_TYPE: &str = "Content-Type";

/// Media type written by `set_body_from_encodable`.
pub const JSON_MEDIA_TYPE: &str = "application/json";

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    url: Url,
    method: HttpMethod,
    headers: BTreeMap<String, String>,
    query_items: Vec<QueryItem>,
    body: Option<Bytes>,
    timeout: Duration,
}

impl RequestBuilder {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            method: HttpMethod::Get,
            headers: BTreeMap::new(),
            query_items: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn set_method(&mut self, method: HttpMethod) -> &mut Self {
        self.method = method;
        self
    }

    /// Insert a header, replacing any previous value under the same name.
    ///
    /// Names compare case-insensitively; the latest spelling is kept.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.headers
            .retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
        self
    }

    /// Replace every header with `headers`.
    pub fn set_headers<K, V>(&mut self, headers: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.clear();
        for (name, value) in headers {
            self.add_header(name, value);
        }
        self
    }

    pub fn set_query_items(&mut self, query_items: impl IntoIterator<Item = QueryItem>) -> &mut Self {
        self.query_items = query_items.into_iter().collect();
        self
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as JSON into the body and set `Content-Type` to
    /// `application/json`, overwriting any earlier value.
    pub fn set_body_from_encodable<T>(&mut self, value: &T) -> Result<&mut Self, ServiceError>
    where
        T: Serialize + ?Sized,
    {
        let encoded = serde_json::to_vec(value).map_err(ServiceError::EncodingError)?;
        self.body = Some(Bytes::from(encoded));
        Ok(self.add_header(CONTENT_TYPE, JSON_MEDIA_TYPE))
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn query_items(&self) -> &[QueryItem] {
        &self.query_items
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Freeze the accumulated state into an immutable request.
    ///
    /// Query items are appended after any query already present on the URL,
    /// and only when there is at least one.
    pub fn build(&self) -> HttpRequest {
        let mut url = self.url.clone();
        if !self.query_items.is_empty() {
            url.query_pairs_mut().extend_pairs(
                self.query_items
                    .iter()
                    .map(|item| (item.name.as_str(), item.value.as_str())),
            );
        }

        HttpRequest {
            method: self.method,
            url,
            headers: self.headers.clone(),
            body: self.body.clone(),
            timeout: self.timeout,
        }
    }
}
