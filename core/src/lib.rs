//! Typed REST client core.
//!
//! # Overview
//! Describes API operations as `Endpoint` values, turns them into
//! `HttpRequest`s through `RequestBuilder`, executes them via an injectable
//! `Transport`, validates the HTTP status and decodes the JSON body into a
//! caller-chosen type. With mocks enabled in the `Configuration`, endpoints
//! that carry a literal payload are answered without any I/O.
//!
//! # Design
//! - `Service` is stateless per call; only the read-only configuration and
//!   the transport are shared between calls.
//! - The transport call is the single suspension point. URL resolution,
//!   request building, status validation and decoding are plain functions.
//! - Every failure surfaces as one flat `ServiceError`; nothing is retried.
//! - `GistsService` is the GitHub Gists client built on top of `Service`.

pub mod builder;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod gists;
pub mod http;
pub mod service;
pub mod transport;
pub mod types;

pub use builder::RequestBuilder;
pub use config::{Configuration, Environment};
pub use endpoint::Endpoint;
pub use error::{ConfigError, ServiceError, TransportError};
pub use gists::{GistEndpoint, GistsService};
pub use http::{HttpMethod, HttpRequest, HttpResponse, QueryItem};
pub use service::Service;
pub use transport::{ReqwestTransport, Transport};
pub use types::{Gist, GistFile, GistOwner, NewGist, NewGistFile};
