//! Client for the GitHub Gists API, built on `Service`.

use std::borrow::Cow;

use serde::de::IgnoredAny;
use url::Url;

use crate::builder::RequestBuilder;
use crate::config::Configuration;
use crate::endpoint::Endpoint;
use crate::error::ServiceError;
use crate::http::{HttpMethod, QueryItem};
use crate::service::Service;
use crate::transport::Transport;
use crate::types::{Gist, NewGist};

pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";

pub const DEFAULT_PER_PAGE: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GistEndpoint {
    PublicGists { page: u32, per_page: u32 },
    GistDetail { id: String },
    CreateGist,
    /// Answers 204 when the gist is starred, 404 otherwise.
    Star { id: String },
    /// A file's `raw_url`; plain text rather than JSON.
    RawFile { url: String },
}

impl Endpoint for GistEndpoint {
    fn path(&self) -> Cow<'_, str> {
        match self {
            GistEndpoint::PublicGists { .. } => Cow::Borrowed("/gists/public"),
            GistEndpoint::GistDetail { id } => Cow::Owned(format!("/gists/{id}")),
            GistEndpoint::CreateGist => Cow::Borrowed("/gists"),
            GistEndpoint::Star { id } => Cow::Owned(format!("/gists/{id}/star")),
            GistEndpoint::RawFile { url } => Cow::Borrowed(url),
        }
    }

    fn query_items(&self) -> Vec<QueryItem> {
        match self {
            GistEndpoint::PublicGists { page, per_page } => vec![
                QueryItem::new("page", page),
                QueryItem::new("per_page", per_page),
            ],
            GistEndpoint::GistDetail { .. }
            | GistEndpoint::CreateGist
            | GistEndpoint::Star { .. }
            | GistEndpoint::RawFile { .. } => Vec::new(),
        }
    }

    #[cfg(feature = "mock-fixtures")]
    fn mock_payload(&self) -> Option<&'static [u8]> {
        match self {
            GistEndpoint::PublicGists { .. } => Some(include_bytes!("../fixtures/public_gists.json").as_slice()),
            GistEndpoint::GistDetail { .. } | GistEndpoint::CreateGist => {
                Some(include_bytes!("../fixtures/gist_detail.json").as_slice())
            }
            GistEndpoint::Star { .. } | GistEndpoint::RawFile { .. } => None,
        }
    }

    fn is_external_url(&self) -> bool {
        match self {
            GistEndpoint::RawFile { .. } => true,
            GistEndpoint::PublicGists { .. }
            | GistEndpoint::GistDetail { .. }
            | GistEndpoint::CreateGist
            | GistEndpoint::Star { .. } => false,
        }
    }
}

fn accept_github_json(builder: &mut RequestBuilder) -> Result<(), ServiceError> {
    builder.add_header("Accept", GITHUB_ACCEPT);
    Ok(())
}

#[derive(Debug)]
pub struct GistsService<T> {
    service: Service<GistEndpoint, T>,
}

impl<T: Transport> GistsService<T> {
    /// Talk to the API of `configuration.environment`.
    pub fn new(configuration: Configuration, transport: T) -> Result<Self, ServiceError> {
        Ok(Self {
            service: Service::for_environment(configuration, transport)?,
        })
    }

    pub fn with_base_url(base_url: Url, configuration: Configuration, transport: T) -> Self {
        Self {
            service: Service::with_configuration(base_url, configuration, transport),
        }
    }

    pub fn service(&self) -> &Service<GistEndpoint, T> {
        &self.service
    }

    /// Fetch one page of public gists. Pages start at 1.
    pub async fn fetch_public_gists(&self, page: u32, per_page: u32) -> Result<Vec<Gist>, ServiceError> {
        self.service
            .request_with(GistEndpoint::PublicGists { page, per_page }, accept_github_json)
            .await
    }

    pub async fn fetch_gist_details(&self, id: &str) -> Result<Gist, ServiceError> {
        self.service
            .request_with(
                GistEndpoint::GistDetail { id: id.to_string() },
                accept_github_json,
            )
            .await
    }

    pub async fn create_gist(&self, gist: &NewGist) -> Result<Gist, ServiceError> {
        self.service
            .request_with(GistEndpoint::CreateGist, |builder| {
                accept_github_json(builder)?;
                builder
                    .set_method(HttpMethod::Post)
                    .set_body_from_encodable(gist)?;
                Ok(())
            })
            .await
    }

    pub async fn is_starred(&self, id: &str) -> Result<bool, ServiceError> {
        let result = self
            .service
            .request_with::<IgnoredAny, _>(GistEndpoint::Star { id: id.to_string() }, accept_github_json)
            .await;
        match result {
            Ok(_) | Err(ServiceError::NoData) => Ok(true),
            Err(ServiceError::HttpError { status: 404, .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Download the text of the gist's first file through its `raw_url`.
    ///
    /// Returns `None` when the gist has no file with a raw URL. Raw files are
    /// arbitrary uploads, so bytes that are not UTF-8 are replaced with
    /// U+FFFD rather than failing the call.
    pub async fn fetch_file_content(&self, gist: &Gist) -> Result<Option<String>, ServiceError> {
        let Some(url) = gist.first_file().and_then(|file| file.raw_url.clone()) else {
            return Ok(None);
        };

        let request = self
            .service
            .build_api_request(&GistEndpoint::RawFile { url })?
            .build();
        match self.service.send(request).await {
            Ok(body) => Ok(Some(String::from_utf8_lossy(&body).into_owned())),
            Err(ServiceError::NoData) => Ok(Some(String::new())),
            Err(err) => Err(err),
        }
    }
}
