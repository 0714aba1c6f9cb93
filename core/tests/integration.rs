//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `GistsService` over
//! real HTTP twice: once with the stock `ReqwestTransport` and once with a
//! blocking ureq transport, to show that any HTTP stack can sit behind the
//! `Transport` trait. DTOs in the core and in the server are defined
//! independently, so these tests also catch schema drift.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::net::SocketAddr;

use async_trait::async_trait;
use gistview_core::{
    Configuration, Endpoint, Environment, GistsService, HttpMethod, HttpRequest, HttpResponse,
    NewGist, NewGistFile, ReqwestTransport, Service, ServiceError, Transport, TransportError,
};
use mock_server::{STARRED_GIST_ID, UNSTARRED_GIST_ID};
use url::Url;

async fn start_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    addr
}

fn base_url(addr: SocketAddr) -> Url {
    Url::parse(&format!("http://{addr}")).unwrap()
}

fn live() -> Configuration {
    Configuration::new(Environment::Development, false)
}

/// Executes requests with ureq on the blocking pool.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the service
/// handle status interpretation.
struct UreqTransport;

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &BTreeMap<String, String>,
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_with_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&[u8]>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body),
        None => builder.send_empty(),
    }
}

fn execute_blocking(request: HttpRequest) -> Result<HttpResponse, ureq::Error> {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(request.timeout))
        .build()
        .new_agent();

    let url = request.url.as_str();
    let headers = &request.headers;
    let body = request.body.as_deref();
    let mut response = match request.method {
        HttpMethod::Get => with_headers(agent.get(url), headers).call(),
        HttpMethod::Delete => with_headers(agent.delete(url), headers).call(),
        HttpMethod::Post => send_with_body(with_headers(agent.post(url), headers), body),
        HttpMethod::Put => send_with_body(with_headers(agent.put(url), headers), body),
        HttpMethod::Patch => send_with_body(with_headers(agent.patch(url), headers), body),
    }?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response.body_mut().read_to_vec()?;

    Ok(HttpResponse {
        status,
        headers,
        body: body.into(),
    })
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = tokio::task::spawn_blocking(move || execute_blocking(request)).await??;
        Ok(response)
    }
}

fn new_gist() -> NewGist {
    let mut files = BTreeMap::new();
    files.insert(
        "main.rs".to_string(),
        NewGistFile {
            content: "fn main() {}\n".to_string(),
        },
    );
    NewGist {
        description: Some("Integration test".to_string()),
        public: true,
        files,
    }
}

async fn exercise_gists<T: Transport>(gists: GistsService<T>) {
    // Step 1: list the seeded public gists.
    let list = gists.fetch_public_gists(1, 30).await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id, STARRED_GIST_ID);
    assert!(list[0].created_at > list[1].created_at);
    assert!(list[0].files.values().all(|file| file.content.is_none()));

    // Step 2: page parameters are passed through.
    let page = gists.fetch_public_gists(2, 1).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, UNSTARRED_GIST_ID);

    // Step 3: detail includes file contents.
    let detail = gists.fetch_gist_details(STARRED_GIST_ID).await.unwrap();
    assert_eq!(detail.description.as_deref(), Some("Hello world in Ruby"));
    let file = detail.first_file().unwrap();
    assert_eq!(file.content.as_deref(), Some("puts 'Hello, World!'\n"));

    // Step 4: unknown gist keeps the server's error body.
    let err = gists.fetch_gist_details("missing").await.unwrap_err();
    match err {
        ServiceError::HttpError { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(&body[..], br#"{"message":"Not Found"}"#);
        }
        other => panic!("expected HttpError, got {other:?}"),
    }

    // Step 5: 204 and 404 on the star endpoint.
    assert!(gists.is_starred(STARRED_GIST_ID).await.unwrap());
    assert!(!gists.is_starred(UNSTARRED_GIST_ID).await.unwrap());

    // Step 6: raw file content through the external URL.
    let content = gists.fetch_file_content(&detail).await.unwrap();
    assert_eq!(content.as_deref(), Some("puts 'Hello, World!'\n"));

    // Step 7: create, then read back.
    let created = gists.create_gist(&new_gist()).await.unwrap();
    assert_eq!(created.description.as_deref(), Some("Integration test"));
    assert_eq!(created.files["main.rs"].language.as_deref(), Some("Rust"));

    let fetched = gists.fetch_gist_details(&created.id).await.unwrap();
    assert_eq!(fetched, created);

    // Step 8: the new gist leads the public list.
    let list = gists.fetch_public_gists(1, 30).await.unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0].id, created.id);
}

#[tokio::test(flavor = "multi_thread")]
async fn gists_lifecycle_over_reqwest() {
    let addr = start_server().await;
    let gists = GistsService::with_base_url(base_url(addr), live(), ReqwestTransport::new());
    exercise_gists(gists).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn gists_lifecycle_over_ureq() {
    let addr = start_server().await;
    let gists = GistsService::with_base_url(base_url(addr), live(), UreqTransport);
    exercise_gists(gists).await;
}

#[cfg(feature = "mock-fixtures")]
#[tokio::test(flavor = "multi_thread")]
async fn mocks_answer_without_a_server() {
    // Nothing listens on the discard port.
    let gists = GistsService::with_base_url(
        Url::parse("http://127.0.0.1:9").unwrap(),
        Configuration::new(Environment::Development, true),
        ReqwestTransport::new(),
    );
    let list = gists.fetch_public_gists(1, 30).await.unwrap();
    assert_eq!(list[0].id, "mock123");

    let detail = gists.fetch_gist_details("anything").await.unwrap();
    assert_eq!(detail.description.as_deref(), Some("Mock Gist Detail"));
}

#[tokio::test(flavor = "multi_thread")]
async fn closed_port_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(2))
        .build()
        .unwrap();
    let gists = GistsService::with_base_url(base_url(addr), live(), ReqwestTransport::with_client(client));
    let err = gists.fetch_gist_details(STARRED_GIST_ID).await.unwrap_err();
    assert!(matches!(err, ServiceError::NetworkError(_)), "got {err:?}");
}

/// A raw text route requested as if it were JSON.
struct RawNotes;

impl Endpoint for RawNotes {
    fn path(&self) -> Cow<'_, str> {
        Cow::Owned(format!("/raw/{UNSTARRED_GIST_ID}/notes.md"))
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn non_json_success_body_is_decoding_error() {
    let addr = start_server().await;
    let service: Service<RawNotes, _> =
        Service::with_configuration(base_url(addr), live(), ReqwestTransport::new());

    let err = service
        .request::<serde_json::Value>(RawNotes)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::DecodingError(_)), "got {err:?}");

    let request = service.build_api_request(&RawNotes).unwrap().build();
    let body = service.send(request).await.unwrap();
    assert_eq!(&body[..], b"# Notes\n");
}
