//! The capability every API operation description provides to `Service`.

use std::borrow::Cow;

use crate::http::QueryItem;

/// Describes one API operation.
///
/// Implement this on an enum with one variant per operation and `match`
/// exhaustively in each method, e.g. `GistEndpoint`.
pub trait Endpoint {
    /// Path relative to the service base URL, or an absolute URL when
    /// `is_external_url` returns true.
    fn path(&self) -> Cow<'_, str>;

    /// Query parameters in the order they should appear on the URL.
    fn query_items(&self) -> Vec<QueryItem> {
        Vec::new()
    }

    /// Literal response body served instead of calling the network when the
    /// configuration enables mocks.
    fn mock_payload(&self) -> Option<&'static [u8]> {
        None
    }

    fn is_external_url(&self) -> bool {
        false
    }
}
