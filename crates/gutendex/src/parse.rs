use crate::error::{ErrorKind, Result};
use crate::models::SearchPage;
use exn::ResultExt;
use tracing::instrument;

/// Decode a search response body into a [`SearchPage`].
///
/// Unknown fields are ignored; a body that is not a JSON object with the
/// expected field types is rejected as [`ErrorKind::MalformedJson`].
#[instrument(level = "trace", skip(body), fields(body_size = body.as_ref().len()))]
pub fn parse_search_page(body: impl AsRef<[u8]>) -> Result<SearchPage> {
    let body = body.as_ref();
    let page: SearchPage = serde_json::from_slice(body).map_err(|err| ErrorKind::MalformedJson(err.to_string()))?;
    tracing::trace!(count = page.count, results = page.results.len(), "decoded search page");
    Ok(page)
}

/// Same as [`parse_search_page`], but for bodies that must be valid UTF-8 text.
pub fn parse_search_text(body: &str) -> Result<SearchPage> {
    parse_search_page(body.as_bytes()).or_raise(|| ErrorKind::MalformedJson("search response".to_string()))
}
