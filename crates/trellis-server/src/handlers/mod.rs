//! HTTP request handlers.

pub(crate) mod health;
pub(crate) mod menu;
pub(crate) mod page;
pub(crate) mod search;

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

/// Decode a percent-encoded request path.
///
/// Paths that do not decode to UTF-8 are returned unchanged.
pub(crate) fn decode_path(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(raw))
}

/// Whether a request path belongs to the JSON API.
pub(crate) fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}
