//! Redirect middleware.
//!
//! Runs before routing for every non-API request:
//! 1. a matching redirect rule answers with its 301/302,
//! 2. a matching external rule answers with 302 to the absolute URL,
//! 3. with the fallback enabled, a path that does not resolve answers with
//!    302 to the fallback target.
//!
//! Everything else continues to the router, carrying the resolution as a
//! [`RoutedPage`] request extension.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use trellis_site::{RedirectTarget, ResolveError, Resolution, Route};

use crate::handlers::{decode_path, is_api_path};
use crate::state::AppState;

/// Characters escaped in `Location` values (non-ASCII is always escaped).
const LOCATION: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Resolution computed by [`redirect`] for a request it let through.
///
/// The page handler serves it instead of reading the content again.
#[derive(Clone)]
pub(crate) struct RoutedPage(pub(crate) Result<Resolution, ResolveError>);

/// Apply configured redirects and the fallback redirect.
pub(crate) async fn redirect(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let raw = request.uri().path();
    if is_api_path(raw) {
        return next.run(request).await;
    }
    let path = decode_path(raw).into_owned();

    match state.site.route(&path) {
        Ok(Route::Redirect(target)) => {
            tracing::info!(from = %path, to = %target.location, status = target.status, "Redirect");
            return redirect_response(&target);
        }
        Ok(Route::Fallback(target)) => {
            tracing::info!(from = %path, to = %target.location, "Fallback redirect");
            return redirect_response(&target);
        }
        Ok(Route::Page(resolution)) => {
            request.extensions_mut().insert(RoutedPage(resolution));
        }
        // The page handler reports the failure
        Err(e) => tracing::warn!(path = %path, error = %e, "Routing failed"),
    }

    next.run(request).await
}

/// Build a redirect response with an ASCII-safe `Location` header.
fn redirect_response(target: &RedirectTarget) -> Response {
    let status = StatusCode::from_u16(target.status)
        .ok()
        .filter(StatusCode::is_redirection)
        .unwrap_or(StatusCode::FOUND);
    let location = utf8_percent_encode(&target.location, LOCATION).to_string();

    match HeaderValue::from_str(&location) {
        Ok(value) => (status, [(header::LOCATION, value)]).into_response(),
        Err(e) => {
            tracing::warn!(location = %target.location, error = %e, "Invalid redirect location");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
