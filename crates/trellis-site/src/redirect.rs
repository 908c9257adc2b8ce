//! Redirect resolution.
//!
//! Classifies a request path against the redirect table. Internal rules are
//! checked before external ones; the first exact match wins. Nothing here
//! performs I/O: the HTTP layer turns the result into a response.

use serde::Serialize;
use trellis_config::{ExternalRedirect, RedirectConfig, RedirectKind, RedirectRule};

/// Status used for external and fallback redirects.
const FOUND: u16 = 302;

/// A matched redirect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Redirect<'a> {
    /// Redirect within the site.
    Internal(&'a RedirectRule),
    /// Redirect to an absolute URL outside the site.
    External(&'a ExternalRedirect),
}

impl Redirect<'_> {
    /// Destination path or URL.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Internal(rule) => &rule.to,
            Self::External(rule) => &rule.to,
        }
    }

    /// HTTP status to emit.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Internal(rule) => rule.status_code(),
            Self::External(_) => FOUND,
        }
    }
}

/// Owned redirect decision, detached from the settings it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RedirectTarget {
    pub location: String,
    pub status: u16,
    pub external: bool,
}

impl RedirectTarget {
    /// Temporary redirect to `location`.
    #[must_use]
    pub fn temporary(location: impl Into<String>) -> Self {
        let location = location.into();
        Self {
            external: is_external_url(&location),
            location,
            status: RedirectKind::Temporary.status_code(),
        }
    }
}

impl From<Redirect<'_>> for RedirectTarget {
    fn from(redirect: Redirect<'_>) -> Self {
        Self {
            location: redirect.target().to_owned(),
            status: redirect.status_code(),
            external: matches!(redirect, Redirect::External(_)),
        }
    }
}

/// Find the redirect for an exact path match.
#[must_use]
pub fn should_redirect<'a>(path: &str, config: &'a RedirectConfig) -> Option<Redirect<'a>> {
    if let Some(rule) = config.rules.iter().find(|rule| rule.from == path) {
        return Some(Redirect::Internal(rule));
    }
    config
        .external
        .iter()
        .find(|rule| rule.from == path)
        .map(Redirect::External)
}

/// Destination of the redirect matching `path`, if any.
#[must_use]
pub fn redirect_target<'a>(path: &str, config: &'a RedirectConfig) -> Option<&'a str> {
    should_redirect(path, config).map(|redirect| match redirect {
        Redirect::Internal(rule) => rule.to.as_str(),
        Redirect::External(rule) => rule.to.as_str(),
    })
}

/// Fallback target for unresolvable paths, when enabled.
#[must_use]
pub fn fallback_target(config: &RedirectConfig) -> Option<&str> {
    config
        .fallback
        .enabled
        .then_some(config.fallback.target.as_str())
}

/// Whether `url` is an absolute `http` or `https` URL.
#[must_use]
pub fn is_external_url(url: &str) -> bool {
    let Some((scheme, rest)) = url.split_once("://") else {
        return false;
    };
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    (scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")) && !host.is_empty()
}

/// Normalize a request path: ensure a leading `/` and drop one trailing `/`
/// (except for the root).
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let trimmed = if path != "/" {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    };
    if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}
