//! Site settings stored next to the content (`site.toml`).
//!
//! Holds the main menu sections and the redirect table. Settings are read on
//! every request, so a broken file must never take the site down: invalid
//! entries are dropped one by one with a warning, and
//! [`SiteSettings::load_or_default`] falls back to built-in defaults when the
//! file cannot be read or parsed at all.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Default order for sections and rules that don't specify one.
const DEFAULT_ORDER: i64 = 999;

/// Default fallback redirect target.
const DEFAULT_FALLBACK_TARGET: &str = "/home";

/// Site settings: main menu sections and redirects.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SiteSettings {
    /// Main menu sections, in file order.
    main_menu: Option<Vec<MainSectionConfig>>,
    /// Redirect configuration.
    redirects: Option<RedirectConfig>,
}

/// A top-level menu section.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct MainSectionConfig {
    /// Display label.
    pub label: String,
    /// Unique key, also the first slug segment of the section's documents.
    pub value: String,
    /// Icon name.
    #[serde(default)]
    pub icon: Option<String>,
    /// Sort order, ascending.
    #[serde(default = "default_order")]
    pub order: i64,
}

fn default_order() -> i64 {
    DEFAULT_ORDER
}

/// Redirect status class.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RedirectKind {
    /// 301 Moved Permanently.
    Permanent,
    /// 302 Found.
    #[default]
    Temporary,
}

impl RedirectKind {
    /// HTTP status code for this kind.
    #[must_use]
    pub fn status_code(self) -> u16 {
        match self {
            Self::Permanent => 301,
            Self::Temporary => 302,
        }
    }
}

/// Internal redirect rule.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RedirectRule {
    /// Exact path to match.
    pub from: String,
    /// Destination path.
    pub to: String,
    /// Permanent or temporary.
    #[serde(rename = "type", default)]
    pub kind: RedirectKind,
    /// Explicit status code; must agree with `kind` when present.
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RedirectRule {
    /// Status code to emit: the explicit `status`, else derived from `kind`.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.unwrap_or_else(|| self.kind.status_code())
    }
}

/// Redirect to an absolute URL outside the site.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ExternalRedirect {
    /// Exact path to match.
    pub from: String,
    /// Absolute `http(s)` URL.
    pub to: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Redirect applied to paths that resolve to nothing.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FallbackConfig {
    pub enabled: bool,
    pub target: String,
    pub description: Option<String>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target: DEFAULT_FALLBACK_TARGET.to_owned(),
            description: None,
        }
    }
}

/// Redirect table.
///
/// Fields missing from a `[redirects]` table are empty, not the defaults of
/// [`RedirectConfig::default`]; only the fallback keeps its defaults.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RedirectConfig {
    /// Internal rules, checked first.
    #[serde(default)]
    pub rules: Vec<RedirectRule>,
    /// External rules, checked after internal ones.
    #[serde(default)]
    pub external: Vec<ExternalRedirect>,
    #[serde(default)]
    pub fallback: FallbackConfig,
}

impl Default for RedirectConfig {
    /// Root goes to the home page; unknown paths fall back to it too.
    fn default() -> Self {
        Self {
            rules: vec![RedirectRule {
                from: "/".to_owned(),
                to: DEFAULT_FALLBACK_TARGET.to_owned(),
                kind: RedirectKind::Temporary,
                status: Some(302),
                description: None,
            }],
            external: Vec::new(),
            fallback: FallbackConfig::default(),
        }
    }
}

/// Sections used when `site.toml` has no `main_menu`.
fn default_sections() -> Vec<MainSectionConfig> {
    [
        ("首页", "home", 1),
        ("React", "react", 2),
        ("Vue", "vue", 3),
        ("Next.js", "next", 4),
    ]
    .into_iter()
    .map(|(label, value, order)| MainSectionConfig {
        label: label.to_owned(),
        value: value.to_owned(),
        icon: Some(value.to_owned()),
        order,
    })
    .collect()
}

fn is_http_url(value: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| value.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()))
}

impl SiteSettings {
    /// Parse settings from TOML text.
    ///
    /// Invalid sections and redirect entries are dropped with a warning; the
    /// rest of the file still applies.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let mut settings: Self = toml::from_str(text)?;
        settings.drop_invalid_entries();
        Ok(settings)
    }

    /// Read and parse a settings file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file doesn't exist, otherwise
    /// any error from reading or [`Self::from_toml`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Load settings, falling back to defaults on any failure.
    ///
    /// A missing file is expected (defaults are a valid site) and only logged
    /// at debug level.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(ConfigError::NotFound(_)) => {
                tracing::debug!(path = %path.display(), "No site settings, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Invalid site settings, using defaults");
                Self::default()
            }
        }
    }

    /// Main sections sorted by `order` (stable).
    #[must_use]
    pub fn main_sections(&self) -> Vec<MainSectionConfig> {
        let mut sections = self.main_menu.clone().unwrap_or_else(default_sections);
        sections.sort_by_key(|s| s.order);
        sections
    }

    /// Redirect table, or the default one when none is configured.
    #[must_use]
    pub fn redirects(&self) -> RedirectConfig {
        self.redirects.clone().unwrap_or_default()
    }

    /// Remove entries that cannot be applied, keeping the first of any
    /// duplicates.
    fn drop_invalid_entries(&mut self) {
        if let Some(sections) = &mut self.main_menu {
            let mut seen = HashSet::new();
            sections.retain(|section| {
                let problem = if section.value.is_empty() {
                    Some("empty value".to_owned())
                } else if !seen.insert(section.value.clone()) {
                    Some("duplicate value".to_owned())
                } else {
                    None
                };
                keep_or_warn("main_menu", &section.value, problem)
            });
        }

        let Some(redirects) = &mut self.redirects else {
            return;
        };

        let mut seen = HashSet::new();
        redirects.rules.retain(|rule| {
            let problem = if seen.insert(rule.from.clone()) {
                rule.status
                    .filter(|&status| status != rule.kind.status_code())
                    .map(|status| format!("status {status} does not match type {:?}", rule.kind))
            } else {
                Some("duplicate source".to_owned())
            };
            keep_or_warn("redirects.rules", &rule.from, problem)
        });
        redirects.external.retain(|rule| {
            let problem = if !seen.insert(rule.from.clone()) {
                Some("duplicate source".to_owned())
            } else if !is_http_url(&rule.to) {
                Some(format!("target '{}' is not an http(s) URL", rule.to))
            } else {
                None
            };
            keep_or_warn("redirects.external", &rule.from, problem)
        });
    }
}

fn keep_or_warn(table: &str, key: &str, problem: Option<String>) -> bool {
    match problem {
        Some(problem) => {
            tracing::warn!(table, key, problem = %problem, "Ignoring invalid site settings entry");
            false
        }
        None => true,
    }
}
