use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// How far a crawl may wander from its seed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginPolicy {
    /// Same scheme, host and port, and under the seed's directory
    #[default]
    PathPrefix,
    /// Same scheme, host and port anywhere on the site
    SameOrigin,
}

/// Canonical form used for every comparison: fragment removed.
///
/// Dot segments, scheme/host case and default ports are already
/// canonicalized by the URL parser, so this is idempotent.
pub fn normalize_url(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}

/// Parses and normalizes a URL string
pub fn normalize_str(url: &str) -> Result<Url, url::ParseError> {
    Url::parse(url).map(|u| normalize_url(&u))
}

/// Resolves a (possibly relative) link against the page it was found on
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let joined = base.join(href).ok()?;
    match joined.scheme() {
        "http" | "https" => Some(normalize_url(&joined)),
        _ => None,
    }
}

/// The prefix every crawled URL must start with, derived from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    prefix: String,
}

impl Scope {
    pub fn new(seed: &Url, policy: OriginPolicy) -> Self {
        let origin = seed.origin().ascii_serialization();
        let prefix = match policy {
            OriginPolicy::SameOrigin => format!("{}/", origin),
            OriginPolicy::PathPrefix => {
                let path = seed.path();
                let dir = match path.rfind('/') {
                    Some(idx) => &path[..=idx],
                    None => "/",
                };
                format!("{}{}", origin, dir)
            }
        };
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether the normalized form of `url` falls under this scope
    pub fn contains(&self, url: &Url) -> bool {
        normalize_url(url).as_str().starts_with(&self.prefix)
    }
}

/// Regex include/exclude rules layered on top of the scope check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlFilterConfig {
    /// If non-empty, at least one must match
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Takes precedence over include patterns
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

pub fn default_exclude_patterns() -> Vec<String> {
    vec![r"(?i)\.(jpg|jpeg|png|gif|css|js|ico|svg|woff|woff2|ttf|eot|pdf|zip)$".to_string()]
}

impl Default for UrlFilterConfig {
    fn default() -> Self {
        Self {
            include_patterns: Vec::new(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

/// Compiled include/exclude rules; the default lets every URL through
#[derive(Debug, Clone, Default)]
pub struct UrlFilter {
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl UrlFilter {
    pub fn new(config: &UrlFilterConfig) -> Result<Self, regex::Error> {
        let include_regexes = config
            .include_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        let exclude_regexes = config
            .exclude_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            include_regexes,
            exclude_regexes,
        })
    }

    pub fn allows(&self, url: &Url) -> bool {
        let url_str = url.as_str();

        if self.exclude_regexes.iter().any(|re| re.is_match(url_str)) {
            return false;
        }

        self.include_regexes.is_empty() || self.include_regexes.iter().any(|re| re.is_match(url_str))
    }
}
