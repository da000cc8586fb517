//! Path exclusion matching

/// A path that bypasses authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionRule {
    /// Exact path, stored with a trailing `/`
    Exact(String),
    /// Path prefix, configured with a trailing `*` and stored without it
    Prefix(String),
}

impl ExclusionRule {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix('*') {
            Some(prefix) => ExclusionRule::Prefix(prefix.to_string()),
            None => ExclusionRule::Exact(normalize(pattern)),
        }
    }

    pub fn parse_all<S: AsRef<str>>(patterns: &[S]) -> Vec<Self> {
        patterns.iter().map(|p| Self::parse(p.as_ref())).collect()
    }

    /// `path` must already be normalized
    fn matches(&self, path: &str) -> bool {
        match self {
            ExclusionRule::Exact(excluded) => excluded == path,
            ExclusionRule::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

fn normalize(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Whether a request path must be authenticated.
///
/// `/api/v1/status` and `/api/v1/status/` are equivalent. The first matching
/// rule wins.
pub fn requires_auth(path: Option<&str>, exclusions: &[ExclusionRule]) -> bool {
    let path = match path {
        Some(p) if !p.is_empty() => p,
        _ => return true,
    };
    if exclusions.is_empty() {
        return true;
    }

    let path = normalize(path);
    !exclusions.iter().any(|rule| rule.matches(&path))
}
