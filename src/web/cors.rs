//! Origin allow-list matching and the CORS header set attached to every
//! response on the subscribe path.

use axum::http::{header, HeaderMap, HeaderValue};
use lazy_regex::regex::{escape, Regex};

// ###################################
// ->   ORIGIN POLICY
// ###################################
/// A compiled origin allow-list. Patterns without a wildcard require exact
/// equality with the request's `Origin` header; a `*` inside a pattern
/// matches any substring, with everything around it taken literally.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: Vec<OriginPattern>,
}

#[derive(Debug, Clone)]
enum OriginPattern {
    Exact(String),
    Wildcard(Regex),
}

impl OriginPolicy {
    /// Compiles a comma-separated list of origin patterns.
    pub fn parse(allowed_origins: &str) -> Result<Self, InvalidOriginPattern> {
        let mut allowed = Vec::new();

        for pattern in allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            if pattern.contains('*') {
                let regex_src = format!(
                    "^{}$",
                    pattern
                        .split('*')
                        .map(escape)
                        .collect::<Vec<_>>()
                        .join(".*")
                );
                let regex = Regex::new(&regex_src).map_err(|e| InvalidOriginPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?;
                allowed.push(OriginPattern::Wildcard(regex));
            } else {
                allowed.push(OriginPattern::Exact(pattern.to_string()));
            }
        }

        Ok(OriginPolicy { allowed })
    }

    /// A missing `Origin` header is never allowed.
    pub fn is_allowed(&self, origin: Option<&str>) -> bool {
        let Some(origin) = origin else {
            return false;
        };

        self.allowed.iter().any(|pattern| match pattern {
            OriginPattern::Exact(allowed) => allowed == origin,
            OriginPattern::Wildcard(regex) => regex.is_match(origin),
        })
    }
}

/// The permissive method/header/max-age set is always present; the
/// allow-origin header gets added only when the origin is allowed, so a
/// disallowed origin's browser blocks the response on its own.
pub fn cors_headers(origin: Option<&str>, policy: &OriginPolicy) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static("86400"),
    );

    if policy.is_allowed(origin) {
        if let Some(value) = origin.and_then(|o| HeaderValue::from_str(o).ok()) {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
    }

    headers
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
#[error("failed to compile origin pattern '{pattern}': {reason}")]
pub struct InvalidOriginPattern {
    pub pattern: String,
    pub reason: String,
}
