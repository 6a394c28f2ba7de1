//! Route table: path prefixes mapped to fragment names.
//!
//! Matching is longest-prefix on path-segment boundaries, so `/food` never
//! claims `/foodstuff`.

use shared_types::FragmentName;
use thiserror::Error;

/// Invalid route configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Route prefix must start with '/': {prefix}")]
    InvalidPrefix { prefix: String },

    #[error("Duplicate route prefix: {prefix}")]
    DuplicatePrefix { prefix: String },
}

/// One configured route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub prefix: String,
    pub fragment: FragmentName,
}

/// Result of matching a path against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub prefix: String,
    pub fragment: FragmentName,
    /// Remainder of the path beneath the prefix, always starting with `/`.
    pub sub_path: String,
}

/// Immutable prefix table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    /// Sorted by descending prefix length.
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build a table, normalising trailing slashes.
    ///
    /// # Errors
    ///
    /// Fails if a prefix does not start with `/` or two prefixes collide
    /// after normalisation.
    pub fn new<I, P, F>(routes: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = (P, F)>,
        P: Into<String>,
        F: Into<FragmentName>,
    {
        let mut table: Vec<Route> = Vec::new();
        for (prefix, fragment) in routes {
            let prefix = normalise(prefix.into())?;
            if table.iter().any(|route| route.prefix == prefix) {
                return Err(RouteError::DuplicatePrefix { prefix });
            }
            table.push(Route {
                prefix,
                fragment: fragment.into(),
            });
        }
        table.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

        Ok(Self { routes: table })
    }

    /// Longest route whose prefix covers `path`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let path = strip_query(path);
        self.routes.iter().find_map(|route| {
            sub_path(&route.prefix, path).map(|sub_path| RouteMatch {
                prefix: route.prefix.clone(),
                fragment: route.fragment.clone(),
                sub_path,
            })
        })
    }

    /// Every configured route, longest prefix first.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn normalise(prefix: String) -> Result<String, RouteError> {
    if !prefix.starts_with('/') {
        return Err(RouteError::InvalidPrefix { prefix });
    }
    let trimmed = prefix.trim_end_matches('/');
    Ok(if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    })
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

fn sub_path(prefix: &str, path: &str) -> Option<String> {
    if prefix == "/" {
        return path.starts_with('/').then(|| path.to_string());
    }
    let rest = path.strip_prefix(prefix)?;
    match rest {
        "" => Some("/".to_string()),
        _ if rest.starts_with('/') => Some(rest.to_string()),
        _ => None,
    }
}
