//! Route table
//!
//! An ordered, immutable list of `(verb, pattern, operation)` entries. The
//! default table maps the five collection operations onto `/` and `/{id}`.
//! Callers customize routing by building a different table, never by
//! touching the launch sequence.
//!
//! # Example
//!
//! ```rust
//! use resource_controller::handler::Operation;
//! use resource_controller::routes::{RouteTable, Verb};
//!
//! // Read-only collection with an extra lookup route
//! let table = RouteTable::default()
//!     .without(Verb::Post, "/")
//!     .without(Verb::Put, "/{id}")
//!     .without(Verb::Delete, "/{id}")
//!     .with_route(Verb::Get, "/by-id/:id", Operation::Retrieve);
//!
//! assert_eq!(table.len(), 3);
//! assert_eq!(table.entries()[2].pattern, "/by-id/{id}");
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use axum::{
    http::Uri,
    routing::{MethodFilter, MethodRouter},
    Router,
};

use crate::handler::{Operation, ResourceHandler};
use crate::intercept::intercept;
use crate::response::Reply;
use crate::terminal::ErrorHandler;

/// HTTP verbs a route can answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl Verb {
    /// The axum method filter for this verb
    pub fn method_filter(self) -> MethodFilter {
        match self {
            Self::Get => MethodFilter::GET,
            Self::Post => MethodFilter::POST,
            Self::Put => MethodFilter::PUT,
            Self::Delete => MethodFilter::DELETE,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// One route: a verb and path pattern bound to a handler method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Verb the route answers
    pub verb: Verb,
    /// Path pattern in `{name}` syntax
    pub pattern: String,
    /// Handler method the route dispatches to
    pub operation: Operation,
}

impl RouteEntry {
    /// Create an entry; `:name` segments are accepted and rewritten to `{name}`
    pub fn new(verb: Verb, pattern: impl AsRef<str>, operation: Operation) -> Self {
        Self {
            verb,
            pattern: normalize_pattern(pattern.as_ref()),
            operation,
        }
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.verb, self.pattern, self.operation)
    }
}

/// Rewrite `:name` segments to `{name}` and ensure a leading slash
fn normalize_pattern(pattern: &str) -> String {
    let segments: Vec<String> = pattern
        .trim_start_matches('/')
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) if !name.is_empty() => format!("{{{name}}}"),
            _ => segment.to_string(),
        })
        .collect();
    format!("/{}", segments.join("/"))
}

/// Ordered list of routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::default_mappings()
    }
}

impl RouteTable {
    /// A table with no routes
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The stock collection routes
    ///
    /// | Verb | Path | Operation |
    /// |---|---|---|
    /// | GET | `/` | query |
    /// | GET | `/{id}` | retrieve |
    /// | POST | `/` | insert |
    /// | PUT | `/{id}` | update |
    /// | DELETE | `/{id}` | delete |
    pub fn default_mappings() -> Self {
        Self::empty()
            .with_route(Verb::Get, "/", Operation::Query)
            .with_route(Verb::Get, "/{id}", Operation::Retrieve)
            .with_route(Verb::Post, "/", Operation::Insert)
            .with_route(Verb::Put, "/{id}", Operation::Update)
            .with_route(Verb::Delete, "/{id}", Operation::Delete)
    }

    /// Append an entry
    pub fn push(&mut self, entry: RouteEntry) {
        self.entries.push(entry);
    }

    /// Append a route
    #[must_use]
    pub fn with_route(mut self, verb: Verb, pattern: &str, operation: Operation) -> Self {
        self.push(RouteEntry::new(verb, pattern, operation));
        self
    }

    /// Remove every route matching `verb` and `pattern`
    #[must_use]
    pub fn without(mut self, verb: Verb, pattern: &str) -> Self {
        let pattern = normalize_pattern(pattern);
        self.entries
            .retain(|e| !(e.verb == verb && e.pattern == pattern));
        self
    }

    /// Point the existing `verb` + `pattern` route at another operation
    ///
    /// Appends the route when none matches.
    #[must_use]
    pub fn replace(mut self, verb: Verb, pattern: &str, operation: Operation) -> Self {
        let entry = RouteEntry::new(verb, pattern, operation);
        match self
            .entries
            .iter_mut()
            .find(|e| e.verb == entry.verb && e.pattern == entry.pattern)
        {
            Some(existing) => existing.operation = operation,
            None => self.entries.push(entry),
        }
        self
    }

    /// Look up the first route for `verb` + `pattern`
    pub fn find(&self, verb: Verb, pattern: &str) -> Option<&RouteEntry> {
        let pattern = normalize_pattern(pattern);
        self.entries
            .iter()
            .find(|e| e.verb == verb && e.pattern == pattern)
    }

    /// Entries in table order
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build an axum router dispatching every entry through [`intercept`]
    ///
    /// Entries keep table order. A later entry with the same verb and pattern
    /// as an earlier one is skipped. Unmatched requests get `404 Not found`,
    /// whether the path is unknown or only the verb is.
    pub fn build_router<H: ResourceHandler>(
        &self,
        handler: Arc<H>,
        errors: Arc<dyn ErrorHandler>,
        body_limit: usize,
    ) -> Router {
        let mut seen: HashSet<(Verb, &str)> = HashSet::new();
        let mut groups: Vec<(&str, MethodRouter)> = Vec::new();

        for entry in &self.entries {
            if !seen.insert((entry.verb, entry.pattern.as_str())) {
                tracing::warn!(route = %entry, "Skipping duplicate route");
                continue;
            }

            let wrapped = intercept(
                Arc::clone(&handler),
                Arc::clone(&errors),
                entry.operation,
                body_limit,
            );
            let filter = entry.verb.method_filter();

            match groups.iter_mut().find(|(p, _)| *p == entry.pattern) {
                Some((_, methods)) => {
                    *methods = std::mem::take(methods).on(filter, wrapped);
                }
                None => groups.push((
                    entry.pattern.as_str(),
                    MethodRouter::new().on(filter, wrapped),
                )),
            }
            tracing::debug!(route = %entry, "Registered route");
        }

        groups
            .into_iter()
            .fold(Router::new(), |router, (pattern, methods)| {
                router.route(pattern, methods)
            })
            .fallback(unmatched)
            .method_not_allowed_fallback(unmatched)
    }
}

async fn unmatched(uri: Uri) -> Reply {
    tracing::debug!(uri = %uri, "No route matched");
    Reply::not_found()
}
