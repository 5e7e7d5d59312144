use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::context::RequestContext;

/// Pulls the credential out of a request. An empty string means "none",
/// which the resolver then rejects.
pub type TokenExtractor = Arc<dyn Fn(&Parts) -> String + Send + Sync>;

const BEARER_PREFIX: &str = "Bearer ";

/// Value of the `Authorization` header with a leading `"Bearer "` removed.
///
/// The prefix match is case-sensitive. A value without the prefix is
/// returned unchanged; a missing or non-UTF-8 header yields `""`.
pub fn extract_bearer_token(parts: &Parts) -> String {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return String::new();
    };
    let Ok(value) = value.to_str() else {
        return String::new();
    };
    value.strip_prefix(BEARER_PREFIX).unwrap_or(value).to_string()
}

/// Extractor reading the bearer token from the `Authorization` header.
pub fn bearer_token() -> TokenExtractor {
    Arc::new(extract_bearer_token)
}

/// Extractor reading raw bytes stashed in the [`RequestContext`] under `key`,
/// decoded as lossy UTF-8. Missing values yield `""`.
pub fn context_token(key: impl Into<String>) -> TokenExtractor {
    let key: String = key.into();
    Arc::new(move |parts: &Parts| {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(|ctx| ctx.raw(&key))
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
            .unwrap_or_default()
    })
}
