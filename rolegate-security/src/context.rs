use std::collections::HashMap;
use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::Request;
use bytes::Bytes;

use crate::profile::Profile;

/// A value stored in a [`RequestContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    /// Raw bytes placed by upstream middleware, e.g. a credential.
    Raw(Bytes),
    /// A profile accepted by the role filter.
    Profile(Profile),
}

/// Per-request key/value store carried in the request extensions.
///
/// Upstream middleware stashes raw credentials here for
/// [`context_token`](crate::context_token); the role filter stores the
/// accepted profile under its configured key for handlers to read.
///
/// ```ignore
/// async fn me(ctx: RequestContext) -> Json<Profile> {
///     Json(ctx.profile(DEFAULT_PROFILE_KEY).cloned().unwrap_or_default())
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    values: HashMap<String, ContextValue>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context attached to the request, or an empty one.
    pub fn of(parts: &Parts) -> RequestContext {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default()
    }

    pub fn insert_raw(&mut self, key: impl Into<String>, value: impl Into<Bytes>) {
        self.values.insert(key.into(), ContextValue::Raw(value.into()));
    }

    pub fn insert_profile(&mut self, key: impl Into<String>, profile: Profile) {
        self.values.insert(key.into(), ContextValue::Profile(profile));
    }

    /// Raw bytes under `key`. `None` if absent or holding a profile.
    pub fn raw(&self, key: &str) -> Option<&Bytes> {
        match self.values.get(key) {
            Some(ContextValue::Raw(b)) => Some(b),
            _ => None,
        }
    }

    /// Profile under `key`. `None` if absent or holding raw bytes.
    pub fn profile(&self, key: &str) -> Option<&Profile> {
        match self.values.get(key) {
            Some(ContextValue::Profile(p)) => Some(p),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Store raw bytes under `key` in the request's context, creating the
    /// context if needed. Meant for middleware running before the filter.
    pub fn stash_raw<B>(req: &mut Request<B>, key: impl Into<String>, value: impl Into<Bytes>) {
        with_context(req.extensions_mut(), |ctx| ctx.insert_raw(key, value));
    }

    pub(crate) fn stash_profile(parts: &mut Parts, key: &str, profile: Profile) {
        with_context(&mut parts.extensions, |ctx| ctx.insert_profile(key, profile));
    }
}

fn with_context(extensions: &mut axum::http::Extensions, f: impl FnOnce(&mut RequestContext)) {
    let mut ctx = extensions.remove::<RequestContext>().unwrap_or_default();
    f(&mut ctx);
    extensions.insert(ctx);
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestContext::of(parts))
    }
}
