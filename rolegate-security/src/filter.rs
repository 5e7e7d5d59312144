use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::request::Parts;
use axum::http::{Method, Request};
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::context::RequestContext;
use crate::error::ProfileError;
use crate::extractor::{bearer_token, TokenExtractor};
use crate::profile::{Profile, RoleSet};
use crate::resolver::ProfileResolver;

/// Context key the accepted profile is stored under unless configured.
pub const DEFAULT_PROFILE_KEY: &str = "auth0-user";

/// Shared settings for role-gated routes: resolver, context key and
/// credential extractor.
///
/// Build one per application, then call [`restrict_to`](Self::restrict_to)
/// per route:
///
/// ```ignore
/// let filter = RoleFilter::new(Arc::new(resolver));
/// let app = Router::new()
///     .route("/admin", get(admin))
///     .layer(filter.restrict_to(["staff", "manager"]));
/// ```
pub struct RoleFilter<R> {
    resolver: Arc<R>,
    profile_key: Arc<str>,
    extractor: TokenExtractor,
}

impl<R> Clone for RoleFilter<R> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            profile_key: self.profile_key.clone(),
            extractor: self.extractor.clone(),
        }
    }
}

impl<R: ProfileResolver + 'static> RoleFilter<R> {
    /// Bearer header extraction, profile stored under [`DEFAULT_PROFILE_KEY`].
    pub fn new(resolver: Arc<R>) -> Self {
        Self::with_key(resolver, DEFAULT_PROFILE_KEY)
    }

    /// Bearer header extraction, profile stored under `key`.
    pub fn with_key(resolver: Arc<R>, key: impl Into<String>) -> Self {
        Self::custom(resolver, key, bearer_token())
    }

    pub fn custom(resolver: Arc<R>, key: impl Into<String>, extractor: TokenExtractor) -> Self {
        let key: String = key.into();
        Self {
            resolver,
            profile_key: Arc::from(key),
            extractor,
        }
    }

    pub fn resolver(&self) -> &Arc<R> {
        &self.resolver
    }

    pub fn profile_key(&self) -> &str {
        &self.profile_key
    }

    /// Policy accepting profiles holding at least one of `roles`.
    pub fn policy<I, S>(&self, roles: I) -> RolePolicy<R>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RolePolicy {
            resolver: self.resolver.clone(),
            profile_key: self.profile_key.clone(),
            extractor: self.extractor.clone(),
            required: roles.into_iter().collect(),
        }
    }

    /// Layer rejecting requests whose profile holds none of `roles`.
    ///
    /// An empty `roles` gives a layer that lets every request through
    /// untouched.
    pub fn restrict_to<I, S>(&self, roles: I) -> RoleLayer<R>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RoleLayer {
            policy: Arc::new(self.policy(roles)),
        }
    }
}

/// The authorization decision for one set of required roles.
pub struct RolePolicy<R> {
    resolver: Arc<R>,
    profile_key: Arc<str>,
    extractor: TokenExtractor,
    required: RoleSet,
}

impl<R: ProfileResolver> RolePolicy<R> {
    pub fn required(&self) -> &RoleSet {
        &self.required
    }

    pub fn profile_key(&self) -> &str {
        &self.profile_key
    }

    /// `true` when no role is required; such a policy never resolves.
    pub fn is_open(&self) -> bool {
        self.required.is_empty()
    }

    /// Decide whether the request may proceed.
    ///
    /// `Ok(None)` means it passes without a profile (open policy or
    /// `OPTIONS`). `Ok(Some(_))` carries the accepted profile. Any error
    /// must be answered with 401.
    pub async fn authorize(&self, parts: &Parts) -> Result<Option<Profile>, ProfileError> {
        if self.is_open() || parts.method == Method::OPTIONS {
            return Ok(None);
        }

        let credential = (self.extractor)(parts);
        let profile = self.resolver.resolve(&credential).await.inspect_err(|e| {
            warn!(uri = %parts.uri, error = %e, "Failed to resolve profile");
        })?;

        if !profile.has_roles() {
            warn!(uri = %parts.uri, user_id = %profile.user_id, "Profile has no roles");
            return Err(ProfileError::Unauthorized);
        }
        if !profile.contains_any_role(&self.required) {
            warn!(
                uri = %parts.uri,
                user_id = %profile.user_id,
                roles = ?profile.roles(),
                "Profile lacks every required role"
            );
            return Err(ProfileError::Unauthorized);
        }

        debug!(user_id = %profile.user_id, "Profile authorized");
        Ok(Some(profile))
    }
}

/// Tower layer produced by [`RoleFilter::restrict_to`].
pub struct RoleLayer<R> {
    policy: Arc<RolePolicy<R>>,
}

impl<R> Clone for RoleLayer<R> {
    fn clone(&self) -> Self {
        Self {
            policy: self.policy.clone(),
        }
    }
}

impl<R> RoleLayer<R> {
    pub fn policy(&self) -> &RolePolicy<R> {
        &self.policy
    }
}

impl<S, R> Layer<S> for RoleLayer<R> {
    type Service = RoleService<S, R>;

    fn layer(&self, inner: S) -> Self::Service {
        RoleService {
            inner,
            policy: self.policy.clone(),
        }
    }
}

/// Service enforcing a [`RolePolicy`] before calling the inner service.
pub struct RoleService<S, R> {
    inner: S,
    policy: Arc<RolePolicy<R>>,
}

impl<S: Clone, R> Clone for RoleService<S, R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            policy: self.policy.clone(),
        }
    }
}

impl<S, R, B> Service<Request<B>> for RoleService<S, R>
where
    S: Service<Request<B>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
    R: ProfileResolver + 'static,
    B: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        // The clone may not be ready; keep the one that was polled.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let policy = self.policy.clone();

        Box::pin(async move {
            if policy.is_open() {
                return inner.call(req).await;
            }

            let (mut parts, body) = req.into_parts();
            match policy.authorize(&parts).await {
                Ok(Some(profile)) => {
                    RequestContext::stash_profile(&mut parts, &policy.profile_key, profile);
                }
                Ok(None) => {}
                Err(e) => return Ok(e.into_response()),
            }
            inner.call(Request::from_parts(parts, body)).await
        })
    }
}
