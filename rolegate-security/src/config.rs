use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rolegate_core::{ConfigError, RolegateConfig};

use crate::cached::CachedResolver;
use crate::extractor::{bearer_token, context_token, TokenExtractor};
use crate::filter::{RoleFilter, RoleLayer, DEFAULT_PROFILE_KEY};
use crate::remote::{ProfileEndpoint, RemoteResolver};

/// Profile lookups are cached for five minutes unless configured.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Where the role filter reads the credential from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// `Authorization: Bearer <token>`.
    Header,
    /// Raw bytes stashed in the request context under the given key.
    Context(String),
}

impl TokenSource {
    pub fn extractor(&self) -> TokenExtractor {
        match self {
            TokenSource::Header => bearer_token(),
            TokenSource::Context(key) => context_token(key.clone()),
        }
    }
}

/// Settings for the identity provider, the profile cache and the filter.
///
/// Read from `auth.*` keys:
///
/// ```yaml
/// auth:
///   provider:
///     domain: some.eu
///     endpoint: tokeninfo   # or userinfo
///     timeout: 5            # seconds, optional
///   cache:
///     ttl: 300              # 0 disables caching
///     cleanup: 300          # 0 disables the sweeper
///   roles: [staff, manager] # or "staff,manager"
///   profile:
///     key: auth0-user
///   token:
///     source: header        # or context
///     key: jwt              # required for context
/// ```
#[derive(Debug, Clone)]
pub struct ProfileConfig {
    /// Auth0 tenant subdomain, e.g. `some.eu` for `some.eu.auth0.com`.
    pub domain: String,
    pub endpoint: ProfileEndpoint,
    pub timeout: Option<Duration>,
    /// Lifetime of a cached profile. Zero means profiles are never reused.
    pub cache_ttl: Duration,
    pub cleanup_interval: Duration,
    pub roles: Vec<String>,
    pub profile_key: String,
    pub token_source: TokenSource,
}

impl ProfileConfig {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            endpoint: ProfileEndpoint::default(),
            timeout: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            cleanup_interval: DEFAULT_CACHE_TTL,
            roles: Vec::new(),
            profile_key: DEFAULT_PROFILE_KEY.to_string(),
            token_source: TokenSource::Header,
        }
    }

    pub fn with_endpoint(mut self, endpoint: ProfileEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the cache TTL. The cleanup interval follows it.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self.cleanup_interval = ttl;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_profile_key(mut self, key: impl Into<String>) -> Self {
        self.profile_key = key.into();
        self
    }

    pub fn with_token_source(mut self, source: TokenSource) -> Self {
        self.token_source = source;
        self
    }

    /// Read the `auth.*` section.
    ///
    /// # Errors
    ///
    /// `NotFound` when `auth.provider.domain` is missing, `TypeMismatch` for
    /// badly typed values, `Invalid` for an unknown endpoint or token source,
    /// or a context token source without `auth.token.key`.
    pub fn from_config(config: &RolegateConfig) -> Result<Self, ConfigError> {
        let domain: String = config.get("auth.provider.domain")?;

        let endpoint = match config.get_opt::<String>("auth.provider.endpoint")? {
            Some(raw) => ProfileEndpoint::from_str(&raw).map_err(|reason| ConfigError::Invalid {
                key: "auth.provider.endpoint".into(),
                reason,
            })?,
            None => ProfileEndpoint::default(),
        };

        let timeout: Option<Duration> = config.get_or("auth.provider.timeout", None)?;
        let cache_ttl: Duration = config.get_or("auth.cache.ttl", DEFAULT_CACHE_TTL)?;
        let cleanup_interval: Duration = config.get_or("auth.cache.cleanup", cache_ttl)?;

        let roles = split_roles(config.get_or::<Vec<String>>("auth.roles", Vec::new())?);

        let profile_key: String =
            config.get_or("auth.profile.key", DEFAULT_PROFILE_KEY.to_string())?;

        let source: String = config.get_or("auth.token.source", "header".to_string())?;
        let token_source = match source.trim().to_ascii_lowercase().as_str() {
            "header" => TokenSource::Header,
            "context" => match config.get_opt::<String>("auth.token.key")? {
                Some(key) if !key.is_empty() => TokenSource::Context(key),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "auth.token.key".into(),
                        reason: "required when auth.token.source is 'context'".into(),
                    })
                }
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "auth.token.source".into(),
                    reason: format!("unknown token source '{other}' (expected header or context)"),
                })
            }
        };

        Ok(Self {
            domain,
            endpoint,
            timeout,
            cache_ttl,
            cleanup_interval,
            roles,
            profile_key,
            token_source,
        })
    }

    /// Uncached resolver for the configured provider.
    pub fn remote_resolver(&self) -> RemoteResolver {
        let resolver = RemoteResolver::new(&self.domain, self.endpoint);
        match self.timeout {
            Some(timeout) => resolver.with_timeout(timeout),
            None => resolver,
        }
    }

    /// Cached resolver for the configured provider.
    ///
    /// Starts the cache sweeper, so this must run inside a Tokio runtime
    /// unless the cleanup interval is zero.
    pub fn resolver(&self) -> CachedResolver<RemoteResolver> {
        CachedResolver::new(self.remote_resolver(), self.cache_ttl, self.cleanup_interval)
    }

    /// Filter using the configured resolver, context key and token source.
    pub fn build_filter(&self) -> RoleFilter<CachedResolver<RemoteResolver>> {
        RoleFilter::custom(
            Arc::new(self.resolver()),
            self.profile_key.clone(),
            self.token_source.extractor(),
        )
    }

    /// Layer requiring any of the configured `auth.roles`.
    pub fn layer(&self) -> RoleLayer<CachedResolver<RemoteResolver>> {
        self.build_filter().restrict_to(self.roles.iter().cloned())
    }
}

/// Accepts both YAML lists and comma-separated strings (handy for env vars).
fn split_roles(raw: Vec<String>) -> Vec<String> {
    raw.iter()
        .flat_map(|entry| entry.split(','))
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}
