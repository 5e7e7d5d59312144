use std::future::Future;
use std::time::Duration;

use rolegate_cache::{spawn_sweeper, SweeperHandle, TtlCache};
use tracing::{debug, trace};

use crate::error::ProfileError;
use crate::profile::Profile;
use crate::remote::RemoteResolver;
use crate::resolver::ProfileResolver;

/// Wraps a resolver with a TTL cache keyed by the raw credential.
///
/// Hits never reach the inner resolver. Misses call it once and store a
/// successful result for `ttl`; failures are returned as-is and never
/// cached.
///
/// Concurrent misses for the same credential are not coalesced: each one
/// calls the inner resolver and the last write wins. No cache lock is held
/// while the inner resolver runs.
pub struct CachedResolver<R> {
    inner: R,
    cache: TtlCache<String, Profile>,
    ttl: Duration,
    sweeper: Option<SweeperHandle>,
}

impl<R: ProfileResolver> CachedResolver<R> {
    /// Create a cache with the given `ttl` and start a sweeper purging
    /// expired entries every `cleanup_interval`.
    ///
    /// A zero `ttl` disables caching: every entry is already expired when
    /// read, so each lookup reaches the inner resolver.
    ///
    /// A zero `cleanup_interval` starts no sweeper; expired entries are then
    /// only dropped when read. Must be called from within a Tokio runtime
    /// when `cleanup_interval` is non-zero.
    pub fn new(inner: R, ttl: Duration, cleanup_interval: Duration) -> Self {
        let cache = TtlCache::new(ttl);
        let sweeper = (!cleanup_interval.is_zero())
            .then(|| spawn_sweeper(cache.clone(), cleanup_interval));
        Self {
            inner,
            cache,
            ttl,
            sweeper,
        }
    }

    /// Use an existing cache. No sweeper is started.
    pub fn with_cache(inner: R, cache: TtlCache<String, Profile>, ttl: Duration) -> Self {
        Self {
            inner,
            cache,
            ttl,
            sweeper: None,
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn cache(&self) -> &TtlCache<String, Profile> {
        &self.cache
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Forget the cached profile for one credential.
    pub fn invalidate(&self, credential: &str) {
        self.cache.remove(&credential.to_string());
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Stop the background sweeper. Idempotent; reads keep working.
    pub fn shutdown(&self) {
        if let Some(sweeper) = &self.sweeper {
            sweeper.stop();
        }
    }

    /// `true` while a sweeper is running for this cache.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper.as_ref().is_some_and(|s| !s.is_stopped())
    }

    async fn lookup(&self, credential: &str) -> Result<Profile, ProfileError> {
        let key = credential.to_string();
        if let Some(profile) = self.cache.get(&key) {
            trace!("Profile cache hit");
            return Ok(profile);
        }

        debug!("Profile cache miss, resolving upstream");
        let profile = self.inner.resolve(credential).await?;
        self.cache.insert_with_ttl(key, profile.clone(), self.ttl);
        Ok(profile)
    }
}

impl CachedResolver<RemoteResolver> {
    /// Cached `/tokeninfo` resolver for an Auth0 tenant subdomain.
    pub fn token_info(domain: &str, ttl: Duration, cleanup_interval: Duration) -> Self {
        Self::new(RemoteResolver::token_info(domain), ttl, cleanup_interval)
    }

    /// Cached `/userinfo` resolver for an Auth0 tenant subdomain.
    pub fn user_info(domain: &str, ttl: Duration, cleanup_interval: Duration) -> Self {
        Self::new(RemoteResolver::user_info(domain), ttl, cleanup_interval)
    }
}

impl<R: ProfileResolver> ProfileResolver for CachedResolver<R> {
    fn resolve(
        &self,
        credential: &str,
    ) -> impl Future<Output = Result<Profile, ProfileError>> + Send {
        self.lookup(credential)
    }
}
