use std::future::Future;
use std::sync::Arc;

use crate::error::ProfileError;
use crate::profile::Profile;

/// Turns a raw credential into a [`Profile`].
///
/// Implemented by [`RemoteResolver`](crate::RemoteResolver), which asks the
/// identity provider, and [`CachedResolver`](crate::CachedResolver), which
/// wraps another resolver with a TTL cache.
///
/// # Example
///
/// ```ignore
/// struct Fixed(Profile);
///
/// impl ProfileResolver for Fixed {
///     fn resolve(&self, _credential: &str)
///         -> impl Future<Output = Result<Profile, ProfileError>> + Send
///     {
///         std::future::ready(Ok(self.0.clone()))
///     }
/// }
/// ```
pub trait ProfileResolver: Send + Sync {
    fn resolve(
        &self,
        credential: &str,
    ) -> impl Future<Output = Result<Profile, ProfileError>> + Send;
}

impl<R: ProfileResolver> ProfileResolver for Arc<R> {
    fn resolve(
        &self,
        credential: &str,
    ) -> impl Future<Output = Result<Profile, ProfileError>> + Send {
        (**self).resolve(credential)
    }
}
