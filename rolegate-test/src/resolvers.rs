use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rolegate_security::{AppMetadata, Profile, ProfileError, ProfileResolver};

/// Profile with the given `user_id` and roles, everything else default.
pub fn profile_with_roles(user_id: &str, roles: &[&str]) -> Profile {
    Profile {
        user_id: user_id.to_string(),
        app_metadata: AppMetadata {
            roles: roles.iter().map(|r| r.to_string()).collect(),
        },
        ..Default::default()
    }
}

/// Answers from a fixed table, or with one profile for every credential.
/// Unknown credentials are `Unauthorized`.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    by_token: HashMap<String, Profile>,
    fallback: Option<Profile>,
}

impl StaticResolver {
    /// Same profile whatever the credential.
    pub fn always(profile: Profile) -> Self {
        Self {
            by_token: HashMap::new(),
            fallback: Some(profile),
        }
    }

    pub fn with(mut self, token: &str, profile: Profile) -> Self {
        self.by_token.insert(token.to_string(), profile);
        self
    }

    fn lookup(&self, credential: &str) -> Result<Profile, ProfileError> {
        self.by_token
            .get(credential)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or(ProfileError::Unauthorized)
    }
}

impl ProfileResolver for StaticResolver {
    fn resolve(
        &self,
        credential: &str,
    ) -> impl Future<Output = Result<Profile, ProfileError>> + Send {
        std::future::ready(self.lookup(credential))
    }
}

/// Fails every lookup with an error built by a closure.
#[derive(Clone)]
pub struct FailingResolver {
    make: Arc<dyn Fn() -> ProfileError + Send + Sync>,
}

impl FailingResolver {
    pub fn new(make: impl Fn() -> ProfileError + Send + Sync + 'static) -> Self {
        Self {
            make: Arc::new(make),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(|| ProfileError::Unauthorized)
    }

    /// Fails with the decode error of an empty body.
    pub fn undecodable() -> Self {
        Self::new(|| {
            let err = serde_json::from_slice::<Profile>(b"")
                .expect_err("empty input never decodes");
            ProfileError::Decode(err)
        })
    }
}

impl ProfileResolver for FailingResolver {
    fn resolve(
        &self,
        _credential: &str,
    ) -> impl Future<Output = Result<Profile, ProfileError>> + Send {
        std::future::ready(Err((self.make)()))
    }
}

/// Records every credential it sees, then delegates.
pub struct SpyResolver<R> {
    inner: R,
    seen: Mutex<Vec<String>>,
}

impl<R: ProfileResolver> SpyResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Credentials received so far, in call order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().expect("spy lock poisoned").clone()
    }

    async fn record(&self, credential: &str) -> Result<Profile, ProfileError> {
        self.seen
            .lock()
            .expect("spy lock poisoned")
            .push(credential.to_string());
        self.inner.resolve(credential).await
    }
}

impl<R: ProfileResolver> ProfileResolver for SpyResolver<R> {
    fn resolve(
        &self,
        credential: &str,
    ) -> impl Future<Output = Result<Profile, ProfileError>> + Send {
        self.record(credential)
    }
}

/// Counts calls and optionally sleeps before delegating, to widen race
/// windows in concurrency tests.
pub struct CountingResolver<R> {
    inner: R,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl<R: ProfileResolver> CountingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn count(&self, credential: &str) -> Result<Profile, ProfileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.resolve(credential).await
    }
}

impl<R: ProfileResolver> ProfileResolver for CountingResolver<R> {
    fn resolve(
        &self,
        credential: &str,
    ) -> impl Future<Output = Result<Profile, ProfileError>> + Send {
        self.count(credential)
    }
}
