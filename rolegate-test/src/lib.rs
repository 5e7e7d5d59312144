mod app;
mod provider;
mod resolvers;

pub use app::{json_at, TestApp, TestRequest, TestResponse};
pub use provider::{unreachable_url, MockProvider, RecordedRequest};
pub use resolvers::{profile_with_roles, CountingResolver, FailingResolver, SpyResolver, StaticResolver};
