//! Role-gated request filter for axum.
//!
//! A bearer credential is resolved to an Auth0 [`Profile`] by a
//! [`RemoteResolver`], memoised by a [`CachedResolver`], and checked against
//! the roles a route requires by the tower layer built with
//! [`RoleFilter::restrict_to`].

pub mod cached;
pub mod config;
pub mod context;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod profile;
pub mod remote;
pub mod resolver;

pub use cached::CachedResolver;
pub use config::{ProfileConfig, TokenSource, DEFAULT_CACHE_TTL};
pub use context::{ContextValue, RequestContext};
pub use error::ProfileError;
pub use extractor::{bearer_token, context_token, extract_bearer_token, TokenExtractor};
pub use filter::{RoleFilter, RoleLayer, RolePolicy, RoleService, DEFAULT_PROFILE_KEY};
pub use profile::{AppMetadata, Profile, RoleSet};
pub use remote::{ProfileEndpoint, RemoteResolver, AUTH0_HOST_PATTERN};
pub use resolver::ProfileResolver;

pub mod prelude {
    //! Re-exports of the most commonly used types.
    pub use crate::{
        CachedResolver, Profile, ProfileConfig, ProfileError, ProfileResolver, RemoteResolver,
        RequestContext, RoleFilter, DEFAULT_PROFILE_KEY,
    };
}
