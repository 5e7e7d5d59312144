//! rolegate: role-gated axum routes backed by cached Auth0 profile lookups.
//!
//! This facade re-exports the workspace crates through one dependency:
//!
//! ```ignore
//! use rolegate::prelude::*;
//!
//! let config = RolegateConfig::load("dev")?;
//! let auth = ProfileConfig::from_config(&config)?;
//! let app = Router::new()
//!     .route("/reports", get(reports))
//!     .layer(auth.layer())
//!     .layer(default_trace());
//! ```
//!
//! | Module              | Crate               |
//! |---------------------|---------------------|
//! | `rolegate_core`     | `rolegate-core`     |
//! | `rolegate_cache`    | `rolegate-cache`    |
//! | `rolegate_security` | `rolegate-security` |

pub use rolegate_cache;
pub use rolegate_core;
pub use rolegate_security;

pub use rolegate_core::*;
pub use rolegate_security::{
    CachedResolver, Profile, ProfileConfig, ProfileError, ProfileResolver, RemoteResolver,
    RequestContext, RoleFilter, RoleLayer,
};

pub mod prelude {
    //! Everything needed to gate routes by role.
    pub use rolegate_cache::{spawn_sweeper, SweeperHandle, TtlCache};
    pub use rolegate_core::{
        default_trace, init_tracing, ConfigError, HttpError, RolegateConfig,
    };
    pub use rolegate_security::prelude::*;
    pub use rolegate_security::{
        bearer_token, context_token, ProfileEndpoint, RoleLayer, RoleSet, TokenSource,
    };
}
