use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::ProfileError;
use crate::profile::Profile;
use crate::resolver::ProfileResolver;

/// Host template of the identity provider; `{}` is the tenant subdomain.
pub const AUTH0_HOST_PATTERN: &str = "https://{}.auth0.com";

/// Which Auth0 endpoint answers profile lookups.
///
/// The endpoint decides both the URL path and the name of the single JSON
/// field carrying the credential.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProfileEndpoint {
    /// `POST /tokeninfo` with `{"id_token": ...}`.
    #[default]
    TokenInfo,
    /// `POST /userinfo` with `{"access_token": ...}`.
    UserInfo,
}

impl ProfileEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            ProfileEndpoint::TokenInfo => "tokeninfo",
            ProfileEndpoint::UserInfo => "userinfo",
        }
    }

    pub fn token_field(self) -> &'static str {
        match self {
            ProfileEndpoint::TokenInfo => "id_token",
            ProfileEndpoint::UserInfo => "access_token",
        }
    }

    /// Full endpoint URL for an Auth0 tenant subdomain (e.g. `"some.eu"`).
    pub fn url_for(self, domain: &str) -> String {
        format!(
            "{}/{}",
            AUTH0_HOST_PATTERN.replace("{}", domain),
            self.path()
        )
    }
}

impl FromStr for ProfileEndpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tokeninfo" => Ok(ProfileEndpoint::TokenInfo),
            "userinfo" => Ok(ProfileEndpoint::UserInfo),
            other => Err(format!("unknown profile endpoint '{other}' (expected tokeninfo or userinfo)")),
        }
    }
}

/// Resolves credentials by POSTing them to the identity provider.
///
/// One request per call, no retry. The endpoint URL is computed once at
/// construction.
#[derive(Debug, Clone)]
pub struct RemoteResolver {
    url: String,
    endpoint: ProfileEndpoint,
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl RemoteResolver {
    /// Resolver for the given Auth0 tenant subdomain and endpoint.
    pub fn new(domain: &str, endpoint: ProfileEndpoint) -> Self {
        Self::with_url(endpoint.url_for(domain), endpoint)
    }

    /// Resolver using `/tokeninfo`.
    pub fn token_info(domain: &str) -> Self {
        Self::new(domain, ProfileEndpoint::TokenInfo)
    }

    /// Resolver using `/userinfo`.
    pub fn user_info(domain: &str) -> Self {
        Self::new(domain, ProfileEndpoint::UserInfo)
    }

    /// Resolver posting to an explicit URL (proxies, test servers).
    pub fn with_url(url: impl Into<String>, endpoint: ProfileEndpoint) -> Self {
        Self {
            url: url.into(),
            endpoint,
            client: reqwest::Client::new(),
            timeout: None,
        }
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Bound each lookup. Without this only the transport defaults apply.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn endpoint(&self) -> ProfileEndpoint {
        self.endpoint
    }

    async fn fetch(&self, credential: &str) -> Result<Profile, ProfileError> {
        let mut body = serde_json::Map::with_capacity(1);
        body.insert(
            self.endpoint.token_field().to_string(),
            serde_json::Value::String(credential.to_string()),
        );

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        debug!(url = %self.url, "Requesting profile from identity provider");
        let response = request.send().await.map_err(|e| {
            warn!(url = %self.url, error = %e, "Identity provider request failed");
            ProfileError::Transport(e)
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(url = %self.url, status = status.as_u16(), "Identity provider rejected credential");
            return Err(ProfileError::Unauthorized);
        }

        let bytes = response.bytes().await?;
        let profile: Profile = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(url = %self.url, error = %e, "Identity provider sent an unreadable profile");
            ProfileError::Decode(e)
        })?;
        Ok(profile)
    }
}

impl ProfileResolver for RemoteResolver {
    fn resolve(
        &self,
        credential: &str,
    ) -> impl Future<Output = Result<Profile, ProfileError>> + Send {
        self.fetch(credential)
    }
}
