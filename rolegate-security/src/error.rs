use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rolegate_core::HttpError;

/// Failure to turn a credential into an authorized profile.
#[derive(Debug)]
pub enum ProfileError {
    /// The identity provider could not be reached.
    Transport(reqwest::Error),

    /// The provider rejected the credential, or the profile lacks the
    /// required roles. Carries no detail.
    Unauthorized,

    /// The provider answered 200 with a body that is not a profile.
    Decode(serde_json::Error),
}

impl std::fmt::Display for ProfileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileError::Transport(e) => write!(f, "Identity provider unreachable: {e}"),
            ProfileError::Unauthorized => write!(f, "Unauthorized"),
            ProfileError::Decode(e) => write!(f, "Invalid profile payload: {e}"),
        }
    }
}

impl std::error::Error for ProfileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProfileError::Transport(e) => Some(e),
            ProfileError::Decode(e) => Some(e),
            ProfileError::Unauthorized => None,
        }
    }
}

impl From<reqwest::Error> for ProfileError {
    fn from(err: reqwest::Error) -> Self {
        ProfileError::Transport(err)
    }
}

impl From<serde_json::Error> for ProfileError {
    fn from(err: serde_json::Error) -> Self {
        ProfileError::Decode(err)
    }
}

impl ProfileError {
    /// Message exposed to clients, identical for every variant.
    pub fn public_message(&self) -> &'static str {
        "Unauthorized"
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ProfileError::Unauthorized)
    }
}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        rolegate_core::error_response(StatusCode::UNAUTHORIZED, self.public_message())
    }
}

impl From<ProfileError> for HttpError {
    fn from(err: ProfileError) -> Self {
        HttpError::Unauthorized(err.public_message().to_string())
    }
}
