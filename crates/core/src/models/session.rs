use chrono::{DateTime, Utc};

use crate::errors::CoreError;

/// An authenticated session: the bearer credential every backend call carries.
///
/// Created explicitly at login and handed to whatever talks to the backend;
/// logging out means dropping it. Nothing here lives in global state.
#[derive(Clone)]
pub struct Session {
    access_token: String,
    created_at: DateTime<Utc>,
}

impl Session {
    /// Start a session from the access token returned by the login endpoint.
    pub fn login(access_token: impl Into<String>) -> Result<Self, CoreError> {
        let access_token = access_token.into().trim().to_string();
        if access_token.is_empty() {
            return Err(CoreError::NotAuthenticated);
        }
        Ok(Self {
            access_token,
            created_at: Utc::now(),
        })
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}
