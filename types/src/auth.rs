//! Authentication payloads.

use serde::{Deserialize, Serialize};

use crate::ExtraFields;

/// Response of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    /// Absent or empty when the backend did not issue a session.
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

// Manual Debug impl to prevent leaking the access token in logs.
impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = if self.access_token.is_some() {
            "[REDACTED]"
        } else {
            "None"
        };
        f.debug_struct("TokenGrant")
            .field("access_token", &token)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Body of `POST /users/`.
#[derive(Clone, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_voice_style: Option<String>,
}

impl SignupRequest {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            full_name: full_name.into(),
            brand_voice_style: None,
        }
    }

    #[must_use]
    pub fn with_brand_voice_style(mut self, style: impl Into<String>) -> Self {
        self.brand_voice_style = Some(style.into());
        self
    }
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("full_name", &self.full_name)
            .field("brand_voice_style", &self.brand_voice_style)
            .finish()
    }
}

/// The authenticated user as reported by `GET /users/me`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_voice_style: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// OAuth authorization URL for linking a social account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub auth_url: String,
}

/// A social account linked to the user, from `GET /auth/social/accounts`.
///
/// The backend may include provider credentials among the unmodeled fields;
/// `Debug` prints only their names.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialAccount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl std::fmt::Debug for SocialAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocialAccount")
            .field("id", &self.id)
            .field("platform", &self.platform)
            .field("profile_name", &self.profile_name)
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}
