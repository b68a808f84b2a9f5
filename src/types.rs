use serde::{Deserialize, Serialize};
use std::borrow::Cow;

// =============================================================================
// AGENTS
// =============================================================================

/// Identifies the application a login is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Game or application name, e.g. "Minecraft"
    pub name: Cow<'static, str>,
    /// Agent protocol version, currently always 1
    pub version: u32,
}

impl Agent {
    /// Minecraft, version 1.
    pub const MINECRAFT: Self = Self {
        name: Cow::Borrowed("Minecraft"),
        version: 1,
    };

    /// Scrolls, version 1.
    pub const SCROLLS: Self = Self {
        name: Cow::Borrowed("Scrolls"),
        version: 1,
    };

    /// A custom agent for some other application.
    #[must_use]
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            version,
        }
    }
}

// =============================================================================
// REQUEST PAYLOADS
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthenticateRequest<'a> {
    pub agent: &'a Agent,
    pub username: &'a str,
    pub password: &'a str,
    pub client_token: &'a str,
    pub request_user: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub access_token: &'a str,
    pub client_token: &'a str,
    pub request_user: bool,
}

// =============================================================================
// EFFICIENT TYPES - just the tokens
// =============================================================================

/// Tokens issued by a successful authenticate or refresh call.
/// Use `AuthenticateResponseFull` if you need profiles and user data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateResponse {
    /// Bearer credential for subsequent authorized calls
    pub access_token: String,
    /// Echo of the client token sent with the request
    pub client_token: String,
}

// =============================================================================
// FULL TYPES - everything the service returns
// =============================================================================

/// Complete authenticate/refresh payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateResponseFull {
    pub access_token: String,
    pub client_token: String,
    /// Profiles the account owns for the requested agent (not sent on refresh)
    #[serde(default)]
    pub available_profiles: Vec<Profile>,
    /// Profile the token is bound to, if any
    #[serde(default)]
    pub selected_profile: Option<Profile>,
    /// Present because user data is always requested
    #[serde(default)]
    pub user: Option<User>,
}

/// A game profile owned by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Undashed UUID of the profile
    pub id: String,
    /// In-game name
    pub name: String,
    /// Set for profiles that have not been migrated to a newer account
    #[serde(default)]
    pub legacy: bool,
}

/// Account-level data returned when user data is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Undashed UUID of the account
    pub id: String,
    /// e.g. `preferredLanguage`, `twitch_access_token`
    #[serde(default)]
    pub properties: Vec<UserProperty>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProperty {
    pub name: String,
    pub value: String,
}
