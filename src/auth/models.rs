use serde::{Deserialize, Serialize};
use std::fmt;

/// Access levels a page can declare.
///
/// The order of variants matters: `Public` is the least privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Publicly accessible content.
    Public = 0,
    /// Content visible to signed-in administrators only.
    Admin = 1,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLevel::Public => write!(f, "public"),
            AccessLevel::Admin => write!(f, "admin"),
        }
    }
}

impl AccessLevel {
    /// Parse an access level from a string (case-insensitive, whitespace-tolerant).
    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "public" => Some(AccessLevel::Public),
            "admin" => Some(AccessLevel::Admin),
            _ => None,
        }
    }
}

/// The backend a user signed in through at the hosted auth provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInProvider {
    Password,
    Google,
    Github,
}

/// An authenticated identity as reported by the hosted auth provider.
///
/// Anyone the provider vouches for is an administrator of the site; there
/// is no finer-grained role model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub email_verified: bool,
    pub provider_id: SignInProvider,
}
