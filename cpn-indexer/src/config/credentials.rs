//! Resolution of secrets and endpoints from the environment or flags.
//!
//! The environment wins over flags, so credentials can stay out of shell
//! history. Lookups go through a function so tests never touch the process
//! environment.

use crate::IndexingError;

pub const SEARCH_USER_VAR: &str = "SEARCH_USER";
pub const SEARCH_PASSWORD_VAR: &str = "SEARCH_PASSWORD";
pub const STRAPI_URL_VAR: &str = "STRAPI_URL";
pub const STRAPI_TOKEN_VAR: &str = "STRAPI_TOKEN";

/// Username and password for the search hosts.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The environment value if set and non-empty, otherwise the flag.
pub fn env_or_flag<L>(lookup: &L, var: &str, flag: Option<&str>) -> Option<String>
where
    L: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|value| !value.is_empty())
        .or_else(|| flag.filter(|value| !value.is_empty()).map(str::to_string))
}

/// Resolve search credentials, failing when either half is missing.
pub fn resolve_credentials<L>(
    lookup: &L,
    user: Option<&str>,
    password: Option<&str>,
) -> Result<Credentials, IndexingError>
where
    L: Fn(&str) -> Option<String>,
{
    let username = env_or_flag(lookup, SEARCH_USER_VAR, user).ok_or_else(|| {
        IndexingError::config(format!("no search user: set {} or --user", SEARCH_USER_VAR))
    })?;
    let password = env_or_flag(lookup, SEARCH_PASSWORD_VAR, password).ok_or_else(|| {
        IndexingError::config(format!(
            "no search password: set {} or --password",
            SEARCH_PASSWORD_VAR
        ))
    })?;

    Ok(Credentials { username, password })
}

/// Resolve a required setting where the flag wins over the environment.
pub fn flag_or_env<L>(
    lookup: &L,
    flag: Option<&str>,
    var: &str,
    name: &str,
) -> Result<String, IndexingError>
where
    L: Fn(&str) -> Option<String>,
{
    flag.filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| lookup(var).filter(|value| !value.is_empty()))
        .ok_or_else(|| IndexingError::config(format!("no {}: pass it as a flag or set {}", name, var)))
}
