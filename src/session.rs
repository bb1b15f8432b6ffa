//! Host-provided session identity
//!
//! The chat-platform host launches this client with a signed init-data
//! payload in the environment. The session is built from it exactly once at
//! startup; nothing else in the app reads the environment for identity.

use serde::Deserialize;

/// Environment variable the host launcher injects the init data into
pub const INIT_DATA_ENV: &str = "TINKVIEW_INIT_DATA";

/// Immutable identity for the lifetime of the process
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub display_name: String,
    /// Opaque signed payload, forwarded as-is where the backend needs it
    pub init_data: String,
}

#[derive(Debug, thiserror::Error)]
pub enum InitializationError {
    #[error("host init data is not available (set TINKVIEW_INIT_DATA or pass --user)")]
    MissingHostData,

    #[error("host init data does not carry a user identity")]
    MissingUser,

    #[error("host init data is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// User object embedded in the init-data payload
#[derive(Debug, Deserialize)]
struct HostUser {
    id: i64,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

impl HostUser {
    fn display_name(&self) -> String {
        let mut name = self.first_name.trim().to_string();
        if let Some(last) = self.last_name.as_deref() {
            if !last.trim().is_empty() {
                if !name.is_empty() {
                    name.push(' ');
                }
                name.push_str(last.trim());
            }
        }
        if name.is_empty() {
            if let Some(username) = self.username.as_deref() {
                name = format!("@{}", username);
            }
        }
        if name.is_empty() {
            name = format!("user {}", self.id);
        }
        name
    }
}

/// Acquire the host identity exactly once at startup.
///
/// Fails fast: if the host payload is absent and no development override is
/// given, no further progression (and no network call) happens.
pub fn bootstrap(user_override: Option<i64>) -> Result<Session, InitializationError> {
    if let Some(user_id) = user_override {
        return Ok(Session {
            user_id,
            display_name: format!("user {}", user_id),
            init_data: String::new(),
        });
    }

    let raw = std::env::var(INIT_DATA_ENV).map_err(|_| InitializationError::MissingHostData)?;
    parse_init_data(&raw)
}

/// Parse the url-encoded init-data payload the host hands over.
///
/// Only the `user` field is interpreted; the payload as a whole stays opaque.
fn parse_init_data(raw: &str) -> Result<Session, InitializationError> {
    let user_json = url::form_urlencoded::parse(raw.as_bytes())
        .find(|(key, _)| key == "user")
        .map(|(_, value)| value.into_owned())
        .ok_or(InitializationError::MissingUser)?;

    let user: HostUser = serde_json::from_str(&user_json)?;

    Ok(Session {
        user_id: user.id,
        display_name: user.display_name(),
        init_data: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_init_data() {
        let raw = "query_id=AAF3&user=%7B%22id%22%3A123456%2C%22first_name%22%3A%22Ivan%22%2C%22last_name%22%3A%22Petrov%22%2C%22username%22%3A%22ipetrov%22%7D&auth_date=1700000000&hash=abc";
        let session = parse_init_data(raw).unwrap();
        assert_eq!(session.user_id, 123456);
        assert_eq!(session.display_name, "Ivan Petrov");
        assert_eq!(session.init_data, raw);
    }

    #[test]
    fn test_parse_init_data_without_user() {
        let raw = "query_id=AAF3&auth_date=1700000000&hash=abc";
        assert!(matches!(
            parse_init_data(raw),
            Err(InitializationError::MissingUser)
        ));
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let raw = "user=%7B%22id%22%3A9%2C%22username%22%3A%22trader%22%7D";
        let session = parse_init_data(raw).unwrap();
        assert_eq!(session.display_name, "@trader");
    }

    #[test]
    fn test_user_override_skips_host_data() {
        let session = bootstrap(Some(77)).unwrap();
        assert_eq!(session.user_id, 77);
        assert!(session.init_data.is_empty());
    }
}
