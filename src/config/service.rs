use secrecy::SecretString;
use serde::Deserialize;

use crate::auth::credentials::{deserialize_secret_option, Credentials};
use crate::config::settings::SettingsConfig;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Where and as whom to sign in. Any field may also come from the command
/// line or the environment, see the binary.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    pub endpoint: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_secret_option")]
    pub password: Option<SecretString>,
}

impl AuthConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone().unwrap_or_default(),
            password: self
                .password
                .clone()
                .unwrap_or_else(|| SecretString::new(String::new())),
        }
    }

    /// Values present in `other` win.
    pub fn merge(self, other: AuthConfig) -> AuthConfig {
        AuthConfig {
            endpoint: other.endpoint.or(self.endpoint),
            email: other.email.or(self.email),
            password: other.password.or(self.password),
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::{ExposeSecret, SecretString};

    use super::AuthConfig;

    #[test]
    fn merge_prefers_override_values() {
        let file = AuthConfig {
            endpoint: Some("https://file.example.com".into()),
            email: Some("file@example.com".into()),
            password: None,
        };
        let cli = AuthConfig {
            endpoint: None,
            email: Some("cli@example.com".into()),
            password: Some(SecretString::new("pw".to_string())),
        };

        let merged = file.merge(cli);
        assert_eq!(merged.endpoint.as_deref(), Some("https://file.example.com"));
        assert_eq!(merged.email.as_deref(), Some("cli@example.com"));
        assert_eq!(merged.credentials().password.expose_secret(), "pw");
        assert!(!format!("{merged:?}").contains("\"pw\""));
    }
}
