use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Sign-in credentials, serialized as the request body `{"email", "password"}`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    #[serde(serialize_with = "serialize_secret")]
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::new(password.into()),
        }
    }
}

pub fn serialize_secret<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::ser::Serializer,
{
    serializer.serialize_str(secret.expose_secret())
}

pub fn deserialize_secret_option<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.map(SecretString::new))
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;
    use serde_json::json;

    use super::Credentials;

    #[test]
    fn debug_redacts_password() {
        let creds = Credentials::new("ops@example.com", "hunter2");
        let printed = format!("{creds:?}");
        assert!(printed.contains("ops@example.com"));
        assert!(!printed.contains("hunter2"));
        assert_eq!(creds.password.expose_secret(), "hunter2");
    }

    #[test]
    fn serializes_as_sign_in_body() {
        let creds = Credentials::new("ops@example.com", "hunter2");
        assert_eq!(
            serde_json::to_value(&creds).unwrap(),
            json!({"email": "ops@example.com", "password": "hunter2"})
        );
    }
}
