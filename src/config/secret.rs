//! Secret handling for API keys and passwords read from the env file
//!
//! Values such as `ATLAS_API_PRIVATE_KEY`, `MONGO_PASS`, `KAFKA_PASSWORD` and the ngrok
//! auth token are kept in [`SecretString`], which zeroes its memory on drop and redacts
//! itself in `Debug` output.
//!
//! # Example
//!
//! ```rust
//! use orderflow::config::secret_from;
//! use secrecy::ExposeSecret;
//!
//! let password = secret_from("hunter2");
//! assert!(!format!("{password:?}").contains("hunter2"));
//! assert_eq!(password.expose_secret().as_str(), "hunter2");
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret};
use serde::{Serialize, Serializer};
use zeroize::Zeroize;

/// String payload of a [`SecretString`]
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl SecretValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Request bodies embed the exposed value directly
impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

/// Secret string read from the env file
pub type SecretString = Secret<SecretValue>;

/// Wrap a plain value into a [`SecretString`]
pub fn secret_from(value: impl Into<String>) -> SecretString {
    Secret::new(SecretValue::from(value.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = secret_from("my-password");
        let debug = format!("{secret:?}");
        assert!(!debug.contains("my-password"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_exposed_value_serializes_plain() {
        let secret = secret_from("token");
        let json = serde_json::to_string(secret.expose_secret()).unwrap();
        assert_eq!(json, "\"token\"");
        assert_eq!(secret.expose_secret().as_str(), "token");
    }
}
