//! Credentials source and access keys.

use std::fmt;

use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Declared origin of the access credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum CredentialsMode {
    /// Keys come from `access_key_id` and `secret_access_key`.
    Static,
    /// Keys come from the environment, shared profile or instance metadata.
    EnvOrProfile,
    /// Anonymous, read-only access.
    None,
}

/// Resolved access credentials.
///
/// Only [`CredentialsMode::Static`] carries keys; the other modes always hold
/// empty strings. The secret is never printed by the `Debug` implementation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Where the credentials come from.
    pub mode: CredentialsMode,
    /// Access key id, empty unless the mode is static.
    pub access_key_id: String,
    /// Secret access key, empty unless the mode is static.
    pub secret_access_key: String,
}

impl Credentials {
    /// Creates static credentials from an access key pair.
    pub fn fixed(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            mode: CredentialsMode::Static,
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Creates keyless credentials for the environment/profile chain or anonymous access.
    pub fn keyless(mode: CredentialsMode) -> Self {
        Self {
            mode,
            access_key_id: String::new(),
            secret_access_key: String::new(),
        }
    }

    /// Returns the static key pair, if any.
    pub fn static_keys(&self) -> Option<(&str, &str)> {
        match self.mode {
            CredentialsMode::Static => Some((&self.access_key_id, &self.secret_access_key)),
            CredentialsMode::EnvOrProfile | CredentialsMode::None => None,
        }
    }

    /// Returns whether requests are sent without any signature.
    #[inline]
    pub fn is_anonymous(&self) -> bool {
        self.mode == CredentialsMode::None
    }

    /// Returns a masked version of the access key id for logging.
    ///
    /// This shows only the first 4 characters followed by asterisks.
    pub fn access_key_masked(&self) -> String {
        if self.access_key_id.chars().count() <= 4 {
            "*".repeat(self.access_key_id.chars().count())
        } else {
            let head: String = self.access_key_id.chars().take(4).collect();
            format!("{head}***")
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("mode", &self.mode)
            .field("access_key_id", &self.access_key_masked())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn mode_round_trips_through_strings() {
        assert_eq!(
            CredentialsMode::from_str("env_or_profile").unwrap(),
            CredentialsMode::EnvOrProfile
        );
        assert_eq!(CredentialsMode::Static.as_ref(), "static");
        assert_eq!(CredentialsMode::None.to_string(), "none");
        assert!(CredentialsMode::from_str("magical_unicorns").is_err());
    }

    #[test]
    fn static_keys_only_for_static_mode() {
        let creds = Credentials::fixed("id", "secret");
        assert_eq!(creds.static_keys(), Some(("id", "secret")));

        let creds = Credentials::keyless(CredentialsMode::EnvOrProfile);
        assert_eq!(creds.static_keys(), None);
        assert!(!creds.is_anonymous());
        assert!(Credentials::keyless(CredentialsMode::None).is_anonymous());
    }

    #[test]
    fn debug_hides_secret() {
        let creds = Credentials::fixed("AKIATEST12345", "super-secret");
        let debug = format!("{creds:?}");
        assert!(debug.contains("AKIA***"));
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("AKIATEST12345"));
    }

    #[test]
    fn short_key_fully_masked() {
        let creds = Credentials::fixed("ABC", "secret");
        assert_eq!(creds.access_key_masked(), "***");
    }
}
