//! Signing request types.

use std::str::FromStr;
use std::time::Duration;

use http::Method;
use strum::{AsRefStr, Display, IntoStaticStr};

use crate::error::SignError;

/// HTTP verb a pre-signed URL is valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Put,
}

impl Verb {
    /// Returns the matching HTTP method.
    pub fn method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Put => Method::PUT,
        }
    }
}

impl FromStr for Verb {
    type Err = SignError;

    /// Parses a verb case-insensitively; anything but `GET` and `PUT` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("get") {
            Ok(Self::Get)
        } else if s.eq_ignore_ascii_case("put") {
            Ok(Self::Put)
        } else {
            Err(SignError::UnsupportedVerb(s.to_owned()))
        }
    }
}

/// A single URL to sign. Created per invocation and consumed immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRequest {
    /// Object key, before folder prefixing.
    pub object_key: String,
    /// Verb the URL is valid for.
    pub verb: Verb,
    /// How long the URL stays valid.
    pub expiry: Duration,
}

impl SignRequest {
    /// Creates a new signing request.
    pub fn new(object_key: impl Into<String>, verb: Verb, expiry: Duration) -> Self {
        Self {
            object_key: object_key.into(),
            verb,
            expiry,
        }
    }

    /// Creates a signing request from a textual verb.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::UnsupportedVerb`] unless `verb` is `GET` or `PUT`
    /// in any case.
    pub fn parse(object_key: impl Into<String>, verb: &str, expiry: Duration) -> Result<Self, SignError> {
        Ok(Self::new(object_key, verb.parse()?, expiry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs_are_case_insensitive() {
        assert_eq!("get".parse::<Verb>().unwrap(), Verb::Get);
        assert_eq!("Put".parse::<Verb>().unwrap(), Verb::Put);
        assert_eq!(Verb::Get.to_string(), "GET");
        assert_eq!(Verb::Put.as_ref(), "PUT");
        assert_eq!(Verb::Put.method(), Method::PUT);
    }

    #[test]
    fn other_verbs_are_rejected() {
        for verb in ["DELETE", "head", "", "GETS"] {
            let err = SignRequest::parse("obj", verb, Duration::from_secs(1)).unwrap_err();
            assert!(matches!(err, SignError::UnsupportedVerb(ref v) if v == verb));
        }
    }
}
