//! OpenStack Swift and Ceph RGW temporary URLs.
//!
//! A temporary URL carries an HMAC over the verb, the expiry timestamp and the
//! object path, keyed with the account's temp URL key:
//!
//! ```text
//! https://{host}[/swift]/v1/{account}/{bucket}/{key}?temp_url_sig={hex}&temp_url_expires={unix}
//! ```

use hmac::Hmac;
use hmac::digest::KeyInit;
use hmac::Mac;
use jiff::Timestamp;
use s3cli_config::ResolvedConfig;
use sha1::Sha1;
use sha2::Sha256;

use crate::TRACING_TARGET_SIGN;
use crate::error::{SignError, SignResult};
use crate::request::SignRequest;

/// Path segment Ceph RGW mounts its Swift API under.
const CEPH_SWIFT_PREFIX: &str = "/swift";

/// Signs temporary URLs for OpenStack Swift compatible backends.
#[derive(Clone)]
pub struct SwiftSigner {
    host: Option<String>,
    account: String,
    bucket: String,
    temp_url_key: Option<String>,
    ceph: bool,
}

impl SwiftSigner {
    /// Captures the Swift settings of `config`.
    ///
    /// Missing settings are reported when a URL is signed.
    pub fn new(config: &ResolvedConfig) -> Self {
        Self {
            host: config.host.clone(),
            account: config.swift_auth_account.clone().unwrap_or_default(),
            bucket: config.bucket_name.clone(),
            temp_url_key: config.swift_temp_url_key.clone(),
            ceph: config.ceph_compatible,
        }
    }

    /// Signs `request`, reading the clock once.
    pub fn sign(&self, request: &SignRequest) -> SignResult<String> {
        self.sign_at(request, Timestamp::now())
    }

    /// Signs `request` as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::MissingHost`] without a host and
    /// [`SignError::MissingTempUrlKey`] without a temp URL key.
    pub fn sign_at(&self, request: &SignRequest, now: Timestamp) -> SignResult<String> {
        let host = self.host.as_deref().ok_or(SignError::MissingHost)?;
        let temp_url_key = self
            .temp_url_key
            .as_deref()
            .ok_or(SignError::MissingTempUrlKey)?;

        let expires_at = now
            .checked_add(request.expiry)
            .map_err(SignError::InvalidExpiry)?
            .as_second();

        let path = format!(
            "/v1/{}/{}/{}",
            self.account, self.bucket, request.object_key
        );
        let payload = format!("{}\n{expires_at}\n{path}", request.verb);

        let signature = if self.ceph {
            hex_hmac::<Hmac<Sha1>>(temp_url_key, &payload)
        } else {
            hex_hmac::<Hmac<Sha256>>(temp_url_key, &payload)
        };

        let prefix = if self.ceph { CEPH_SWIFT_PREFIX } else { "" };

        tracing::debug!(
            target: TRACING_TARGET_SIGN,
            verb = %request.verb,
            path = %path,
            expires_at,
            ceph = self.ceph,
            "signed temporary url"
        );

        Ok(format!(
            "https://{host}{prefix}{path}?temp_url_sig={signature}&temp_url_expires={expires_at}"
        ))
    }
}

impl std::fmt::Debug for SwiftSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwiftSigner")
            .field("host", &self.host)
            .field("account", &self.account)
            .field("bucket", &self.bucket)
            .field("ceph", &self.ceph)
            .finish_non_exhaustive()
    }
}

/// Returns the lowercase hex HMAC of `payload` keyed with `key`.
fn hex_hmac<M: Mac + KeyInit>(key: &str, payload: &str) -> String {
    let mut mac =
        <M as KeyInit>::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use s3cli_config::ProviderTable;

    use super::*;
    use crate::request::Verb;

    const SWIFT: &str = r#"{"bucket_name": "b", "host": "h",
        "swift_auth_account": "acct", "swift_temp_url_key": "key"}"#;

    fn signer(json: &str) -> SwiftSigner {
        let config = ResolvedConfig::from_slice(json.as_bytes(), &ProviderTable::new()).unwrap();
        SwiftSigner::new(&config)
    }

    fn at(seconds: i64) -> Timestamp {
        Timestamp::from_second(seconds).unwrap()
    }

    fn query_param<'a>(url: &'a str, name: &str) -> &'a str {
        let (_, query) = url.split_once('?').unwrap();
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
            .unwrap()
    }

    #[test]
    fn url_shape() {
        let request = SignRequest::new("obj", Verb::Get, Duration::from_secs(100));
        let url = signer(SWIFT).sign_at(&request, at(1_700_000_000)).unwrap();

        assert!(url.starts_with("https://h/v1/acct/b/obj?temp_url_sig="));
        assert_eq!(query_param(&url, "temp_url_expires"), "1700000100");

        let signature = query_param(&url, "temp_url_sig");
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn signature_matches_hmac_sha256() {
        let request = SignRequest::new("obj", Verb::Get, Duration::from_secs(100));
        let url = signer(SWIFT).sign_at(&request, at(1_700_000_000)).unwrap();

        let expected = hex_hmac::<Hmac<Sha256>>("key", "GET\n1700000100\n/v1/acct/b/obj");
        assert_eq!(query_param(&url, "temp_url_sig"), expected);
    }

    #[test]
    fn same_second_is_deterministic() {
        let signer = signer(SWIFT);
        let request = SignRequest::new("obj", Verb::Get, Duration::from_secs(100));
        let first = signer.sign_at(&request, at(1_700_000_000)).unwrap();
        let second = signer.sign_at(&request, at(1_700_000_000)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn subsecond_clock_is_truncated() {
        let signer = signer(SWIFT);
        let request = SignRequest::new("obj", Verb::Get, Duration::from_secs(100));
        let now = Timestamp::new(1_700_000_000, 999_999_999).unwrap();
        let url = signer.sign_at(&request, now).unwrap();
        assert_eq!(query_param(&url, "temp_url_expires"), "1700000100");
    }

    #[test]
    fn put_changes_only_the_signature() {
        let signer = signer(SWIFT);
        let get = SignRequest::new("obj", Verb::Get, Duration::from_secs(100));
        let put = SignRequest::new("obj", Verb::Put, Duration::from_secs(100));

        let get_url = signer.sign_at(&get, at(1_700_000_000)).unwrap();
        let put_url = signer.sign_at(&put, at(1_700_000_000)).unwrap();

        assert_ne!(
            query_param(&get_url, "temp_url_sig"),
            query_param(&put_url, "temp_url_sig")
        );
        assert_eq!(
            get_url.split_once('?').unwrap().0,
            put_url.split_once('?').unwrap().0
        );
        assert_eq!(
            query_param(&get_url, "temp_url_expires"),
            query_param(&put_url, "temp_url_expires")
        );
    }

    #[test]
    fn ceph_uses_sha1_and_prefix() {
        let signer = signer(
            r#"{"bucket_name": "b", "host": "h", "swift_auth_account": "acct",
                "swift_temp_url_key": "key", "openstack_blobstore_type": "ceph"}"#,
        );
        let request = SignRequest::new("obj", Verb::Put, Duration::from_secs(60));
        let url = signer.sign_at(&request, at(0)).unwrap();

        assert!(url.starts_with("https://h/swift/v1/acct/b/obj?temp_url_sig="));
        let expected = hex_hmac::<Hmac<Sha1>>("key", "PUT\n60\n/v1/acct/b/obj");
        assert_eq!(query_param(&url, "temp_url_sig"), expected);
        assert_eq!(expected.len(), 40);
    }

    #[test]
    fn requires_host_to_sign() {
        let signer = signer(
            r#"{"bucket_name": "b", "swift_auth_account": "acct", "swift_temp_url_key": "key"}"#,
        );
        let request = SignRequest::new("obj", Verb::Get, Duration::from_secs(100));
        let err = signer.sign_at(&request, at(0)).unwrap_err();
        assert!(matches!(err, SignError::MissingHost));
    }

    #[test]
    fn requires_temp_url_key_to_sign() {
        let signer = signer(r#"{"bucket_name": "b", "host": "h", "swift_auth_account": "acct"}"#);
        let request = SignRequest::new("obj", Verb::Get, Duration::from_secs(100));
        let err = signer.sign_at(&request, at(0)).unwrap_err();
        assert!(matches!(err, SignError::MissingTempUrlKey));
    }

    #[test]
    fn debug_hides_key() {
        let debug = format!("{:?}", signer(SWIFT));
        assert!(debug.contains("acct"));
        assert!(!debug.contains("\"key\""));
    }
}
