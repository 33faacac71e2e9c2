//! Header handling around request signing.
//!
//! Some S3-compatible backends verify signatures over `Accept-Encoding` even
//! though HTTP clients add or rewrite it after signing. Such requests must be
//! signed without the header and sent with it.
//!
//! Neither path in this crate needs it at runtime. URLs produced by
//! [`AwsSigner`](crate::AwsSigner) sign only the `host` header, and the
//! requests `object_store` sends for transfers are signed before its HTTP
//! client adds `Accept-Encoding`. This module serves callers that sign full
//! header maps themselves.

use http::HeaderMap;
use http::header::{ACCEPT_ENCODING, HeaderName, HeaderValue};

/// Every value of one header, removed from a [`HeaderMap`].
#[derive(Debug, Clone)]
#[must_use = "detached values are lost unless reattached"]
pub struct DetachedHeader {
    name: HeaderName,
    values: Vec<HeaderValue>,
}

impl DetachedHeader {
    /// Removes every value of `name` from `headers`.
    pub fn detach(headers: &mut HeaderMap, name: HeaderName) -> Self {
        let values = headers.get_all(&name).iter().cloned().collect();
        headers.remove(&name);
        Self { name, values }
    }

    /// Returns the detached values in their original order.
    pub fn values(&self) -> &[HeaderValue] {
        &self.values
    }

    /// Appends the detached values back onto `headers`.
    pub fn reattach(self, headers: &mut HeaderMap) {
        for value in self.values {
            headers.append(self.name.clone(), value);
        }
    }
}

/// Runs `sign` with every `Accept-Encoding` value removed from `headers`,
/// then restores those values.
pub fn sign_excluding_accept_encoding<T>(
    headers: &mut HeaderMap,
    sign: impl FnOnce(&mut HeaderMap) -> T,
) -> T {
    let detached = DetachedHeader::detach(headers, ACCEPT_ENCODING);
    let output = sign(headers);
    detached.reattach(headers);
    output
}

#[cfg(test)]
mod tests {
    use http::header::{AUTHORIZATION, HOST};

    use super::*;

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.append(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(HOST, HeaderValue::from_static("bucket.example.com"));
        headers.append(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
        headers
    }

    #[test]
    fn header_is_absent_while_signing() {
        let mut headers = headers();
        let seen = sign_excluding_accept_encoding(&mut headers, |headers| {
            headers.insert(AUTHORIZATION, HeaderValue::from_static("AWS4-HMAC-SHA256 ..."));
            headers.keys().cloned().collect::<Vec<_>>()
        });

        assert!(!seen.contains(&ACCEPT_ENCODING));
        assert!(seen.contains(&HOST));
    }

    #[test]
    fn header_values_are_restored_in_order() {
        let mut headers = headers();
        sign_excluding_accept_encoding(&mut headers, |_| ());

        let values: Vec<_> = headers.get_all(ACCEPT_ENCODING).iter().collect();
        assert_eq!(values, ["gzip", "identity"]);
        assert_eq!(headers[HOST], "bucket.example.com");
    }

    #[test]
    fn signing_output_is_kept() {
        let mut headers = headers();
        sign_excluding_accept_encoding(&mut headers, |headers| {
            headers.insert(AUTHORIZATION, HeaderValue::from_static("signature"));
        });
        assert_eq!(headers[AUTHORIZATION], "signature");
        assert_eq!(headers.get_all(ACCEPT_ENCODING).iter().count(), 2);
    }

    #[test]
    fn missing_header_is_a_no_op() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("example.com"));

        let detached = DetachedHeader::detach(&mut headers, ACCEPT_ENCODING);
        assert!(detached.values().is_empty());
        detached.reattach(&mut headers);

        assert!(!headers.contains_key(ACCEPT_ENCODING));
        assert_eq!(headers.len(), 1);
    }
}
