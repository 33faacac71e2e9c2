//! Signer selection.

use s3cli_config::ResolvedConfig;

use crate::TRACING_TARGET_SIGN;
use crate::aws::AwsSigner;
use crate::error::SignResult;
use crate::request::SignRequest;
use crate::swift::SwiftSigner;

/// The URL signer backing a resolved configuration.
///
/// Chosen once by [`UrlSigner::select`]; consumers only call
/// [`UrlSigner::sign`].
#[derive(Debug)]
pub enum UrlSigner {
    /// Delegated AWS-style query signing.
    Aws(AwsSigner),
    /// OpenStack Swift or Ceph temporary URLs.
    Swift(SwiftSigner),
}

impl UrlSigner {
    /// Selects the Swift signer when a Swift account is configured, and the
    /// AWS-style signer otherwise.
    ///
    /// Only building the AWS-style store can fail; incomplete Swift settings
    /// are reported by [`UrlSigner::sign`].
    pub fn select(config: &ResolvedConfig) -> SignResult<Self> {
        let signer = if config.swift_auth_account.is_some() {
            Self::Swift(SwiftSigner::new(config))
        } else {
            Self::Aws(AwsSigner::new(config)?)
        };

        tracing::debug!(
            target: TRACING_TARGET_SIGN,
            signer = signer.name(),
            signing_scheme = %config.signing_scheme,
            "url signer selected"
        );

        Ok(signer)
    }

    /// Returns a URL granting `request.verb` on the object until the expiry.
    pub async fn sign(&self, request: &SignRequest) -> SignResult<String> {
        match self {
            Self::Aws(signer) => signer.sign(request).await,
            Self::Swift(signer) => signer.sign(request),
        }
    }

    /// Short name of the selected signer.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Aws(_) => "aws",
            Self::Swift(_) => "swift",
        }
    }
}
