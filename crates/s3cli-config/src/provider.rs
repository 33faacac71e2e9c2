//! Endpoint classification.
//!
//! A host string is matched against an ordered [`ProviderTable`]; the first
//! rule whose pattern matches decides the [`Provider`] and may extract a
//! region from the hostname. Hosts that match no rule are [`Provider::Generic`].

use regex::{Captures, Regex};
use strum::{AsRefStr, Display, IntoStaticStr};

use crate::TRACING_TARGET_CLASSIFY;

/// Region used when neither the document nor the host names one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Legacy AWS hostname token that does not name a real region.
const AWS_LEGACY_REGION_TOKEN: &str = "external-1";

/// Providers whose S3-compatible API lacks the multipart upload calls.
const MULTIPART_DENYLIST: &[Provider] = &[Provider::Google];

const AWS_PATTERN: &str = r"(?i)^(?:https?://)?(?:[^/]*\.)?s3(?:[-.](?P<region>[^/]*?))?\.amazonaws\.com(?:\.cn)?(?::\d+)?/?$";
const ALICLOUD_PATTERN: &str = r"(?i)^(?:https?://)?oss-(?P<region>[a-z]+-[a-z]+(?:-[1-9])?)(?:-internal)?\.aliyuncs\.com(?::\d+)?/?$";
const GOOGLE_PATTERN: &str = r"(?i)^(?:https?://)?storage\.googleapis\.com(?::\d+)?/?$";

/// Object storage provider behind an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Provider {
    /// Amazon S3, including the China partition.
    Aws,
    /// Alibaba Cloud Object Storage Service.
    Alicloud,
    /// Google Cloud Storage interoperability endpoint.
    Google,
    /// OpenStack Swift or Ceph reached through temporary URLs.
    OpenStackSwift,
    /// Any other S3-compatible endpoint.
    #[default]
    Generic,
}

impl Provider {
    /// Returns whether the provider implements multipart uploads.
    pub fn supports_multipart(self) -> bool {
        !MULTIPART_DENYLIST.contains(&self)
    }

    /// Returns whether the provider expects the bucket as a sub-domain.
    pub fn prefers_virtual_host(self) -> bool {
        matches!(self, Self::Aws | Self::Google)
    }
}

/// Outcome of classifying a host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    /// Provider the host belongs to.
    pub provider: Provider,
    /// Region inferred from the hostname, if the provider encodes one.
    pub region: Option<String>,
}

type RegionExtractor = fn(&Captures<'_>) -> Option<String>;

/// A single classification rule.
#[derive(Debug)]
struct ProviderRule {
    provider: Provider,
    pattern: Regex,
    region: RegionExtractor,
}

/// Ordered, precompiled classification rules.
///
/// Build it once at startup and hand it to every resolution; it holds no
/// mutable state.
#[derive(Debug)]
pub struct ProviderTable {
    rules: Vec<ProviderRule>,
}

impl ProviderTable {
    /// Compiles the built-in rules in priority order: AWS, Alibaba Cloud, Google.
    pub fn new() -> Self {
        let rules = vec![
            ProviderRule {
                provider: Provider::Aws,
                pattern: compile(AWS_PATTERN),
                region: aws_region,
            },
            ProviderRule {
                provider: Provider::Alicloud,
                pattern: compile(ALICLOUD_PATTERN),
                region: captured_region,
            },
            ProviderRule {
                provider: Provider::Google,
                pattern: compile(GOOGLE_PATTERN),
                region: no_region,
            },
        ];

        Self { rules }
    }

    /// Classifies `host`, falling back to [`Provider::Generic`] with no region.
    pub fn classify(&self, host: &str) -> Classification {
        if host.is_empty() {
            return Classification::default();
        }

        let classification = self
            .rules
            .iter()
            .find_map(|rule| {
                rule.pattern.captures(host).map(|captures| Classification {
                    provider: rule.provider,
                    region: (rule.region)(&captures),
                })
            })
            .unwrap_or_default();

        tracing::debug!(
            target: TRACING_TARGET_CLASSIFY,
            host,
            provider = %classification.provider,
            region = ?classification.region,
            "classified endpoint host"
        );

        classification
    }

    /// Returns the region encoded in an AWS hostname.
    ///
    /// Any host that does not carry a usable region token, including non-AWS
    /// hosts, yields [`DEFAULT_REGION`].
    pub fn aws_region(&self, host: &str) -> String {
        self.rule(Provider::Aws)
            .and_then(|rule| rule.pattern.captures(host))
            .and_then(|captures| aws_region(&captures))
            .unwrap_or_else(|| DEFAULT_REGION.to_owned())
    }

    /// Returns the region encoded in an Alibaba Cloud OSS hostname, if any.
    pub fn alicloud_region(&self, host: &str) -> Option<String> {
        self.rule(Provider::Alicloud)
            .and_then(|rule| rule.pattern.captures(host))
            .and_then(|captures| captured_region(&captures))
    }

    fn rule(&self, provider: Provider) -> Option<&ProviderRule> {
        self.rules.iter().find(|rule| rule.provider == provider)
    }
}

impl Default for ProviderTable {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in provider pattern is valid")
}

fn no_region(_: &Captures<'_>) -> Option<String> {
    None
}

fn captured_region(captures: &Captures<'_>) -> Option<String> {
    captures
        .name("region")
        .map(|m| m.as_str())
        .filter(|region| !region.is_empty())
        .map(str::to_owned)
}

fn aws_region(captures: &Captures<'_>) -> Option<String> {
    let region = captured_region(captures)
        .filter(|region| region != AWS_LEGACY_REGION_TOKEN)
        .unwrap_or_else(|| DEFAULT_REGION.to_owned());
    Some(region)
}
