use lazy_static::lazy_static;
use regex::Regex;

use crate::error::EcrError;

const PROXY_ENDPOINT_SCHEME: &str = "https://";

lazy_static! {
    /// Matches ECR registry hostnames, including FIPS endpoints and the
    /// China partition suffix (accepted but not captured).
    static ref ECR_HOST_PATTERN: Regex = Regex::new(
        r"(^[a-zA-Z0-9][a-zA-Z0-9-_]*)\.dkr\.ecr(-fips)?\.([a-zA-Z0-9][a-zA-Z0-9-_]*)\.amazonaws\.com(\.cn)?"
    )
    .expect("invalid ECR host pattern");
}

/// An ECR registry identity extracted from a server URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    /// AWS account ID (e.g., "123456789012")
    pub id: String,
    /// Whether the endpoint is a FIPS endpoint
    pub fips: bool,
    /// AWS region (e.g., "us-east-1")
    pub region: String,
}

/// Extract the ECR registry behind a given server URL
///
/// Accepts the hostname with or without an `https://` prefix. No other
/// scheme is recognized or stripped.
pub fn extract_registry(server_url: &str) -> Result<Registry, EcrError> {
    let host = server_url
        .strip_prefix(PROXY_ENDPOINT_SCHEME)
        .unwrap_or(server_url);

    let captures = ECR_HOST_PATTERN.captures(host).ok_or(EcrError::NotEcrHost)?;

    // Account ID and region are mandatory captures; a match without them is
    // an ECR-looking host that is not a valid repository URI.
    let (id, region) = match (captures.get(1), captures.get(3)) {
        (Some(id), Some(region)) => (id.as_str(), region.as_str()),
        _ => return Err(EcrError::MalformedEcrHost(server_url.to_string())),
    };

    Ok(Registry {
        id: id.to_string(),
        fips: captures.get(2).map(|m| m.as_str()) == Some("-fips"),
        region: region.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_registry_plain_host() {
        let registry = extract_registry("123456789012.dkr.ecr.us-west-2.amazonaws.com").unwrap();
        assert_eq!(registry.id, "123456789012");
        assert_eq!(registry.region, "us-west-2");
        assert!(!registry.fips);
    }

    #[test]
    fn test_extract_registry_https_prefix() {
        let with_scheme =
            extract_registry("https://123456789012.dkr.ecr.us-west-2.amazonaws.com").unwrap();
        let without_scheme =
            extract_registry("123456789012.dkr.ecr.us-west-2.amazonaws.com").unwrap();
        assert_eq!(with_scheme, without_scheme);
    }

    #[test]
    fn test_extract_registry_fips() {
        let registry =
            extract_registry("https://123456789012.dkr.ecr-fips.us-east-1.amazonaws.com").unwrap();
        assert_eq!(registry.id, "123456789012");
        assert!(registry.fips);
        assert_eq!(registry.region, "us-east-1");
    }

    #[test]
    fn test_extract_registry_cn_suffix() {
        let registry =
            extract_registry("123456789012.dkr.ecr.cn-north-1.amazonaws.com.cn").unwrap();
        assert_eq!(registry.id, "123456789012");
        assert_eq!(registry.region, "cn-north-1");
        assert!(!registry.fips);
    }

    #[test]
    fn test_extract_registry_with_repository_path() {
        let registry =
            extract_registry("https://123456789012.dkr.ecr.eu-west-1.amazonaws.com/v2/my-app")
                .unwrap();
        assert_eq!(registry.id, "123456789012");
        assert_eq!(registry.region, "eu-west-1");
    }

    #[test]
    fn test_extract_registry_rejects_non_ecr_host() {
        for url in [
            "registry.hub.docker.com",
            "https://gcr.io/project",
            "example.com",
            "",
        ] {
            assert!(matches!(extract_registry(url), Err(EcrError::NotEcrHost)));
        }
    }

    #[test]
    fn test_extract_registry_rejects_other_schemes() {
        // Only https:// is stripped, so an http:// URL does not match
        assert!(matches!(
            extract_registry("http://123456789012.dkr.ecr.us-west-2.amazonaws.com"),
            Err(EcrError::NotEcrHost)
        ));
    }
}
