//! Atlas cluster descriptors

use std::fmt;

/// Deployment tier of an Atlas cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterTier {
    Flex,
    Standard,
}

impl fmt::Display for ClusterTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterTier::Flex => f.write_str("flex"),
            ClusterTier::Standard => f.write_str("standard"),
        }
    }
}

/// Cluster as reported by the Atlas control plane
///
/// Fetched on demand and never cached between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterDescriptor {
    pub name: String,
    pub provider: Option<String>,
    pub region: Option<String>,
    /// `mongodb+srv://` connection string, when the cluster exposes one
    pub connection_string: Option<String>,
    pub tier: ClusterTier,
}

impl ClusterDescriptor {
    /// One-line label used in the cluster selection menu
    pub fn label(&self) -> String {
        format!(
            "{} ({}, {}/{})",
            self.name,
            self.tier,
            self.provider.as_deref().unwrap_or("unknown"),
            self.region.as_deref().unwrap_or("unknown"),
        )
    }
}

/// Build the host portion of `MONGO_URL` from an SRV connection string
///
/// The scheme and any embedded credentials are stripped, the query string is replaced
/// with the write-concern options the demo expects, and the cluster name is appended as
/// `appName`. The result starts with `@` so that `mongodb+srv://user:pass` can be
/// prefixed to it.
pub fn derive_mongo_url(connection_string: &str, cluster_name: &str) -> String {
    let without_scheme = connection_string
        .trim()
        .trim_start_matches("mongodb+srv://")
        .trim_start_matches("mongodb://");
    let host_part = match without_scheme.rfind('@') {
        Some(idx) => &without_scheme[idx..],
        None => without_scheme,
    };
    let host_part = host_part.split('?').next().unwrap_or(host_part);
    let host_part = host_part.trim_end_matches('/');
    let prefix = if host_part.starts_with('@') { "" } else { "@" };
    format!("{prefix}{host_part}/?retryWrites=true&w=majority&appName={cluster_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_mongo_url_from_plain_srv() {
        let url = derive_mongo_url("mongodb+srv://demo.abcde.mongodb.net", "Demo");
        assert_eq!(
            url,
            "@demo.abcde.mongodb.net/?retryWrites=true&w=majority&appName=Demo"
        );
    }

    #[test]
    fn test_derive_mongo_url_strips_credentials_and_query() {
        let url = derive_mongo_url(
            "mongodb+srv://user:pw@demo.abcde.mongodb.net/?retryWrites=false",
            "Demo",
        );
        assert_eq!(
            url,
            "@demo.abcde.mongodb.net/?retryWrites=true&w=majority&appName=Demo"
        );
    }

    #[test]
    fn test_label_falls_back_to_unknown() {
        let cluster = ClusterDescriptor {
            name: "c".to_string(),
            provider: None,
            region: Some("US_EAST_1".to_string()),
            connection_string: None,
            tier: ClusterTier::Flex,
        };
        assert_eq!(cluster.label(), "c (flex, unknown/US_EAST_1)");
    }
}
