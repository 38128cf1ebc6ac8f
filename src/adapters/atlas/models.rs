//! Atlas Admin API response shapes
//!
//! Only the fields the driver reads are modelled; everything else is ignored.

use crate::domain::{ClusterDescriptor, ClusterTier};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct Paginated<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClusterState {
    pub state_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConnectionStrings {
    pub standard_srv: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FlexProviderSettings {
    pub backing_provider_name: Option<String>,
    pub region_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FlexCluster {
    pub name: String,
    #[serde(default)]
    pub provider_settings: FlexProviderSettings,
    #[serde(default)]
    pub connection_strings: ConnectionStrings,
}

impl FlexCluster {
    pub fn into_descriptor(self) -> ClusterDescriptor {
        ClusterDescriptor {
            name: self.name,
            provider: self.provider_settings.backing_provider_name,
            region: self.provider_settings.region_name,
            connection_string: self.connection_strings.standard_srv,
            tier: ClusterTier::Flex,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegionConfig {
    pub provider_name: Option<String>,
    pub backing_provider_name: Option<String>,
    pub region_name: Option<String>,
}

impl RegionConfig {
    /// Tenant (shared) clusters report `TENANT` and carry the real cloud separately
    fn effective_provider(&self) -> Option<String> {
        match self.provider_name.as_deref() {
            Some("TENANT") | None => self
                .backing_provider_name
                .clone()
                .or_else(|| self.provider_name.clone()),
            Some(provider) => Some(provider.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReplicationSpec {
    #[serde(default)]
    pub region_configs: Vec<RegionConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LegacyProviderSettings {
    pub provider_name: Option<String>,
    pub backing_provider_name: Option<String>,
    pub region_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StandardCluster {
    pub name: String,
    #[serde(default)]
    pub replication_specs: Vec<ReplicationSpec>,
    #[serde(default)]
    pub provider_settings: Option<LegacyProviderSettings>,
    #[serde(default)]
    pub connection_strings: ConnectionStrings,
}

impl StandardCluster {
    pub fn into_descriptor(self) -> ClusterDescriptor {
        let first_region = self
            .replication_specs
            .first()
            .and_then(|spec| spec.region_configs.first());

        let (provider, region) = match (first_region, &self.provider_settings) {
            (Some(config), _) => (config.effective_provider(), config.region_name.clone()),
            (None, Some(legacy)) => {
                let provider = match legacy.provider_name.as_deref() {
                    Some("TENANT") => legacy.backing_provider_name.clone(),
                    _ => legacy.provider_name.clone(),
                };
                (provider, legacy.region_name.clone())
            }
            (None, None) => (None, None),
        };

        ClusterDescriptor {
            name: self.name,
            provider,
            region,
            connection_string: self.connection_strings.standard_srv,
            tier: ClusterTier::Standard,
        }
    }
}
