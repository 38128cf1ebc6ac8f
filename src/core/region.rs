//! Cluster region to stream processing region mapping
//!
//! Atlas clusters report regions in the cluster vocabulary (`US_EAST_1`, `EUROPE_WEST`),
//! while stream processing instances take their own region names (`VIRGINIA_USA`,
//! `eastus`). The mapping is a static table per provider; unknown regions fall back to
//! the provider default and unknown providers (including `TENANT`) are treated as AWS.

pub const DEFAULT_PROVIDER: &str = "AWS";
pub const DEFAULT_AWS_REGION: &str = "VIRGINIA_USA";
pub const DEFAULT_AZURE_REGION: &str = "eastus";
pub const DEFAULT_GCP_REGION: &str = "US_CENTRAL1";

const AWS_REGIONS: &[(&str, &str)] = &[
    ("US_EAST_1", "VIRGINIA_USA"),
    ("US_EAST_2", "OHIO_USA"),
    ("US_WEST_2", "OREGON_USA"),
    ("CA_CENTRAL_1", "MONTREAL_CAN"),
    ("SA_EAST_1", "SAOPAULO_BRA"),
    ("EU_WEST_1", "DUBLIN_IRL"),
    ("EU_WEST_2", "LONDON_GBR"),
    ("EU_CENTRAL_1", "FRANKFURT_DEU"),
    ("AP_SOUTH_1", "MUMBAI_IND"),
    ("AP_SOUTHEAST_1", "SINGAPORE_SGP"),
    ("AP_SOUTHEAST_2", "SYDNEY_AUS"),
    ("AP_NORTHEAST_1", "TOKYO_JPN"),
    ("AP_NORTHEAST_2", "SEOUL_KOR"),
];

const AZURE_REGIONS: &[(&str, &str)] = &[
    ("US_EAST", "eastus"),
    ("US_EAST_2", "eastus2"),
    ("US_WEST", "westus"),
    ("US_WEST_3", "westus3"),
    ("US_CENTRAL", "centralus"),
    ("CANADA_CENTRAL", "canadacentral"),
    ("EUROPE_NORTH", "northeurope"),
    ("EUROPE_WEST", "westeurope"),
    ("UK_SOUTH", "uksouth"),
    ("INDIA_CENTRAL", "centralindia"),
    ("ASIA_EAST", "eastasia"),
    ("AUSTRALIA_EAST", "australiaeast"),
];

const GCP_REGIONS: &[(&str, &str)] = &[
    ("CENTRAL_US", "US_CENTRAL1"),
    ("EASTERN_US", "US_EAST1"),
    ("US_EAST_4", "US_EAST4"),
    ("WESTERN_US", "US_WEST1"),
    ("WESTERN_EUROPE", "EUROPE_WEST1"),
    ("EUROPE_WEST_2", "EUROPE_WEST2"),
    ("EUROPE_WEST_3", "EUROPE_WEST3"),
    ("ASIA_SOUTH_1", "ASIA_SOUTH1"),
    ("NORTHEASTERN_ASIA_PACIFIC", "ASIA_NORTHEAST1"),
    ("SOUTHEASTERN_ASIA_PACIFIC", "ASIA_SOUTHEAST1"),
];

/// Map a cluster's `(provider, region)` to the stream processing `(provider, region)`
pub fn map_region(provider: Option<&str>, region: Option<&str>) -> (&'static str, &'static str) {
    let provider = provider.map(|p| p.trim().to_ascii_uppercase());
    let (provider, table, default) = match provider.as_deref() {
        Some("AZURE") => ("AZURE", AZURE_REGIONS, DEFAULT_AZURE_REGION),
        Some("GCP") => ("GCP", GCP_REGIONS, DEFAULT_GCP_REGION),
        _ => (DEFAULT_PROVIDER, AWS_REGIONS, DEFAULT_AWS_REGION),
    };

    let region = region.map(|r| r.trim().to_ascii_uppercase());
    let mapped = region
        .as_deref()
        .and_then(|r| table.iter().find(|(cluster, _)| *cluster == r))
        .map(|(_, stream)| *stream)
        .unwrap_or(default);

    (provider, mapped)
}
