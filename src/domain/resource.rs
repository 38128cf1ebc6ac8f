//! Provisionable resources and provisioning outcomes

use crate::config::SecretString;
use secrecy::ExposeSecret;
use serde_json::{json, Map, Value};
use std::fmt;

/// Kind of a provisionable resource, ordered by dependency rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Collection,
    StreamInstance,
    Connection,
    Processor,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceKind::Collection => "collection",
            ResourceKind::StreamInstance => "stream instance",
            ResourceKind::Connection => "connection",
            ResourceKind::Processor => "stream processor",
        };
        f.write_str(label)
    }
}

/// A collection inside a database, optionally capped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSpec {
    pub database: String,
    pub collection: String,
    /// Byte size for capped collections
    pub capped_size_bytes: Option<u64>,
}

impl CollectionSpec {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
            capped_size_bytes: None,
        }
    }

    pub fn capped(mut self, size_bytes: u64) -> Self {
        self.capped_size_bytes = Some(size_bytes);
        self
    }

    /// `database.collection`
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.collection)
    }
}

/// Stream Processing instance definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInstanceSpec {
    pub name: String,
    pub cloud_provider: String,
    pub region: String,
    pub tier: String,
}

impl StreamInstanceSpec {
    /// Request body for `POST /groups/{project}/streams`
    pub fn to_payload(&self) -> Value {
        json!({
            "dataProcessRegion": {
                "cloudProvider": self.cloud_provider,
                "region": self.region,
            },
            "name": self.name,
            "sampleConnections": { "solar": false },
            "streamConfig": { "tier": self.tier },
        })
    }
}

/// Connection target of a stream processing connection
#[derive(Debug, Clone)]
pub enum ConnectionKind {
    /// An Atlas cluster in the same project
    Cluster { cluster_name: String, role: String },
    /// An HTTPS endpoint called from `$https` stages
    Https {
        url: String,
        headers: Vec<(String, String)>,
    },
    /// A Kafka broker authenticated with SASL/PLAIN
    Kafka {
        bootstrap_servers: String,
        username: String,
        password: SecretString,
    },
}

/// Named stream processing connection
#[derive(Debug, Clone)]
pub struct ConnectionSpec {
    pub name: String,
    pub kind: ConnectionKind,
}

impl ConnectionSpec {
    /// Request body for `POST .../streams/{instance}/connections`
    pub fn to_payload(&self) -> Value {
        match &self.kind {
            ConnectionKind::Cluster { cluster_name, role } => json!({
                "name": self.name,
                "type": "Cluster",
                "clusterName": cluster_name,
                "dbRoleToExecute": { "role": role, "type": "BUILT_IN" },
            }),
            ConnectionKind::Https { url, headers } => {
                let headers: Map<String, Value> = headers
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect();
                json!({
                    "name": self.name,
                    "type": "Https",
                    "url": url,
                    "headers": headers,
                })
            }
            ConnectionKind::Kafka {
                bootstrap_servers,
                username,
                password,
            } => json!({
                "name": self.name,
                "type": "Kafka",
                "bootstrapServers": bootstrap_servers,
                "authentication": {
                    "mechanism": "PLAIN",
                    "username": username,
                    "password": password.expose_secret(),
                },
                "security": { "protocol": "SASL_PLAINTEXT" },
            }),
        }
    }
}

/// Named stream processor with its aggregation pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorSpec {
    pub name: String,
    pub pipeline: Vec<Value>,
    pub options: Option<Value>,
}

impl ProcessorSpec {
    /// Request body for `POST .../streams/{instance}/processor`
    pub fn to_payload(&self) -> Value {
        let mut payload = json!({
            "name": self.name,
            "pipeline": self.pipeline,
        });
        if let (Some(options), Some(map)) = (&self.options, payload.as_object_mut()) {
            map.insert("options".to_string(), options.clone());
        }
        payload
    }

    /// Connection names referenced by `connectionName` anywhere in the pipeline or options
    pub fn referenced_connections(&self) -> Vec<String> {
        let mut names = Vec::new();
        for stage in &self.pipeline {
            collect_connection_names(stage, &mut names);
        }
        if let Some(options) = &self.options {
            collect_connection_names(options, &mut names);
        }
        names.sort();
        names.dedup();
        names
    }
}

fn collect_connection_names(value: &Value, names: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                if key == "connectionName" {
                    if let Value::String(name) = nested {
                        names.push(name.clone());
                    }
                } else {
                    collect_connection_names(nested, names);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_connection_names(item, names);
            }
        }
        _ => {}
    }
}

/// One provisionable unit
#[derive(Debug, Clone)]
pub enum ResourceSpec {
    Collection(CollectionSpec),
    StreamInstance(StreamInstanceSpec),
    Connection(ConnectionSpec),
    Processor(ProcessorSpec),
}

impl ResourceSpec {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceSpec::Collection(_) => ResourceKind::Collection,
            ResourceSpec::StreamInstance(_) => ResourceKind::StreamInstance,
            ResourceSpec::Connection(_) => ResourceKind::Connection,
            ResourceSpec::Processor(_) => ResourceKind::Processor,
        }
    }

    /// Display name used in reports
    pub fn name(&self) -> String {
        match self {
            ResourceSpec::Collection(spec) => spec.namespace(),
            ResourceSpec::StreamInstance(spec) => spec.name.clone(),
            ResourceSpec::Connection(spec) => spec.name.clone(),
            ResourceSpec::Processor(spec) => spec.name.clone(),
        }
    }
}

/// Outcome of applying one resource (or starting one processor)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningResult {
    Created,
    AlreadyExists,
    Started,
    AlreadyStarted,
    /// Fatal; carries the raw remote payload
    Failed(String),
}

impl ProvisioningResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, ProvisioningResult::Failed(_))
    }
}

impl fmt::Display for ProvisioningResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisioningResult::Created => f.write_str("created"),
            ProvisioningResult::AlreadyExists => f.write_str("already exists"),
            ProvisioningResult::Started => f.write_str("started"),
            ProvisioningResult::AlreadyStarted => f.write_str("already running"),
            ProvisioningResult::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecretValue;
    use secrecy::Secret;

    #[test]
    fn test_kind_ordering_follows_dependencies() {
        assert!(ResourceKind::Collection < ResourceKind::StreamInstance);
        assert!(ResourceKind::StreamInstance < ResourceKind::Connection);
        assert!(ResourceKind::Connection < ResourceKind::Processor);
    }

    #[test]
    fn test_stream_instance_payload() {
        let spec = StreamInstanceSpec {
            name: "orders".to_string(),
            cloud_provider: "AWS".to_string(),
            region: "VIRGINIA_USA".to_string(),
            tier: "SP10".to_string(),
        };
        let payload = spec.to_payload();
        assert_eq!(payload["dataProcessRegion"]["region"], "VIRGINIA_USA");
        assert_eq!(payload["streamConfig"]["tier"], "SP10");
        assert_eq!(payload["sampleConnections"]["solar"], false);
    }

    #[test]
    fn test_kafka_connection_payload_exposes_password_only_in_body() {
        let spec = ConnectionSpec {
            name: "kafka".to_string(),
            kind: ConnectionKind::Kafka {
                bootstrap_servers: "0.tcp.ngrok.io:1234".to_string(),
                username: "admin".to_string(),
                password: Secret::new(SecretValue::from("s3cret".to_string())),
            },
        };
        let payload = spec.to_payload();
        assert_eq!(payload["authentication"]["password"], "s3cret");
        assert_eq!(payload["security"]["protocol"], "SASL_PLAINTEXT");
        assert!(!format!("{spec:?}").contains("s3cret"));
    }

    #[test]
    fn test_processor_payload_includes_options_only_when_present() {
        let mut spec = ProcessorSpec {
            name: "p".to_string(),
            pipeline: vec![json!({"$match": {}})],
            options: None,
        };
        assert!(spec.to_payload().get("options").is_none());

        spec.options = Some(json!({"dlq": {"connectionName": "sink"}}));
        assert_eq!(spec.to_payload()["options"]["dlq"]["connectionName"], "sink");
    }

    #[test]
    fn test_referenced_connections_walks_nested_stages() {
        let spec = ProcessorSpec {
            name: "p".to_string(),
            pipeline: vec![
                json!({"$source": {"connectionName": "a"}}),
                json!({"$merge": {"into": {"connectionName": "b"}}}),
                json!({"$https": {"connectionName": "a"}}),
            ],
            options: Some(json!({"dlq": {"connectionName": "c"}})),
        };
        assert_eq!(spec.referenced_connections(), vec!["a", "b", "c"]);
    }
}
