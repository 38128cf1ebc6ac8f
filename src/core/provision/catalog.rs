//! Declarative catalogue of the demo's Atlas resources
//!
//! The order-fulfillment flow is:
//!
//! ```text
//! incoming_shopping_cart_events (capped) ─┐
//! Kafka topic (optional) ─────────────────┴─> shoppingcart ─> orders ─> $https validate
//!     ─> fulfilled_orders | invalid_orders ─> $https ship ─> shipped_orders | delayed_orders
//! every stage ─> orderhistorydb.order_history
//! ```

use crate::adapters::order_service::NGROK_SKIP_WARNING_HEADER;
use crate::config::variables::{
    ATLAS_CLUSTER_NAME, CLOUD_PROVIDER, CLOUD_REGION, KAFKA_BOOTSTRAP_SERVERS, KAFKA_PASSWORD,
    KAFKA_SHOPPING_CART_TOPIC, KAFKA_USERNAME, ORDER_SERVICE_URL, STREAM_PROCESSOR_INSTANCE_NAME,
};
use crate::config::{secret_from, EnvStore, SecretString};
use crate::core::region::{DEFAULT_AWS_REGION, DEFAULT_PROVIDER};
use crate::domain::{
    CollectionSpec, ConnectionKind, ConnectionSpec, ProcessorSpec, Result, StreamInstanceSpec,
};
use serde_json::{json, Value};

pub const SHOPPING_CART_DB: &str = "shoppingcartdb";
pub const ORDER_DB: &str = "orderdb";
pub const SHIPMENT_DB: &str = "shipmentdb";
pub const ORDER_HISTORY_DB: &str = "orderhistorydb";
pub const DLQ_DB: &str = "dlqDb";

pub const SHOPPING_CART_COLLECTION: &str = "shoppingcart";
pub const CART_EVENTS_COLLECTION: &str = "incoming_shopping_cart_events";
pub const CART_EVENTS_CAPPED_SIZE: u64 = 1_000_000;

/// Cluster connection used for every MongoDB source, sink and DLQ
pub const CLUSTER_CONNECTION: &str = "mongoDBSink";
/// HTTPS connection to the order service
pub const ORDER_SERVICE_CONNECTION: &str = "orderService";
pub const KAFKA_CONNECTION: &str = "shoppingCartKafkaEventSource";

pub const KAFKA_PROCESSOR: &str = "shoppingCartEventsFromKafkaStreamProcessor";
pub const DEFAULT_KAFKA_TOPIC: &str = "shopping-cart-events";

/// Kafka source settings, present once the tunnel exposed a broker
#[derive(Debug, Clone)]
pub struct KafkaSource {
    pub bootstrap_servers: String,
    pub username: String,
    pub password: SecretString,
    pub topic: String,
}

impl KafkaSource {
    /// `None` while `KAFKA_BOOTSTRAP_SERVERS` is unset
    pub fn from_store(store: &EnvStore) -> Result<Option<Self>> {
        let Some(bootstrap_servers) = store.value(KAFKA_BOOTSTRAP_SERVERS) else {
            return Ok(None);
        };
        Ok(Some(Self {
            bootstrap_servers: bootstrap_servers.to_string(),
            username: store.require(KAFKA_USERNAME)?.to_string(),
            password: secret_from(store.require(KAFKA_PASSWORD)?),
            topic: store
                .value(KAFKA_SHOPPING_CART_TOPIC)
                .unwrap_or(DEFAULT_KAFKA_TOPIC)
                .to_string(),
        }))
    }
}

/// Databases and collections, in creation order
pub fn collections() -> Vec<CollectionSpec> {
    vec![
        CollectionSpec::new(SHOPPING_CART_DB, SHOPPING_CART_COLLECTION),
        CollectionSpec::new(ORDER_DB, "orders"),
        CollectionSpec::new(ORDER_DB, "fulfilled_orders"),
        CollectionSpec::new(ORDER_DB, "invalid_orders"),
        CollectionSpec::new(SHIPMENT_DB, "delayed_orders"),
        CollectionSpec::new(SHIPMENT_DB, "shipped_orders"),
        CollectionSpec::new(SHOPPING_CART_DB, CART_EVENTS_COLLECTION)
            .capped(CART_EVENTS_CAPPED_SIZE),
    ]
}

/// The stream processing instance, placed next to the cluster
pub fn stream_instance(store: &EnvStore, tier: &str) -> Result<StreamInstanceSpec> {
    Ok(StreamInstanceSpec {
        name: store.require(STREAM_PROCESSOR_INSTANCE_NAME)?.to_string(),
        cloud_provider: store
            .value(CLOUD_PROVIDER)
            .unwrap_or(DEFAULT_PROVIDER)
            .to_string(),
        region: store
            .value(CLOUD_REGION)
            .unwrap_or(DEFAULT_AWS_REGION)
            .to_string(),
        tier: tier.to_string(),
    })
}

/// Connections referenced by the processors
pub fn connections(store: &EnvStore, kafka: Option<&KafkaSource>) -> Result<Vec<ConnectionSpec>> {
    let mut specs = vec![
        ConnectionSpec {
            name: CLUSTER_CONNECTION.to_string(),
            kind: ConnectionKind::Cluster {
                cluster_name: store.require(ATLAS_CLUSTER_NAME)?.to_string(),
                role: "atlasAdmin".to_string(),
            },
        },
        ConnectionSpec {
            name: ORDER_SERVICE_CONNECTION.to_string(),
            kind: ConnectionKind::Https {
                url: store.require(ORDER_SERVICE_URL)?.to_string(),
                headers: vec![
                    ("Content-Type".to_string(), "application/json".to_string()),
                    (NGROK_SKIP_WARNING_HEADER.to_string(), "true".to_string()),
                ],
            },
        },
    ];

    if let Some(kafka) = kafka {
        specs.push(ConnectionSpec {
            name: KAFKA_CONNECTION.to_string(),
            kind: ConnectionKind::Kafka {
                bootstrap_servers: kafka.bootstrap_servers.clone(),
                username: kafka.username.clone(),
                password: kafka.password.clone(),
            },
        });
    }

    Ok(specs)
}

fn source(db: &str, coll: &str) -> Value {
    json!({
        "$source": {
            "connectionName": CLUSTER_CONNECTION,
            "db": db,
            "coll": coll,
            "config": { "fullDocument": "whenAvailable" },
        }
    })
}

fn inserts() -> Value {
    json!({ "$match": { "operationType": "insert" } })
}

fn dlq() -> Option<Value> {
    Some(json!({
        "dlq": {
            "connectionName": CLUSTER_CONNECTION,
            "db": DLQ_DB,
            "coll": "dlqColl",
        }
    }))
}

fn merge_into_history() -> Value {
    json!({
        "$merge": {
            "into": {
                "connectionName": CLUSTER_CONNECTION,
                "db": ORDER_HISTORY_DB,
                "coll": "order_history",
            },
            "on": "_id",
        }
    })
}

fn upsert_into(db: &str, coll: &str) -> Value {
    json!({
        "$merge": {
            "into": { "connectionName": CLUSTER_CONNECTION, "db": db, "coll": coll },
            "whenMatched": "replace",
            "whenNotMatched": "insert",
        }
    })
}

fn route(db: &str) -> Value {
    json!({
        "$merge": {
            "into": {
                "connectionName": CLUSTER_CONNECTION,
                "db": db,
                "coll": "$destination_collection",
            }
        }
    })
}

fn destination(status: &str, matched: &str, otherwise: &str) -> Value {
    json!({
        "$addFields": {
            "destination_collection": {
                "$cond": {
                    "if": { "$eq": ["$status", status] },
                    "then": matched,
                    "else": otherwise,
                }
            }
        }
    })
}

fn call_order_service(path: &str) -> Value {
    json!({
        "$https": {
            "connectionName": ORDER_SERVICE_CONNECTION,
            "path": path,
            "method": "POST",
            "as": "message",
        }
    })
}

fn processor(name: &str, pipeline: Vec<Value>, options: Option<Value>) -> ProcessorSpec {
    ProcessorSpec {
        name: name.to_string(),
        pipeline,
        options,
    }
}

/// The stream processors of the fulfillment flow, in creation order
pub fn processors() -> Vec<ProcessorSpec> {
    vec![
        processor(
            "shoppingCartToOrderStreamProcessor",
            vec![
                source(SHOPPING_CART_DB, SHOPPING_CART_COLLECTION),
                json!({ "$match": {
                    "operationType": "replace",
                    "fullDocument.status": "create_order",
                }}),
                json!({ "$project": {
                    "_id": "$fullDocument.order_id",
                    "cart_id": "$fullDocument._id",
                    "order_id": "$fullDocument.order_id",
                    "status": "order_created",
                    "items": "$fullDocument.items",
                }}),
                upsert_into(ORDER_DB, "orders"),
            ],
            None,
        ),
        processor(
            "orderValidationStreamProcessor",
            vec![
                source(ORDER_DB, "orders"),
                json!({ "$match": {
                    "operationType": "insert",
                    "fullDocument.status": "order_created",
                }}),
                call_order_service("/processOrder"),
                json!({ "$project": {
                    "_id": "$message.message.order_id",
                    "order_id": "$message.message.order_id",
                    "cart_id": "$message.message.cart_id",
                    "status": "$message.message.status",
                    "items": "$message.message.items",
                }}),
                destination("order_fulfilled", "fulfilled_orders", "invalid_orders"),
                route(ORDER_DB),
            ],
            dlq(),
        ),
        processor(
            "orderToShipmentStreamProcessor",
            vec![
                source(ORDER_DB, "fulfilled_orders"),
                inserts(),
                call_order_service("/shipOrder"),
                json!({ "$project": {
                    "_id": "$message.message.shipment_id",
                    "order_id": "$message.message.order_id",
                    "status": "$message.message.status",
                    "items": "$message.message.items",
                }}),
                destination("order_shipped", "shipped_orders", "delayed_orders"),
                route(SHIPMENT_DB),
            ],
            dlq(),
        ),
        processor(
            "shoppingCartToOrderTrackingStreamProcessor",
            vec![
                json!({ "$source": {
                    "connectionName": CLUSTER_CONNECTION,
                    "db": SHOPPING_CART_DB,
                    "config": { "fullDocument": "whenAvailable" },
                }}),
                json!({ "$match": {
                    "operationType": "replace",
                    "fullDocument.status": "create_order",
                }}),
                json!({ "$project": {
                    "_id": "$fullDocument.order_id",
                    "cart_id": "$fullDocument._id",
                    "order_id": "$fullDocument.order_id",
                    "status": "order_created",
                    "items": "$fullDocument.items",
                    "customer_id": "$fullDocument.customer_id",
                }}),
                json!({ "$addFields": {
                    "create_order_status_event": { "status": "$status", "cart_id": "$cart_id" },
                }}),
                json!({ "$unset": ["order_id", "status", "cart_id", "items"] }),
                upsert_into(ORDER_HISTORY_DB, "order_history"),
            ],
            None,
        ),
        processor(
            "fulfilledOrderToOrderTrackingStreamProcessor",
            vec![
                source(ORDER_DB, "fulfilled_orders"),
                inserts(),
                json!({ "$project": {
                    "_id": "$fullDocument._id",
                    "cart_id": "$fullDocument.cart_id",
                    "items": "$fullDocument.items",
                    "source_collection": "$fullDocument.destination_collection",
                }}),
                json!({ "$addFields": {
                    "create_fulfilled_order_status_event": {
                        "status": "order_fulfilled",
                        "cart_id": "$cart_id",
                    },
                }}),
                merge_into_history(),
            ],
            None,
        ),
        processor(
            "invalidOrderToOrderTrackingStreamProcessor",
            vec![
                source(ORDER_DB, "invalid_orders"),
                inserts(),
                json!({ "$project": {
                    "_id": "$fullDocument._id",
                    "cart_id": "$fullDocument.cart_id",
                    "items": "$fullDocument.items",
                    "source_collection": "$fullDocument.destination_collection",
                }}),
                json!({ "$addFields": {
                    "create_invalid_order_status_event": {
                        "status": "order_invalid",
                        "cart_id": "$cart_id",
                    },
                }}),
                merge_into_history(),
            ],
            None,
        ),
        processor(
            "shippedOrderToOrderTrackingStreamProcessor",
            vec![
                source(SHIPMENT_DB, "shipped_orders"),
                inserts(),
                json!({ "$project": {
                    "_id": "$fullDocument.order_id",
                    "items": "$fullDocument.items",
                    "shipment_id": "$fullDocument._id",
                    "source_collection": "$fullDocument.destination_collection",
                }}),
                json!({ "$addFields": {
                    "create_shipped_order_status_event": {
                        "status": "order_shipped",
                        "shipment_id": "$shipment_id",
                    },
                }}),
                merge_into_history(),
            ],
            None,
        ),
        processor(
            "delayedShipmentToOrderTrackingStreamProcessor",
            vec![
                source(SHIPMENT_DB, "delayed_orders"),
                inserts(),
                json!({ "$project": {
                    "_id": "$fullDocument.order_id",
                    "items": "$fullDocument.items",
                    "delayed_shipment_id": "$fullDocument._id",
                    "source_collection": "$fullDocument.destination_collection",
                }}),
                json!({ "$addFields": {
                    "create_delayed_shipped_order_status_event": {
                        "status": "order_shipment_delayed",
                        "delayed_shipment_id": "$delayed_shipment_id",
                    },
                }}),
                merge_into_history(),
            ],
            dlq(),
        ),
        processor(
            "shoppingCartEventsCappedCollectionToShoppingCartStreamProcessor",
            vec![
                source(SHOPPING_CART_DB, CART_EVENTS_COLLECTION),
                inserts(),
                json!({ "$project": {
                    "_id": "$fullDocument.cart_data._id",
                    "cart_id": "$fullDocument.cart_data._id",
                    "status": "$fullDocument.cart_data.status",
                    "items": "$fullDocument.cart_data.items",
                    "customer_id": "$fullDocument.cart_data.customer_id",
                    "timestamp": "$fullDocument.timestamp",
                    "order_id": "$fullDocument.cart_data.order_id",
                }}),
                upsert_into(SHOPPING_CART_DB, SHOPPING_CART_COLLECTION),
            ],
            None,
        ),
    ]
}

/// Processor that feeds the shopping cart collection from the Kafka topic
pub fn kafka_processor(topic: &str) -> ProcessorSpec {
    processor(
        KAFKA_PROCESSOR,
        vec![
            json!({ "$source": { "connectionName": KAFKA_CONNECTION, "topic": topic } }),
            json!({ "$project": {
                "_id": "$_id",
                "cart_id": "$_id",
                "status": "$status",
                "items": "$items",
                "customer_id": "$customer_id",
                "timestamp": "$timestamp",
                "order_id": "$order_id",
            }}),
            upsert_into(SHOPPING_CART_DB, SHOPPING_CART_COLLECTION),
        ],
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_exactly_one_capped_collection() {
        let capped: Vec<_> = collections()
            .into_iter()
            .filter(|c| c.capped_size_bytes.is_some())
            .collect();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].collection, CART_EVENTS_COLLECTION);
        assert_eq!(capped[0].capped_size_bytes, Some(1_000_000));
    }

    #[test]
    fn test_processor_names_are_unique() {
        let mut names: HashSet<String> = HashSet::new();
        for spec in processors().into_iter().chain([kafka_processor(DEFAULT_KAFKA_TOPIC)]) {
            assert!(names.insert(spec.name.clone()), "duplicate {}", spec.name);
        }
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn test_processors_only_reference_catalogued_connections() {
        let known: HashSet<&str> =
            [CLUSTER_CONNECTION, ORDER_SERVICE_CONNECTION].into_iter().collect();
        for spec in processors() {
            for name in spec.referenced_connections() {
                assert!(known.contains(name.as_str()), "{} uses {name}", spec.name);
            }
        }
        let kafka = kafka_processor("t").referenced_connections();
        assert!(kafka.contains(&KAFKA_CONNECTION.to_string()));
    }

    #[test]
    fn test_kafka_processor_uses_topic() {
        let spec = kafka_processor("carts");
        assert_eq!(spec.pipeline[0]["$source"]["topic"], "carts");
    }
}
