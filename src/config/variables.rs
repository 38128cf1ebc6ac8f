//! Catalogue of the environment variables the demo relies on
//!
//! Every variable the driver reads or writes in the env file is listed here together
//! with the hint shown when prompting for it. Variables with `requires_prompt = false`
//! are derived (cluster info, tunnel URLs) or have sensible defaults.

/// One env-file variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable {
    pub name: &'static str,
    pub hint: &'static str,
    /// Prompt the operator when the value is blank
    pub requires_prompt: bool,
    /// Read without echo and hold as a secret
    pub secret: bool,
    /// Only relevant for commands that use the Kafka source
    pub kafka_only: bool,
}

impl Variable {
    const fn new(name: &'static str, hint: &'static str) -> Self {
        Self {
            name,
            hint,
            requires_prompt: false,
            secret: false,
            kafka_only: false,
        }
    }

    const fn prompted(mut self) -> Self {
        self.requires_prompt = true;
        self
    }

    const fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    const fn kafka(mut self) -> Self {
        self.kafka_only = true;
        self
    }
}

pub const MONGO_USER: &str = "MONGO_USER";
pub const MONGO_PASS: &str = "MONGO_PASS";
pub const ATLAS_PROJECT_ID: &str = "ATLAS_PROJECT_ID";
pub const ATLAS_CLUSTER_NAME: &str = "ATLAS_CLUSTER_NAME";
pub const MONGO_URL: &str = "MONGO_URL";
pub const CLOUD_PROVIDER: &str = "CLOUD_PROVIDER";
pub const CLOUD_REGION: &str = "CLOUD_REGION";
pub const ATLAS_API_PUBLIC_KEY: &str = "ATLAS_API_PUBLIC_KEY";
pub const ATLAS_API_PRIVATE_KEY: &str = "ATLAS_API_PRIVATE_KEY";
pub const STREAM_PROCESSOR_INSTANCE_NAME: &str = "STREAM_PROCESSOR_INSTANCE_NAME";
pub const ORDER_SERVICE_URL: &str = "ORDER_SERVICE_URL";
pub const KAFKA_BOOTSTRAP_SERVERS: &str = "KAFKA_BOOTSTRAP_SERVERS";
pub const KAFKA_USERNAME: &str = "KAFKA_USERNAME";
pub const KAFKA_PASSWORD: &str = "KAFKA_PASSWORD";
pub const KAFKA_SHOPPING_CART_TOPIC: &str = "KAFKA_SHOPPING_CART_TOPIC";
pub const NGROK_AUTHTOKEN: &str = "NGROK_AUTHTOKEN";

/// Variables that must be resolved before the cluster can be looked up
pub const CREDENTIAL_VARIABLES: &[&str] =
    &[ATLAS_API_PUBLIC_KEY, ATLAS_API_PRIVATE_KEY, ATLAS_PROJECT_ID];

/// The full catalogue, in prompt order
pub const VARIABLES: &[Variable] = &[
    Variable::new(ATLAS_API_PUBLIC_KEY, "Atlas API public key (Project Owner role)").prompted(),
    Variable::new(ATLAS_API_PRIVATE_KEY, "Atlas API private key").prompted().secret(),
    Variable::new(ATLAS_PROJECT_ID, "Atlas project ID (see Atlas dashboard)").prompted(),
    Variable::new(ATLAS_CLUSTER_NAME, "Atlas cluster name"),
    Variable::new(MONGO_URL, "Derived from the cluster connection string"),
    Variable::new(CLOUD_PROVIDER, "Derived from the cluster provider"),
    Variable::new(CLOUD_REGION, "Derived from the cluster region"),
    Variable::new(
        MONGO_USER,
        "MongoDB Atlas database user (e.g. order_fulfillment_user)",
    )
    .prompted(),
    Variable::new(
        MONGO_PASS,
        "MongoDB Atlas database password (e.g. strongpassword123)",
    )
    .prompted()
    .secret(),
    Variable::new(
        STREAM_PROCESSOR_INSTANCE_NAME,
        "Unique name for stream processor instance",
    )
    .prompted(),
    Variable::new(ORDER_SERVICE_URL, "Public URL of the order service (set by start-ngrok)"),
    Variable::new(
        KAFKA_BOOTSTRAP_SERVERS,
        "Kafka bootstrap servers (set by start-ngrok)",
    ),
    Variable::new(KAFKA_USERNAME, "Kafka SASL/PLAIN username (e.g. admin)")
        .prompted()
        .kafka(),
    Variable::new(KAFKA_PASSWORD, "Kafka SASL/PLAIN password")
        .prompted()
        .secret()
        .kafka(),
    Variable::new(KAFKA_SHOPPING_CART_TOPIC, "Kafka topic for shopping cart events"),
    Variable::new(NGROK_AUTHTOKEN, "ngrok auth token (set by setup-ngrok)").secret(),
];

/// Look up a variable by name
pub fn lookup(name: &str) -> Option<&'static Variable> {
    VARIABLES.iter().find(|v| v.name == name)
}

/// Variables the prompter fills, credentials excluded
pub fn prompted_variables(include_kafka: bool) -> impl Iterator<Item = &'static Variable> {
    VARIABLES.iter().filter(move |v| {
        v.requires_prompt
            && !CREDENTIAL_VARIABLES.contains(&v.name)
            && (include_kafka || !v.kafka_only)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_are_catalogued_and_prompted() {
        for name in CREDENTIAL_VARIABLES {
            let var = lookup(name).unwrap();
            assert!(var.requires_prompt, "{name} should be prompted");
        }
    }

    #[test]
    fn test_derived_variables_are_not_prompted() {
        for name in [ATLAS_CLUSTER_NAME, MONGO_URL, ORDER_SERVICE_URL, KAFKA_BOOTSTRAP_SERVERS] {
            assert!(!lookup(name).unwrap().requires_prompt);
        }
    }

    #[test]
    fn test_kafka_variables_only_with_kafka() {
        let without: Vec<_> = prompted_variables(false).map(|v| v.name).collect();
        let with: Vec<_> = prompted_variables(true).map(|v| v.name).collect();
        assert!(!without.contains(&KAFKA_USERNAME));
        assert!(with.contains(&KAFKA_USERNAME));
        assert!(with.contains(&KAFKA_PASSWORD));
        assert!(!with.contains(&ATLAS_PROJECT_ID));
    }

    #[test]
    fn test_passwords_are_secret() {
        for name in [MONGO_PASS, ATLAS_API_PRIVATE_KEY, KAFKA_PASSWORD] {
            assert!(lookup(name).unwrap().secret);
        }
    }
}
