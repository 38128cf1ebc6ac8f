//! Integration tests for the interactive configuration flow
//!
//! A scripted prompter answers the questions and a fake control plane answers for Atlas.
//! These tests verify that:
//! - Blank answers are rejected and asked again
//! - A new cluster can be created or an existing one picked
//! - A rejected API key falls back to typing the cluster name
//! - Derived cluster settings land in the env file

use async_trait::async_trait;
use orderflow::adapters::atlas::{ApiResult, ControlPlane};
use orderflow::config::variables::{
    ATLAS_API_PRIVATE_KEY, ATLAS_API_PUBLIC_KEY, ATLAS_CLUSTER_NAME, ATLAS_PROJECT_ID,
    CLOUD_PROVIDER, CLOUD_REGION, KAFKA_PASSWORD, KAFKA_USERNAME, MONGO_PASS, MONGO_URL,
    MONGO_USER, STREAM_PROCESSOR_INSTANCE_NAME,
};
use orderflow::config::EnvStore;
use orderflow::core::configure::{Configurator, Prompter};
use orderflow::domain::{
    AtlasApiError, ClusterDescriptor, ClusterTier, ConnectionSpec, OrderflowError, ProcessorSpec,
    Result, StreamInstanceSpec,
};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const FULL_ENV: &str = "\
ATLAS_API_PUBLIC_KEY=\"pub\"
ATLAS_API_PRIVATE_KEY=\"priv\"
ATLAS_PROJECT_ID=\"proj\"
MONGO_USER=\"demo\"
MONGO_PASS=\"secret\"
STREAM_PROCESSOR_INSTANCE_NAME=\"inst\"
";

#[derive(Debug, Clone)]
enum Answer {
    Text(&'static str),
    Choice(usize),
    Yes,
    No,
}

/// Answers prompts from a script and records every question
struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            asked: Mutex::new(Vec::new()),
        }
    }

    fn next(&self, prompt: &str) -> Result<Answer> {
        self.asked.lock().unwrap().push(prompt.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| OrderflowError::Prompt(format!("unexpected prompt: {prompt}")))
    }

    fn remaining(&self) -> usize {
        self.answers.lock().unwrap().len()
    }

    fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&self, prompt: &str) -> Result<String> {
        match self.next(prompt)? {
            Answer::Text(text) => Ok(text.to_string()),
            other => Err(OrderflowError::Prompt(format!("expected text, got {other:?}"))),
        }
    }

    fn password(&self, prompt: &str) -> Result<String> {
        self.input(prompt)
    }

    fn select(&self, prompt: &str, _items: &[String]) -> Result<usize> {
        match self.next(prompt)? {
            Answer::Choice(index) => Ok(index),
            other => Err(OrderflowError::Prompt(format!("expected choice, got {other:?}"))),
        }
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        match self.next(prompt)? {
            Answer::Yes => Ok(true),
            Answer::No => Ok(false),
            other => Err(OrderflowError::Prompt(format!("expected yes/no, got {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listing {
    Clusters,
    Empty,
    Unauthorized,
}

/// Control plane with two clusters in the project
struct FakeAtlas {
    listing: Listing,
    created: Arc<Mutex<Vec<String>>>,
}

impl FakeAtlas {
    fn new(listing: Listing) -> Self {
        Self {
            listing,
            created: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn descriptor(name: &str) -> ClusterDescriptor {
        ClusterDescriptor {
            name: name.to_string(),
            provider: Some("AWS".to_string()),
            region: Some("EU_WEST_1".to_string()),
            connection_string: Some(format!(
                "mongodb+srv://{}.abcde.mongodb.net",
                name.to_lowercase()
            )),
            tier: ClusterTier::Flex,
        }
    }
}

#[async_trait]
impl ControlPlane for FakeAtlas {
    async fn create_cluster(&self, name: &str) -> Result<()> {
        self.created.lock().unwrap().push(name.to_string());
        Ok(())
    }

    async fn cluster_connection_info(&self, name: &str) -> Result<ClusterDescriptor> {
        Ok(Self::descriptor(name))
    }

    async fn list_clusters(&self) -> Result<Vec<ClusterDescriptor>> {
        match self.listing {
            Listing::Clusters => Ok(vec![Self::descriptor("Alpha"), Self::descriptor("Beta")]),
            Listing::Empty => Ok(Vec::new()),
            Listing::Unauthorized => Err(AtlasApiError::Unauthorized {
                status: 401,
                body: "{}".to_string(),
            }
            .into()),
        }
    }

    async fn create_stream_instance(&self, _spec: &StreamInstanceSpec) -> ApiResult<()> {
        Ok(())
    }

    async fn create_connection(&self, _instance: &str, _spec: &ConnectionSpec) -> ApiResult<()> {
        Ok(())
    }

    async fn create_processor(&self, _instance: &str, _spec: &ProcessorSpec) -> ApiResult<()> {
        Ok(())
    }

    async fn start_processor(&self, _instance: &str, _name: &str) -> ApiResult<()> {
        Ok(())
    }
}

fn env_file(dir: &TempDir, contents: &str) -> EnvStore {
    let path = dir.path().join(".env");
    std::fs::write(&path, contents).unwrap();
    EnvStore::load(&path).unwrap()
}

async fn configure(
    prompter: &ScriptedPrompter,
    store: &mut EnvStore,
    atlas: FakeAtlas,
    include_kafka: bool,
) -> Result<()> {
    Configurator::new(prompter, "OrderFulfillmentDemoCluster")
        .configure(store, include_kafka, move |_| {
            Ok(Box::new(atlas) as Box<dyn ControlPlane>)
        })
        .await
}

fn reload(path: &Path) -> EnvStore {
    EnvStore::load(path).unwrap()
}

#[tokio::test]
async fn test_blank_answers_are_asked_again() {
    let dir = TempDir::new().unwrap();
    let mut store = env_file(&dir, &FULL_ENV.replace("MONGO_USER=\"demo\"\n", ""));
    store.set(ATLAS_CLUSTER_NAME, "Alpha").unwrap();

    let prompter = ScriptedPrompter::new(vec![
        Answer::Text("   "),
        Answer::Text(""),
        Answer::Text(" demo "),
    ]);
    configure(&prompter, &mut store, FakeAtlas::new(Listing::Clusters), false)
        .await
        .unwrap();

    assert_eq!(prompter.asked().len(), 3);
    assert_eq!(reload(store.path()).value(MONGO_USER), Some("demo"));
}

#[tokio::test]
async fn test_credentials_are_prompted_and_saved() {
    let dir = TempDir::new().unwrap();
    let contents = FULL_ENV
        .lines()
        .filter(|line| !line.starts_with("ATLAS_"))
        .collect::<Vec<_>>()
        .join("\n");
    let mut store = env_file(&dir, &format!("ATLAS_CLUSTER_NAME=\"Alpha\"\n{contents}\n"));

    let prompter = ScriptedPrompter::new(vec![
        Answer::Text("my-public"),
        Answer::Text("my-private"),
        Answer::Text("my-project"),
    ]);
    configure(&prompter, &mut store, FakeAtlas::new(Listing::Clusters), false)
        .await
        .unwrap();

    let saved = reload(store.path());
    assert_eq!(saved.value(ATLAS_API_PUBLIC_KEY), Some("my-public"));
    assert_eq!(saved.value(ATLAS_API_PRIVATE_KEY), Some("my-private"));
    assert_eq!(saved.value(ATLAS_PROJECT_ID), Some("my-project"));
    assert_eq!(prompter.remaining(), 0);
}

#[tokio::test]
async fn test_create_new_cluster() {
    let dir = TempDir::new().unwrap();
    let mut store = env_file(&dir, FULL_ENV);
    let atlas = FakeAtlas::new(Listing::Clusters);
    let created = atlas.created.clone();

    let prompter = ScriptedPrompter::new(vec![Answer::Yes]);
    configure(&prompter, &mut store, atlas, false).await.unwrap();

    assert_eq!(
        *created.lock().unwrap(),
        vec!["OrderFulfillmentDemoCluster".to_string()]
    );
    assert_eq!(
        reload(store.path()).value(ATLAS_CLUSTER_NAME),
        Some("OrderFulfillmentDemoCluster")
    );
}

#[tokio::test]
async fn test_select_existing_cluster_writes_derived_settings() {
    let dir = TempDir::new().unwrap();
    let mut store = env_file(&dir, FULL_ENV);

    let prompter = ScriptedPrompter::new(vec![Answer::No, Answer::Choice(1)]);
    configure(&prompter, &mut store, FakeAtlas::new(Listing::Clusters), false)
        .await
        .unwrap();

    let saved = reload(store.path());
    assert_eq!(saved.value(ATLAS_CLUSTER_NAME), Some("Beta"));
    assert_eq!(
        saved.value(MONGO_URL),
        Some("@beta.abcde.mongodb.net/?retryWrites=true&w=majority&appName=Beta")
    );
    assert_eq!(saved.value(CLOUD_PROVIDER), Some("AWS"));
    assert_eq!(saved.value(CLOUD_REGION), Some("DUBLIN_IRL"));
}

#[tokio::test]
async fn test_unauthorized_listing_falls_back_to_manual_name() {
    let dir = TempDir::new().unwrap();
    let mut store = env_file(&dir, FULL_ENV);

    let prompter = ScriptedPrompter::new(vec![Answer::No, Answer::Text("Manual")]);
    configure(&prompter, &mut store, FakeAtlas::new(Listing::Unauthorized), false)
        .await
        .unwrap();

    assert_eq!(reload(store.path()).value(ATLAS_CLUSTER_NAME), Some("Manual"));
}

#[tokio::test]
async fn test_empty_project_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let mut store = env_file(&dir, FULL_ENV);

    let prompter = ScriptedPrompter::new(vec![Answer::No]);
    let err = configure(&prompter, &mut store, FakeAtlas::new(Listing::Empty), false)
        .await
        .unwrap_err();

    assert!(matches!(err, OrderflowError::Configuration(_)));
    assert!(!reload(store.path()).is_set(ATLAS_CLUSTER_NAME));
}

#[tokio::test]
async fn test_kafka_credentials_only_when_requested() {
    let dir = TempDir::new().unwrap();
    let mut store = env_file(&dir, FULL_ENV);
    store.set(ATLAS_CLUSTER_NAME, "Alpha").unwrap();

    let prompter = ScriptedPrompter::new(Vec::new());
    configure(&prompter, &mut store, FakeAtlas::new(Listing::Clusters), false)
        .await
        .unwrap();
    assert!(!store.is_set(KAFKA_USERNAME));

    let prompter = ScriptedPrompter::new(vec![Answer::Text("admin"), Answer::Text("kafka-pw")]);
    configure(&prompter, &mut store, FakeAtlas::new(Listing::Clusters), true)
        .await
        .unwrap();
    let saved = reload(store.path());
    assert_eq!(saved.value(KAFKA_USERNAME), Some("admin"));
    assert_eq!(saved.value(KAFKA_PASSWORD), Some("kafka-pw"));
    assert_eq!(saved.value(STREAM_PROCESSOR_INSTANCE_NAME), Some("inst"));
    assert_eq!(saved.value(MONGO_PASS), Some("secret"));
}
