//! Interactive configuration of the env file
//!
//! [`Configurator::configure`] makes sure every variable a command needs has a value
//! before the command runs:
//!
//! 1. Atlas API keys and project ID
//! 2. the cluster: created, picked from the project, or typed in by hand
//! 3. `MONGO_URL`, `CLOUD_PROVIDER` and `CLOUD_REGION`, re-derived from the cluster on
//!    every run
//! 4. the remaining prompted variables (Kafka credentials only when asked for)
//!
//! Every answer is written to the env file as soon as it is known.

pub mod prompter;

pub use prompter::{DialoguerPrompter, Prompter};

use crate::adapters::atlas::ControlPlane;
use crate::config::variables::{
    lookup, prompted_variables, Variable, ATLAS_CLUSTER_NAME, CLOUD_PROVIDER, CLOUD_REGION,
    CREDENTIAL_VARIABLES, MONGO_URL,
};
use crate::config::EnvStore;
use crate::core::region::map_region;
use crate::domain::{derive_mongo_url, ClusterDescriptor, OrderflowError, Result};

const UNAUTHORIZED_GUIDANCE: &str = "\
The Atlas API key was rejected while listing clusters.
Check that the key has the Project Owner (or Project Cluster Manager) role for this
project and that your IP address is on the key's access list.";

/// Fills in missing env-file variables
pub struct Configurator<'a> {
    prompter: &'a dyn Prompter,
    default_cluster_name: String,
}

impl<'a> Configurator<'a> {
    pub fn new(prompter: &'a dyn Prompter, default_cluster_name: impl Into<String>) -> Self {
        Self {
            prompter,
            default_cluster_name: default_cluster_name.into(),
        }
    }

    /// Resolve every variable a command needs
    ///
    /// `connect` builds the Atlas client once the credentials are known.
    pub async fn configure<F>(
        &self,
        store: &mut EnvStore,
        include_kafka: bool,
        connect: F,
    ) -> Result<()>
    where
        F: FnOnce(&EnvStore) -> Result<Box<dyn ControlPlane>>,
    {
        for name in CREDENTIAL_VARIABLES {
            if let Some(variable) = lookup(name) {
                self.ensure_variable(store, variable)?;
            }
        }

        let control_plane = connect(store)?;

        let cluster_name = match store.value(ATLAS_CLUSTER_NAME) {
            Some(name) => name.to_string(),
            None => {
                let name = self.resolve_cluster_name(control_plane.as_ref()).await?;
                store.set(ATLAS_CLUSTER_NAME, &name)?;
                name
            }
        };

        let cluster = control_plane.cluster_connection_info(&cluster_name).await?;
        apply_cluster_info(store, &cluster)?;

        for variable in prompted_variables(include_kafka) {
            self.ensure_variable(store, variable)?;
        }
        Ok(())
    }

    /// Prompt until a non-blank value is entered, then persist it
    pub fn ensure_variable(&self, store: &mut EnvStore, variable: &Variable) -> Result<()> {
        if store.is_set(variable.name) {
            return Ok(());
        }

        println!("\n📝 Missing value for {}", variable.name);
        println!("   Hint: {}", variable.hint);
        let value = self.ask_non_blank(variable.name, variable.secret)?;
        store.set(variable.name, &value)?;
        println!("✅ Saved {} to {}", variable.name, store.path().display());
        Ok(())
    }

    fn ask_non_blank(&self, name: &str, secret: bool) -> Result<String> {
        let prompt = format!("Enter value for {name}");
        loop {
            let raw = if secret {
                self.prompter.password(&prompt)?
            } else {
                self.prompter.input(&prompt)?
            };
            let value = raw.trim();
            if !value.is_empty() {
                return Ok(value.to_string());
            }
            tracing::debug!(variable = %name, "Rejected blank input");
            println!("❌ Empty or whitespace-only value not allowed, please try again.");
        }
    }

    async fn resolve_cluster_name(&self, control_plane: &dyn ControlPlane) -> Result<String> {
        println!("\nNo Atlas cluster name found.");
        let create = self.prompter.confirm(
            "Create a new free-tier cluster with your Atlas API key? (no = pick an existing one)",
        )?;

        if create {
            let name = self.default_cluster_name.clone();
            println!("📝 Creating cluster '{name}', this can take several minutes...");
            control_plane.create_cluster(&name).await?;
            println!("✅ Created cluster: {name}");
            return Ok(name);
        }

        match control_plane.list_clusters().await {
            Ok(clusters) => self.select_cluster(&clusters),
            Err(err) if err.is_unauthorized() => {
                tracing::warn!(error = %err, "Cluster listing unauthorized, asking for the name");
                println!("❌ {UNAUTHORIZED_GUIDANCE}");
                self.ask_non_blank(ATLAS_CLUSTER_NAME, false)
            }
            Err(err) => Err(err),
        }
    }

    fn select_cluster(&self, clusters: &[ClusterDescriptor]) -> Result<String> {
        if clusters.is_empty() {
            return Err(OrderflowError::Configuration(
                "No clusters found in your Atlas project. Create one in the Atlas UI first."
                    .to_string(),
            ));
        }

        let labels: Vec<String> = clusters.iter().map(ClusterDescriptor::label).collect();
        let index = self.prompter.select("Select a cluster", &labels)?;
        clusters
            .get(index)
            .map(|c| c.name.clone())
            .ok_or_else(|| OrderflowError::Prompt(format!("invalid cluster selection {index}")))
    }
}

/// Write `MONGO_URL`, `CLOUD_PROVIDER` and `CLOUD_REGION` for a cluster
pub fn apply_cluster_info(store: &mut EnvStore, cluster: &ClusterDescriptor) -> Result<()> {
    let connection_string = cluster.connection_string.as_deref().ok_or_else(|| {
        OrderflowError::Configuration(format!(
            "Cluster '{}' has no connection string yet; wait until it is ready",
            cluster.name
        ))
    })?;

    let (provider, region) = map_region(cluster.provider.as_deref(), cluster.region.as_deref());
    store.set(MONGO_URL, &derive_mongo_url(connection_string, &cluster.name))?;
    store.set(CLOUD_PROVIDER, provider)?;
    store.set(CLOUD_REGION, region)?;

    tracing::info!(
        cluster = %cluster.name,
        tier = %cluster.tier,
        provider = %provider,
        region = %region,
        "Derived cluster connection settings"
    );
    Ok(())
}
