//! Idempotent application of resource specs
//!
//! The reconciler applies an ordered list of [`ResourceSpec`]s one at a time. A
//! resource that already exists counts as success; the first other failure stops the
//! run and is recorded with the raw remote payload. Nothing is rolled back.

use super::classify::{
    classify_connection_error, classify_processor_error, classify_processor_start_error,
    classify_stream_instance_error, RemoteOutcome,
};
use crate::adapters::atlas::ControlPlane;
use crate::adapters::mongo::CollectionAdmin;
use crate::core::shutdown::is_shutdown_requested;
use crate::domain::{
    AtlasApiError, CollectionSpec, OrderflowError, ProvisioningResult, ResourceKind,
    ResourceSpec, Result,
};
use crate::log_provisioning_outcome;
use tokio::sync::watch;

/// One line of a provisioning report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub kind: ResourceKind,
    pub name: String,
    pub result: ProvisioningResult,
}

/// Outcomes of a provisioning run, in application order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisioningReport {
    entries: Vec<ReportEntry>,
}

impl ProvisioningReport {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, kind: ResourceKind, name: String, result: ProvisioningResult) {
        log_provisioning_outcome!(kind, &name, &result);
        self.entries.push(ReportEntry { kind, name, result });
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// The entry that aborted the run, if any
    pub fn failure(&self) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| !e.result.is_success())
    }

    pub fn is_successful(&self) -> bool {
        self.failure().is_none()
    }

    /// Number of entries with the given result
    pub fn count(&self, result: &ProvisioningResult) -> usize {
        self.entries.iter().filter(|e| &e.result == result).count()
    }

    /// Log a summary line
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.entries.len(),
            created = self.count(&ProvisioningResult::Created),
            already_existing = self.count(&ProvisioningResult::AlreadyExists),
            started = self.count(&ProvisioningResult::Started),
            already_started = self.count(&ProvisioningResult::AlreadyStarted),
            successful = self.is_successful(),
            "Provisioning summary"
        );
    }
}

/// Applies resource specs against the control plane and the cluster
pub struct Reconciler<'a> {
    control_plane: Option<&'a dyn ControlPlane>,
    collections: Option<&'a dyn CollectionAdmin>,
    stream_instance: Option<String>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<'a> Default for Reconciler<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Reconciler<'a> {
    pub fn new() -> Self {
        Self {
            control_plane: None,
            collections: None,
            stream_instance: None,
            shutdown: None,
        }
    }

    /// Control plane for stream processing resources, scoped to one instance
    pub fn with_control_plane(
        mut self,
        control_plane: &'a dyn ControlPlane,
        stream_instance: impl Into<String>,
    ) -> Self {
        self.control_plane = Some(control_plane);
        self.stream_instance = Some(stream_instance.into());
        self
    }

    /// Cluster access for collection resources
    pub fn with_collections(mut self, collections: &'a dyn CollectionAdmin) -> Self {
        self.collections = Some(collections);
        self
    }

    /// Stop between steps once shutdown is requested
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    fn check_interrupted(&self) -> Result<()> {
        match &self.shutdown {
            Some(signal) if is_shutdown_requested(signal) => Err(OrderflowError::Interrupted),
            _ => Ok(()),
        }
    }

    /// Reject lists that are out of dependency order or lack a backend
    fn validate(&self, specs: &[ResourceSpec]) -> Result<()> {
        for pair in specs.windows(2) {
            if pair[1].kind() < pair[0].kind() {
                return Err(OrderflowError::Validation(format!(
                    "{} '{}' must not come after {} '{}'",
                    pair[1].kind(),
                    pair[1].name(),
                    pair[0].kind(),
                    pair[0].name()
                )));
            }
        }

        let needs_cluster = specs.iter().any(|s| s.kind() == ResourceKind::Collection);
        if needs_cluster && self.collections.is_none() {
            return Err(OrderflowError::Validation(
                "collections requested without a MongoDB connection".to_string(),
            ));
        }
        let needs_control_plane = specs.iter().any(|s| s.kind() != ResourceKind::Collection);
        if needs_control_plane && self.control_plane.is_none() {
            return Err(OrderflowError::Validation(
                "stream processing resources requested without an Atlas client".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply every spec in order, stopping at the first fatal failure
    ///
    /// `Err` means nothing or only part of the list was attempted for a reason unrelated
    /// to a remote failure (invalid order, interrupt). Remote failures are recorded in
    /// the report as [`ProvisioningResult::Failed`].
    pub async fn apply_all(&self, specs: &[ResourceSpec]) -> Result<ProvisioningReport> {
        self.validate(specs)?;

        let mut report = ProvisioningReport::new();
        for spec in specs {
            self.check_interrupted()?;
            let result = self.apply(spec).await;
            let failed = !result.is_success();
            report.record(spec.kind(), spec.name(), result);
            if failed {
                break;
            }
        }
        report.log_summary();
        Ok(report)
    }

    /// Apply one spec
    pub async fn apply(&self, spec: &ResourceSpec) -> ProvisioningResult {
        match spec {
            ResourceSpec::Collection(collection) => self.apply_collection(collection).await,
            ResourceSpec::StreamInstance(instance) => {
                let Some(control_plane) = self.control_plane else {
                    return missing_backend("Atlas client");
                };
                outcome(
                    control_plane.create_stream_instance(instance).await,
                    classify_stream_instance_error,
                )
            }
            ResourceSpec::Connection(connection) => {
                let (control_plane, instance) = match self.stream_scope() {
                    Some(scope) => scope,
                    None => return missing_backend("Atlas client"),
                };
                outcome(
                    control_plane.create_connection(instance, connection).await,
                    classify_connection_error,
                )
            }
            ResourceSpec::Processor(processor) => {
                let (control_plane, instance) = match self.stream_scope() {
                    Some(scope) => scope,
                    None => return missing_backend("Atlas client"),
                };
                outcome(
                    control_plane.create_processor(instance, processor).await,
                    classify_processor_error,
                )
            }
        }
    }

    /// Start processors by name; a processor that is already running counts as started
    pub async fn start_processors(&self, names: &[String]) -> Result<ProvisioningReport> {
        let (control_plane, instance) = self.stream_scope().ok_or_else(|| {
            OrderflowError::Validation("starting processors requires an Atlas client".to_string())
        })?;

        let mut report = ProvisioningReport::new();
        for name in names {
            self.check_interrupted()?;
            let result = match control_plane.start_processor(instance, name).await {
                Ok(()) => ProvisioningResult::Started,
                Err(err) => match classify_processor_start_error(&err) {
                    RemoteOutcome::AlreadyStarted => ProvisioningResult::AlreadyStarted,
                    _ => ProvisioningResult::Failed(err.to_string()),
                },
            };
            let failed = !result.is_success();
            report.record(ResourceKind::Processor, name.clone(), result);
            if failed {
                break;
            }
        }
        report.log_summary();
        Ok(report)
    }

    fn stream_scope(&self) -> Option<(&'a dyn ControlPlane, &str)> {
        match (self.control_plane, self.stream_instance.as_deref()) {
            (Some(control_plane), Some(instance)) => Some((control_plane, instance)),
            _ => None,
        }
    }

    async fn apply_collection(&self, spec: &CollectionSpec) -> ProvisioningResult {
        let Some(admin) = self.collections else {
            return missing_backend("MongoDB connection");
        };

        let existing = match admin.collection_names(&spec.database).await {
            Ok(names) => names,
            Err(err) => return ProvisioningResult::Failed(err.to_string()),
        };

        let result = if existing.iter().any(|name| name == &spec.collection) {
            ProvisioningResult::AlreadyExists
        } else {
            if let Err(err) = admin.create_collection(spec).await {
                return ProvisioningResult::Failed(err.to_string());
            }
            ProvisioningResult::Created
        };

        if let Err(err) = admin
            .enable_pre_and_post_images(&spec.database, &spec.collection)
            .await
        {
            return ProvisioningResult::Failed(err.to_string());
        }

        result
    }
}

fn missing_backend(what: &str) -> ProvisioningResult {
    ProvisioningResult::Failed(format!("no {what} configured"))
}

fn outcome(
    response: std::result::Result<(), AtlasApiError>,
    classify: fn(&AtlasApiError) -> RemoteOutcome,
) -> ProvisioningResult {
    match response {
        Ok(()) => ProvisioningResult::Created,
        Err(err) => match classify(&err) {
            RemoteOutcome::AlreadyExists => ProvisioningResult::AlreadyExists,
            _ => ProvisioningResult::Failed(err.to_string()),
        },
    }
}
