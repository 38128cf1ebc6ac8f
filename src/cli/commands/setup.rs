//! Provisioning commands
//!
//! Each command builds its resource specs from the catalogue and hands them to the
//! reconciler. `setup-all` applies the whole list in one run.

use super::{CommandContext, EXIT_FAILURE, EXIT_SUCCESS};
use crate::adapters::atlas::ControlPlane;
use crate::adapters::mongo::MongoAdmin;
use crate::config::variables::STREAM_PROCESSOR_INSTANCE_NAME;
use crate::core::provision::catalog::{self, KafkaSource, KAFKA_PROCESSOR};
use crate::core::provision::{ProvisioningReport, Reconciler};
use crate::domain::{ProvisioningResult, ResourceSpec, Result};

fn collection_specs() -> Vec<ResourceSpec> {
    catalog::collections()
        .into_iter()
        .map(ResourceSpec::Collection)
        .collect()
}

fn connection_specs(ctx: &CommandContext) -> Result<Vec<ResourceSpec>> {
    let kafka = KafkaSource::from_store(&ctx.store)?;
    Ok(catalog::connections(&ctx.store, kafka.as_ref())?
        .into_iter()
        .map(ResourceSpec::Connection)
        .collect())
}

fn processor_specs(ctx: &CommandContext) -> Result<Vec<ResourceSpec>> {
    let mut processors = catalog::processors();
    if let Some(kafka) = KafkaSource::from_store(&ctx.store)? {
        processors.push(catalog::kafka_processor(&kafka.topic));
    }
    Ok(processors.into_iter().map(ResourceSpec::Processor).collect())
}

fn instance_name(ctx: &CommandContext) -> Result<String> {
    Ok(ctx.store.require(STREAM_PROCESSOR_INSTANCE_NAME)?.to_string())
}

/// Print one line per entry and return the exit code for the report
pub fn print_report(report: &ProvisioningReport) -> i32 {
    for entry in report.entries() {
        match &entry.result {
            ProvisioningResult::Failed(reason) => {
                println!("❌ {} '{}' failed", entry.kind, entry.name);
                println!("   {reason}");
            }
            ProvisioningResult::AlreadyExists | ProvisioningResult::AlreadyStarted => {
                println!("ℹ️  {} '{}' {}", entry.kind, entry.name, entry.result);
            }
            result => println!("✅ {} '{}' {}", entry.kind, entry.name, result),
        }
    }

    if report.is_successful() {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    }
}

async fn apply_stream_specs(ctx: &CommandContext, specs: &[ResourceSpec]) -> Result<i32> {
    let client = ctx.atlas_client()?;
    let report = Reconciler::new()
        .with_control_plane(&client, instance_name(ctx)?)
        .with_shutdown(ctx.shutdown.clone())
        .apply_all(specs)
        .await?;
    Ok(print_report(&report))
}

pub async fn setup_database(ctx: &mut CommandContext) -> Result<i32> {
    println!("📝 Setting up databases and collections...");
    let mongo = MongoAdmin::from_store(&ctx.store).await?;
    let report = Reconciler::new()
        .with_collections(&mongo)
        .with_shutdown(ctx.shutdown.clone())
        .apply_all(&collection_specs())
        .await?;
    Ok(print_report(&report))
}

pub async fn create_stream_instance(ctx: &mut CommandContext) -> Result<i32> {
    println!("📝 Creating stream processor instance...");
    let spec = catalog::stream_instance(&ctx.store, &ctx.settings.atlas.stream_tier)?;
    apply_stream_specs(ctx, &[ResourceSpec::StreamInstance(spec)]).await
}

pub async fn setup_connections(ctx: &mut CommandContext) -> Result<i32> {
    println!("📝 Setting up stream processor connections...");
    let specs = connection_specs(ctx)?;
    apply_stream_specs(ctx, &specs).await
}

pub async fn setup_processors(ctx: &mut CommandContext) -> Result<i32> {
    println!("📝 Setting up stream processors...");
    let specs = processor_specs(ctx)?;
    apply_stream_specs(ctx, &specs).await
}

/// Collections, stream instance, connections and processors in one ordered run
pub async fn setup_all(ctx: &mut CommandContext) -> Result<i32> {
    println!("📝 Running all setup steps...");

    let mut specs = collection_specs();
    specs.push(ResourceSpec::StreamInstance(catalog::stream_instance(
        &ctx.store,
        &ctx.settings.atlas.stream_tier,
    )?));
    specs.extend(connection_specs(ctx)?);
    specs.extend(processor_specs(ctx)?);

    let mongo = MongoAdmin::from_store(&ctx.store).await?;
    let client = ctx.atlas_client()?;
    let report = Reconciler::new()
        .with_collections(&mongo)
        .with_control_plane(&client, instance_name(ctx)?)
        .with_shutdown(ctx.shutdown.clone())
        .apply_all(&specs)
        .await?;

    let code = print_report(&report);
    if code == EXIT_SUCCESS {
        println!("\n✅ Setup complete! Start the stream processors with:");
        println!("   orderflow start-stream-processors");
        println!("Then run the shopping cart simulator with:");
        println!("   orderflow simulate-shopping");
    }
    Ok(code)
}

pub async fn start_processors(ctx: &mut CommandContext, include_kafka: bool) -> Result<i32> {
    println!("📝 Starting stream processors...");
    let mut names: Vec<String> = catalog::processors().into_iter().map(|p| p.name).collect();
    if include_kafka {
        names.push(KAFKA_PROCESSOR.to_string());
    }

    let client = ctx.atlas_client()?;
    let report = Reconciler::new()
        .with_control_plane(&client, instance_name(ctx)?)
        .with_shutdown(ctx.shutdown.clone())
        .start_processors(&names)
        .await?;
    Ok(print_report(&report))
}

pub async fn list_clusters(ctx: &mut CommandContext) -> Result<i32> {
    let client = ctx.atlas_client()?;
    let clusters = client.list_clusters().await?;
    if clusters.is_empty() {
        println!("No clusters found in the project.");
        return Ok(EXIT_SUCCESS);
    }

    println!("Available clusters:");
    for (idx, cluster) in clusters.iter().enumerate() {
        println!("  {}. {}", idx + 1, cluster.label());
    }
    Ok(EXIT_SUCCESS)
}
