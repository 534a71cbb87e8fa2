use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};

use azurerm_core::provider::Provider;
use azurerm_core::resource::{Resource, ResourceId, Value};
use azurerm_provider::data_lake_store_file;
use azurerm_provider::resources::find_definition;
use azurerm_provider::{AzureProvider, ProviderConfig};
use azurerm_state::backends::LocalBackend;
use azurerm_state::{
    BackendConfig, ResourceState, StateBackend, StateFile, create_backend, upgrade_state_file,
};

#[derive(Parser)]
#[command(name = "azurerm")]
#[command(about = "Azure resource state management", long_about = None)]
struct Cli {
    /// Azure cloud: public, china, german or usgovernment
    #[arg(long, global = true, env = "ARM_ENVIRONMENT")]
    environment: Option<String>,

    /// Subscription used for Resource Manager lookups
    #[arg(long, global = true, env = "ARM_SUBSCRIPTION_ID")]
    subscription_id: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, global = true, env = "ARM_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Path to the state file
    #[arg(long, global = true, default_value = LocalBackend::DEFAULT_STATE_FILE)]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// State file commands
    State {
        #[command(subcommand)]
        command: StateCommands,
    },
    /// Data Lake Store file commands
    File {
        #[command(subcommand)]
        command: FileCommands,
    },
}

#[derive(Subcommand)]
enum StateCommands {
    /// Upgrade every resource in the state to its current schema version
    Upgrade {
        /// Show the changes without writing the state
        #[arg(long)]
        dry_run: bool,
    },
    /// List the resources in the state
    Show,
    /// Remove a lock left behind by an interrupted command
    ForceUnlock {
        /// ID of the lock to remove
        lock_id: String,
    },
}

#[derive(Subcommand)]
enum FileCommands {
    /// Upload a local file to a Data Lake Store account
    Create {
        /// Name of the resource in the state
        name: String,

        /// Data Lake Store account name
        #[arg(long)]
        account: String,

        /// Absolute path inside the store (e.g., /data/example.txt)
        #[arg(long)]
        remote_path: String,

        /// Local file to upload
        #[arg(long)]
        local_path: PathBuf,
    },
    /// Track a file that already exists in the store
    Import {
        /// Name of the resource in the state
        name: String,

        /// Identifier of the file (e.g., example.azuredatalakestore.net/data/example.txt)
        identifier: String,
    },
    /// Refresh a file from the store
    Read {
        /// Name of the resource in the state
        name: String,
    },
    /// Delete a file from the store
    Delete {
        /// Name of the resource in the state
        name: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let provider = AzureProvider::new(provider_config(&cli)?);
    let backend = create_backend(&BackendConfig::local(cli.state.display().to_string()))
        .map_err(|e| format!("Failed to open state: {}", e))?;

    match cli.command {
        Commands::State { command } => match command {
            StateCommands::Upgrade { dry_run } => {
                run_state_upgrade(&provider, backend.as_ref(), &cli.state, dry_run).await
            }
            StateCommands::Show => run_state_show(backend.as_ref()).await,
            StateCommands::ForceUnlock { lock_id } => {
                run_state_force_unlock(backend.as_ref(), &lock_id).await
            }
        },
        Commands::File { command } => {
            let lock = backend
                .acquire_lock("file")
                .await
                .map_err(|e| format!("Failed to lock state: {}", e))?;

            let result = match command {
                FileCommands::Create {
                    name,
                    account,
                    remote_path,
                    local_path,
                } => {
                    let resource = Resource::new(data_lake_store_file::RESOURCE_TYPE, name)
                        .with_attribute("account_name", Value::String(account))
                        .with_attribute("remote_file_path", Value::String(remote_path))
                        .with_attribute(
                            "local_file_path",
                            Value::String(local_path.display().to_string()),
                        );
                    run_file_create(&provider, backend.as_ref(), &resource).await
                }
                FileCommands::Import { name, identifier } => {
                    run_file_import(&provider, backend.as_ref(), &name, &identifier).await
                }
                FileCommands::Read { name } => {
                    run_file_read(&provider, backend.as_ref(), &name).await
                }
                FileCommands::Delete { name } => {
                    run_file_delete(&provider, backend.as_ref(), &name).await
                }
            };

            if let Err(e) = backend.release_lock(&lock).await {
                log::warn!("Failed to release state lock {}: {}", lock.id, e);
            }
            result
        }
    }
}

fn provider_config(cli: &Cli) -> Result<ProviderConfig, String> {
    let attributes: HashMap<String, Value> = [
        ("environment", &cli.environment),
        ("subscription_id", &cli.subscription_id),
        ("access_token", &cli.access_token),
    ]
    .into_iter()
    .filter_map(|(key, value)| {
        value
            .as_ref()
            .map(|v| (key.to_string(), Value::String(v.clone())))
    })
    .collect();

    ProviderConfig::from_attributes(&attributes).map_err(|e| e.to_string())
}

// =============================================================================
// State commands
// =============================================================================

async fn run_state_upgrade(
    provider: &AzureProvider,
    backend: &dyn StateBackend,
    state_path: &Path,
    dry_run: bool,
) -> Result<(), String> {
    let lock = if dry_run {
        None
    } else {
        Some(
            backend
                .acquire_lock("state upgrade")
                .await
                .map_err(|e| format!("Failed to lock state: {}", e))?,
        )
    };

    let result = upgrade_state(provider, backend, state_path, dry_run).await;

    if let Some(lock) = lock
        && let Err(e) = backend.release_lock(&lock).await
    {
        log::warn!("Failed to release state lock {}: {}", lock.id, e);
    }
    result
}

async fn upgrade_state(
    provider: &AzureProvider,
    backend: &dyn StateBackend,
    state_path: &Path,
    dry_run: bool,
) -> Result<(), String> {
    let Some(mut state) = backend
        .read_state()
        .await
        .map_err(|e| format!("Failed to read state: {}", e))?
    else {
        println!("No state found at {}", state_path.display());
        return Ok(());
    };

    let original = to_pretty_json(&state)?;
    let report = upgrade_state_file(
        &mut state,
        &provider.upgrade_chains(),
        &provider.upgrade_context(),
    )
    .await
    .map_err(|e| e.to_string())?;

    for unknown in &report.unknown {
        println!(
            "{} {} (unknown resource type)",
            "Skipping".yellow(),
            unknown
        );
    }

    if report.is_empty() {
        println!("{}", "State is up-to-date.".green());
        return Ok(());
    }

    println!("{}", "State upgrades:".cyan().bold());
    for upgraded in &report.upgraded {
        println!(
            "  {} {}.{}: version {} -> {}",
            "~".yellow().bold(),
            upgraded.resource_type,
            upgraded.name,
            upgraded.from_version,
            upgraded.to_version
        );
    }

    if dry_run {
        print_diff(state_path, &original, &to_pretty_json(&state)?);
        println!();
        println!("{}", "Dry run: state was not written.".yellow());
        return Ok(());
    }

    state.increment_serial();
    backend
        .write_state(&state)
        .await
        .map_err(|e| format!("Failed to write state: {}", e))?;

    println!();
    println!(
        "{}",
        format!("Upgraded {} resource(s).", report.upgraded.len())
            .green()
            .bold()
    );
    Ok(())
}

async fn run_state_show(backend: &dyn StateBackend) -> Result<(), String> {
    let state = read_state(backend).await?;

    if state.resources.is_empty() {
        println!("{}", "No resources in state.".green());
        return Ok(());
    }

    println!(
        "{} (serial {}, lineage {})",
        "Resources:".cyan().bold(),
        state.serial,
        state.lineage
    );
    for resource in &state.resources {
        let version = match find_definition(&resource.resource_type) {
            Some(def) if def.schema_version > resource.schema_version => format!(
                "v{} {}",
                resource.schema_version,
                format!("(upgrade to v{} pending)", def.schema_version).yellow()
            ),
            Some(_) => format!("v{}", resource.schema_version),
            None => format!("v{} {}", resource.schema_version, "(unknown type)".red()),
        };
        println!(
            "  {}.{} {} {}",
            resource.resource_type,
            resource.name.bold(),
            version,
            resource.id().unwrap_or("-").dimmed()
        );
    }
    Ok(())
}

async fn run_state_force_unlock(
    backend: &dyn StateBackend,
    lock_id: &str,
) -> Result<(), String> {
    backend
        .force_unlock(lock_id)
        .await
        .map_err(|e| format!("Failed to unlock state: {}", e))?;
    println!("{} {}", "Released lock".green().bold(), lock_id);
    Ok(())
}

// =============================================================================
// File commands
// =============================================================================

async fn run_file_create(
    provider: &AzureProvider,
    backend: &dyn StateBackend,
    resource: &Resource,
) -> Result<(), String> {
    let mut state = read_state(backend).await?;
    ensure_untracked(&state, &resource.id)?;

    let created = provider.create(resource).await.map_err(|e| e.to_string())?;
    let identifier = created
        .identifier
        .clone()
        .ok_or_else(|| format!("{} was created without an identifier", resource.id))?;

    state.upsert_resource(file_state(
        provider,
        &resource.id,
        &identifier,
        resource.attributes.iter().chain(&created.attributes),
    ));
    write_state(backend, &mut state).await?;

    println!("{} {} ({})", "Created".green().bold(), resource.id, identifier);
    Ok(())
}

async fn run_file_import(
    provider: &AzureProvider,
    backend: &dyn StateBackend,
    name: &str,
    identifier: &str,
) -> Result<(), String> {
    let id = ResourceId::new(data_lake_store_file::RESOURCE_TYPE, name);
    let mut state = read_state(backend).await?;
    ensure_untracked(&state, &id)?;

    let imported = provider
        .import_resource(&id, identifier)
        .await
        .map_err(|e| e.to_string())?;

    state.upsert_resource(file_state(
        provider,
        &id,
        identifier,
        imported.attributes.iter(),
    ));
    write_state(backend, &mut state).await?;

    println!("{} {} ({})", "Imported".green().bold(), id, identifier);
    Ok(())
}

async fn run_file_read(
    provider: &AzureProvider,
    backend: &dyn StateBackend,
    name: &str,
) -> Result<(), String> {
    let mut state = read_state(backend).await?;
    let (id, identifier) = tracked_file(&state, name)?;

    let current = provider
        .read(&id, &identifier)
        .await
        .map_err(|e| e.to_string())?;

    if !current.exists {
        state.remove_resource(&id.resource_type, &id.name);
        write_state(backend, &mut state).await?;
        println!(
            "{} {} no longer exists; removed from state",
            "!".yellow().bold(),
            id
        );
        return Ok(());
    }

    println!("{} ({})", id.to_string().bold(), identifier);
    let mut keys: Vec<&String> = current.attributes.keys().collect();
    keys.sort();
    for key in keys {
        if let Some(value) = current.attributes.get(key).and_then(Value::as_str) {
            println!("  {} = {:?}", key, value);
        }
    }
    Ok(())
}

async fn run_file_delete(
    provider: &AzureProvider,
    backend: &dyn StateBackend,
    name: &str,
) -> Result<(), String> {
    let mut state = read_state(backend).await?;
    let (id, identifier) = tracked_file(&state, name)?;

    provider
        .delete(&id, &identifier)
        .await
        .map_err(|e| e.to_string())?;

    state.remove_resource(&id.resource_type, &id.name);
    write_state(backend, &mut state).await?;

    println!("{} {}", "Deleted".red().bold(), id);
    Ok(())
}

fn ensure_untracked(state: &StateFile, id: &ResourceId) -> Result<(), String> {
    if state.find_resource(&id.resource_type, &id.name).is_some() {
        return Err(format!("{} is already in the state", id));
    }
    Ok(())
}

/// State entry for a file at the current schema version
fn file_state<'a>(
    provider: &AzureProvider,
    id: &ResourceId,
    identifier: &str,
    attributes: impl Iterator<Item = (&'a String, &'a Value)>,
) -> ResourceState {
    let mut resource_state = ResourceState::new(&id.resource_type, &id.name, provider.name())
        .with_schema_version(data_lake_store_file::SCHEMA_VERSION)
        .with_attribute("id", serde_json::Value::String(identifier.to_string()));
    for (key, value) in attributes {
        resource_state = resource_state.with_attribute(key.clone(), value.to_json());
    }
    resource_state
}

/// Resource id and identifier of a tracked file at the current schema version
fn tracked_file(state: &StateFile, name: &str) -> Result<(ResourceId, String), String> {
    let resource = state
        .find_resource(data_lake_store_file::RESOURCE_TYPE, name)
        .ok_or_else(|| {
            format!(
                "{}.{} is not in the state",
                data_lake_store_file::RESOURCE_TYPE,
                name
            )
        })?;

    if resource.schema_version < data_lake_store_file::SCHEMA_VERSION {
        return Err(format!(
            "{}.{} has state version {}; run `azurerm state upgrade` first",
            resource.resource_type, resource.name, resource.schema_version
        ));
    }

    let identifier = resource
        .id()
        .ok_or_else(|| format!("{}.{} has no id in the state", resource.resource_type, name))?;

    Ok((
        ResourceId::new(&resource.resource_type, &resource.name),
        identifier.to_string(),
    ))
}

// =============================================================================
// Helpers
// =============================================================================

async fn read_state(backend: &dyn StateBackend) -> Result<StateFile, String> {
    Ok(backend
        .read_state()
        .await
        .map_err(|e| format!("Failed to read state: {}", e))?
        .unwrap_or_default())
}

async fn write_state(backend: &dyn StateBackend, state: &mut StateFile) -> Result<(), String> {
    state.increment_serial();
    backend
        .write_state(state)
        .await
        .map_err(|e| format!("Failed to write state: {}", e))
}

fn to_pretty_json(state: &StateFile) -> Result<String, String> {
    serde_json::to_string_pretty(state)
        .map(|s| s + "\n")
        .map_err(|e| format!("Failed to serialize state: {}", e))
}

fn print_diff(file: &Path, original: &str, upgraded: &str) {
    println!("\n{} {}:", "Diff for".cyan().bold(), file.display());

    let diff = TextDiff::from_lines(original, upgraded);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-".red(),
            ChangeTag::Insert => "+".green(),
            ChangeTag::Equal => " ".normal(),
        };
        print!("{}{}", sign, change);
    }
}
