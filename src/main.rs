use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use metascrub::config::ClientConfig;
use metascrub::error::AppError;
use metascrub::models::{BackupStatus, FileQueue, FileState};
use metascrub::services::backup::BackupService;
use metascrub::services::cloud_providers::CloudProvider;
use metascrub::services::cloud_providers::google_drive::GoogleDriveProvider;
use metascrub::services::ingest::IngestService;
use metascrub::services::notifier::LogNotifier;
use metascrub::services::sanitize::{HttpSanitizer, SanitizeService};
use metascrub::services::stats::queue_stats;
use metascrub::services::token_manager::TokenManager;
use metascrub::utils::format::format_size;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sanitize files of identifying metadata, optionally backing up originals
    Clean {
        /// Files to sanitize
        paths: Vec<PathBuf>,

        /// Back up originals to cloud storage after sanitizing
        #[arg(short, long)]
        backup: bool,

        /// Print the final queue state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage backed-up originals in cloud storage
    #[command(subcommand)]
    Backups(BackupsCommand),
}

#[derive(Subcommand, Debug)]
enum BackupsCommand {
    /// List backed-up files
    List,

    /// Download a backed-up file
    Fetch {
        file_id: String,

        /// Destination path (defaults to the file id)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a backed-up file
    Delete { file_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metascrub=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env()?;

    match cli.command {
        Command::Clean {
            paths,
            backup,
            json,
        } => run_clean(config, paths, backup, json).await,
        Command::Backups(command) => run_backups(config, command).await,
    }
}

async fn run_clean(
    config: ClientConfig,
    paths: Vec<PathBuf>,
    backup: bool,
    json: bool,
) -> anyhow::Result<()> {
    if paths.is_empty() {
        return Err(AppError::Validation("No files to process, pass at least one path".to_string()).into());
    }

    info!("🧼 Sanitize endpoint: {}", config.sanitize_url);

    let queue = Arc::new(Mutex::new(FileQueue::new()));
    let notifier = Arc::new(LogNotifier);

    let ingest = IngestService::new(queue.clone(), notifier.clone(), config.max_file_size);
    let accepted = ingest.ingest_paths(&paths).await;
    if accepted == 0 {
        warn!("None of the given paths could be read");
        return Ok(());
    }

    let sanitizer = Arc::new(HttpSanitizer::new(config.sanitize_url.clone()));
    let sanitize = SanitizeService::new(queue.clone(), sanitizer, notifier.clone());
    sanitize.process_all().await;

    if backup {
        let provider: Arc<dyn CloudProvider> = Arc::new(GoogleDriveProvider::from_config(&config)?);
        let tokens = Arc::new(TokenManager::new(provider.clone()));
        let backups = BackupService::new(queue.clone(), provider, tokens, notifier.clone());
        backups.backup_all().await?;
    }

    let queue = queue.lock().await;
    if json {
        print_json(&queue)?;
    } else {
        print_report(&queue);
    }
    Ok(())
}

async fn run_backups(config: ClientConfig, command: BackupsCommand) -> anyhow::Result<()> {
    let provider: Arc<dyn CloudProvider> = Arc::new(GoogleDriveProvider::from_config(&config)?);
    let tokens = TokenManager::new(provider.clone());
    let access_token = tokens
        .get_valid_token()
        .await
        .map_err(|e| AppError::Auth(format!("{:#}", e)))?;

    match command {
        BackupsCommand::List => {
            let files = provider
                .list_files(&access_token)
                .await
                .map_err(|e| AppError::Transport(format!("{:#}", e)))?;

            if files.is_empty() {
                println!("No backups found");
                return Ok(());
            }
            for file in files {
                let size = file
                    .size
                    .map(|s| format_size(s.max(0) as u64))
                    .unwrap_or_else(|| "-".to_string());
                let modified = file
                    .modified_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{}  {:>10}  {:16}  {}", file.id, size, modified, file.name);
            }
        }
        BackupsCommand::Fetch { file_id, output } => {
            let bytes = provider
                .download_file(&access_token, &file_id)
                .await
                .map_err(|e| AppError::Transport(format!("{:#}", e)))?;
            let path = output.unwrap_or_else(|| PathBuf::from(&file_id));
            tokio::fs::write(&path, &bytes).await?;
            info!(
                "💾 Saved {} ({}) to {}",
                file_id,
                format_size(bytes.len() as u64),
                path.display()
            );
        }
        BackupsCommand::Delete { file_id } => {
            provider
                .delete_file(&access_token, &file_id)
                .await
                .map_err(|e| AppError::Transport(format!("{:#}", e)))?;
            info!("🗑️  Deleted {} from {}", file_id, provider.display_name());
        }
    }
    Ok(())
}

fn print_report(queue: &FileQueue) {
    println!();
    for item in queue.items() {
        match item.state {
            FileState::Success => {
                println!(
                    "  ✓ {} ({}): {} metadata field(s) removed",
                    item.display_name,
                    format_size(item.size_bytes),
                    item.removed_keys.len()
                );
                if !item.removed_keys.is_empty() {
                    println!("      {}", item.removed_keys.join(", "));
                }
                if let Some(link) = &item.remote_link {
                    println!("      cleaned file: {}", link);
                }
                match item.backup.status {
                    BackupStatus::Done => {
                        if let Some(remote_id) = &item.backup.remote_id {
                            println!("      backed up as: {}", remote_id);
                        }
                    }
                    BackupStatus::Pending => println!("      backup pending"),
                    BackupStatus::NotRequested => {}
                }
            }
            FileState::Error => {
                println!(
                    "  ✗ {} ({}): {}",
                    item.display_name,
                    format_size(item.size_bytes),
                    item.error.as_deref().unwrap_or("unknown error")
                );
            }
            FileState::Uploaded | FileState::Processing => {
                println!("  … {} (not processed)", item.display_name);
            }
        }
    }

    let stats = queue_stats(queue);
    println!();
    println!(
        "{} file(s): {} cleaned, {} failed",
        stats.total, stats.success, stats.error
    );
}

fn print_json(queue: &FileQueue) -> anyhow::Result<()> {
    let report = serde_json::json!({
        "files": queue.items(),
        "stats": queue_stats(queue),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
