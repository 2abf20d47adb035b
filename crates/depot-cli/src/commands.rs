use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use depot_server::{DepotServer, ServerConfig};
use depot_store::{AccountingTracker, FsObjectStore, ObjectEntry, ObjectStore};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::List(args) => cmd_list(&args.storage_dir),
        Command::Stats(args) => cmd_stats(&args.storage_dir),
    }
}

/// Merge the optional config file with command-line overrides.
pub fn resolve_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_toml_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(dir) = &args.storage_dir {
        config.storage_root = dir.clone();
    }
    if let Some(limit) = args.max_upload_bytes {
        config.max_upload_bytes = limit;
    }
    config.validate()?;
    Ok(config)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    tracing::debug!(?config, "resolved server configuration");
    println!(
        "{} Depot on {} (root: {})",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        config.storage_root.display()
    );
    let server = DepotServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

/// Open a store for inspection. Never creates or removes anything, so it is
/// safe to run against the root of a live server.
fn open_existing(dir: &Path) -> anyhow::Result<FsObjectStore> {
    anyhow::ensure!(dir.is_dir(), "storage directory {} does not exist", dir.display());
    let store = FsObjectStore::open_existing(dir)?;
    tracing::debug!(root = %store.root().display(), "inspecting store");
    Ok(store)
}

fn sorted_entries(store: &FsObjectStore) -> anyhow::Result<Vec<ObjectEntry>> {
    let mut entries = store.list()?;
    entries.sort();
    tracing::debug!(count = entries.len(), "listed store");
    Ok(entries)
}

fn cmd_list(dir: &Path) -> anyhow::Result<()> {
    let store = open_existing(dir)?;
    let entries = sorted_entries(&store)?;
    if entries.is_empty() {
        println!("No files stored.");
        return Ok(());
    }
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    for entry in &entries {
        println!("{:<width$}  {:>10}", entry.name.cyan(), entry.size);
    }
    println!("{} file(s)", entries.len().to_string().bold());
    Ok(())
}

fn cmd_stats(dir: &Path) -> anyhow::Result<()> {
    let store = open_existing(dir)?;
    let snapshot = AccountingTracker::seeded_from(&store)?.snapshot(&store)?;
    println!("Storage root: {}", store.root().display().to_string().bold());
    println!("  Files: {}", snapshot.files_current.to_string().green());
    println!(
        "  Size:  {} bytes ({} MB)",
        snapshot.total_storage_bytes.to_string().green(),
        snapshot.total_storage_mb()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn serve_args() -> ServeArgs {
        ServeArgs {
            config: None,
            bind: None,
            storage_dir: None,
            max_upload_bytes: None,
        }
    }

    #[test]
    fn defaults_without_file_or_flags() {
        let config = resolve_config(&serve_args()).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("depot.toml");
        std::fs::write(&path, "storage_root = \"from-file\"\nmax_upload_bytes = 10\n").unwrap();

        let args = ServeArgs {
            config: Some(path),
            storage_dir: Some(PathBuf::from("from-flag")),
            ..serve_args()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.storage_root, PathBuf::from("from-flag"));
        assert_eq!(config.max_upload_bytes, 10);
    }

    #[test]
    fn zero_upload_limit_flag_is_rejected() {
        let args = ServeArgs {
            max_upload_bytes: Some(0),
            ..serve_args()
        };
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    fn offline_commands_require_existing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nowhere");
        assert!(cmd_list(&missing).is_err());
        assert!(cmd_stats(&missing).is_err());
        assert!(!missing.exists());
    }

    #[test]
    fn entries_are_sorted_by_name() {
        let dir = TempDir::new().unwrap();
        for name in ["b", "c", "a"] {
            std::fs::write(dir.path().join(name), name).unwrap();
        }
        let store = open_existing(dir.path()).unwrap();
        let names: Vec<String> = sorted_entries(&store)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(cmd_list(dir.path()).is_ok());
        assert!(cmd_stats(dir.path()).is_ok());
    }

    #[test]
    fn offline_commands_leave_staging_untouched() {
        let dir = TempDir::new().unwrap();
        let staging = dir.path().join(depot_store::names::STAGING_DIR);
        std::fs::create_dir(&staging).unwrap();
        std::fs::write(staging.join("upload-in-flight"), b"partial").unwrap();
        std::fs::write(dir.path().join("done.txt"), b"done").unwrap();

        assert!(cmd_list(dir.path()).is_ok());
        assert!(cmd_stats(dir.path()).is_ok());
        assert!(staging.join("upload-in-flight").is_file());
    }

    #[test]
    fn offline_commands_do_not_create_staging() {
        let dir = TempDir::new().unwrap();
        assert!(cmd_list(dir.path()).is_ok());
        assert!(!dir.path().join(depot_store::names::STAGING_DIR).exists());
    }
}
