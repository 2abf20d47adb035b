use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "depot", about = "Depot: single-node HTTP file store", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// List stored files without starting the server
    List(StoreArgs),
    /// Show file count and total size of the store
    Stats(StoreArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Address to listen on (overrides the config file)
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Storage root (overrides the config file)
    #[arg(long, env = "DEPOT_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,
    /// Largest accepted upload in bytes (overrides the config file)
    #[arg(long)]
    pub max_upload_bytes: Option<u64>,
}

#[derive(Args)]
pub struct StoreArgs {
    #[arg(long, env = "DEPOT_STORAGE_DIR", default_value = "storage")]
    pub storage_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "depot",
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--storage-dir",
            "/srv/files",
        ])
        .unwrap();
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.bind.unwrap().port(), 9000);
                assert_eq!(args.storage_dir.unwrap(), PathBuf::from("/srv/files"));
                assert!(args.config.is_none());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn reject_bad_bind_address() {
        assert!(Cli::try_parse_from(["depot", "serve", "--bind", "nowhere"]).is_err());
    }
}
