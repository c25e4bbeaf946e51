use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    version,
    name = "kubeget",
    about = "Bootstrap the latest stable kubectl binary into a workspace bin directory"
)]
pub struct Cli {
    /// Defaults to `install` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config (defaults to ./kubeget.toml)
    #[arg(short, long)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download and install kubectl (no-op if already installed).
    /// Examples:
    ///   kubeget                       # install latest stable
    ///   kubeget install --pin 1.30.2  # install a specific version
    ///   kubeget install --force       # reinstall over an existing binary
    Install {
        /// Reinstall even if the binary already exists
        #[arg(long)]
        force: bool,
        /// Install an exact version instead of resolving stable.txt
        #[arg(long, value_name = "VERSION")]
        pin: Option<String>,
    },
    /// Show what would be installed (resolves the version, no changes)
    Plan,
    /// Report the installed binary and its version
    Status,
    /// List recently published releases
    Versions {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Remove the installed binary
    Uninstall,
}
