use anyhow::{anyhow, Context, Result};
use fs_err as fs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_RELEASE_BASE: &str = "https://dl.k8s.io";
pub const DEFAULT_BIN_NAME: &str = "kubectl";
pub const WORKSPACE_ENV: &str = "GPTSCRIPT_WORKSPACE_DIR";

/// Optional kubeget.toml. Every key has a default, so a missing file is fine.
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    /// Pin an exact version (e.g. "1.31.0" or "v1.31.0") instead of stable.txt
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub release_base: Option<String>,
    #[serde(default)]
    pub install_dir: Option<PathBuf>,
    #[serde(default)]
    pub bin_name: Option<String>,
}

impl FileConfig {
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Ok(FileConfig::default());
        }
        let data = fs::read_to_string(path)?;
        toml::from_str(&data).with_context(|| format!("parsing {path}"))
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub install_dir: PathBuf,
    pub release_base: String,
    pub bin_name: String,
    pub pinned_version: Option<String>,
}

impl Settings {
    pub fn load(config_path: &str) -> Result<Self> {
        let file = FileConfig::load(config_path)?;
        let workspace = std::env::var_os(WORKSPACE_ENV).map(PathBuf::from);
        Self::resolve(file, workspace, dirs::home_dir())
    }

    /// Install dir precedence: config override, then the workspace env
    /// directory, then a per-user fallback.
    pub fn resolve(
        file: FileConfig,
        workspace: Option<PathBuf>,
        home: Option<PathBuf>,
    ) -> Result<Self> {
        let install_dir = file
            .install_dir
            .or_else(|| workspace.map(|w| w.join("bin")))
            .or_else(|| home.map(|h| h.join(".kubeget").join("bin")))
            .ok_or_else(|| {
                anyhow!("cannot determine install directory: set {WORKSPACE_ENV} or install_dir in kubeget.toml")
            })?;
        let release_base = file
            .release_base
            .unwrap_or_else(|| DEFAULT_RELEASE_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Settings {
            install_dir,
            release_base,
            bin_name: file.bin_name.unwrap_or_else(|| DEFAULT_BIN_NAME.to_string()),
            pinned_version: file.version,
        })
    }

    pub fn bin_path(&self) -> PathBuf {
        self.install_dir.join(&self.bin_name)
    }
}
