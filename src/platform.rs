use anyhow::{bail, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Linux,
    Darwin,
}

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Amd64,
    Arm64,
    Arm,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
            Arch::Arm => "arm",
        }
    }
}

/// The (os, arch) pair a release binary is published for. Resolved once at
/// startup, before any network activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub os: Os,
    pub arch: Arch,
}

impl Target {
    pub fn detect() -> Result<Self> {
        Self::from_raw(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn from_raw(os: &str, arch: &str) -> Result<Self> {
        let os = match os {
            "linux" => Os::Linux,
            "macos" | "darwin" => Os::Darwin,
            "windows" => {
                bail!("unsupported OS type: windows (consider WSL or a compatible shell like Git Bash)")
            }
            other => bail!("unsupported OS type: {other}"),
        };
        let arch = match arch {
            "x86_64" | "amd64" => Arch::Amd64,
            "aarch64" | "arm64" => Arch::Arm64,
            "arm" => Arch::Arm,
            other => bail!("unsupported machine type: {other}"),
        };
        Ok(Target { os, arch })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os.as_str(), self.arch.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_std_identifiers_to_release_names() {
        let t = Target::from_raw("linux", "x86_64").unwrap();
        assert_eq!((t.os, t.arch), (Os::Linux, Arch::Amd64));
        let t = Target::from_raw("macos", "aarch64").unwrap();
        assert_eq!((t.os, t.arch), (Os::Darwin, Arch::Arm64));
        let t = Target::from_raw("linux", "arm").unwrap();
        assert_eq!(t.arch, Arch::Arm);
        assert_eq!(t.to_string(), "linux-arm");
    }

    #[test]
    fn windows_is_rejected_with_a_hint() {
        let err = Target::from_raw("windows", "x86_64").unwrap_err();
        assert!(err.to_string().contains("WSL"));
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(Target::from_raw("plan9", "x86_64").is_err());
        assert!(Target::from_raw("linux", "riscv64").is_err());
    }

    #[test]
    fn detect_current_host() {
        // Supported everywhere the test suite runs.
        let t = Target::detect().unwrap();
        assert!(!t.os.as_str().is_empty());
        assert!(!t.arch.as_str().is_empty());
    }
}
