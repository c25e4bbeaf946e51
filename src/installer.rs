use crate::config::Settings;
use crate::fetcher::{self, DEFAULT_MAX_REDIRECTS};
use crate::platform::Target;
use crate::versioning;
use anyhow::{Context, Result};
use fs_err as fs;
use indicatif::{ProgressBar, ProgressStyle};
use semver::Version;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

pub fn install(settings: &Settings, force: bool, pin: Option<&str>) -> Result<()> {
    let target = Target::detect()?;
    let bin_path = settings.bin_path();
    if bin_path.exists() && !force {
        println!(
            "{} is already installed at {}",
            settings.bin_name,
            bin_path.display()
        );
        return Ok(());
    }

    let client = fetcher::client()?;
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    pb.enable_steady_tick(Duration::from_millis(120));

    let version = match pin {
        Some(spec) => versioning::normalize_pin(spec)?,
        None => {
            pb.set_message("Resolving stable version");
            versioning::fetch_stable(&client, &settings.release_base)?
        }
    };
    let url = build_download_url(&settings.release_base, &version, &target, &settings.bin_name);

    ensure_dir(&settings.install_dir)?;
    pb.set_message(format!("Downloading {} {version}", settings.bin_name));
    let res = fetcher::download_to_file(&client, &url, &bin_path, DEFAULT_MAX_REDIRECTS)
        .with_context(|| format!("GET {url}"));
    if let Err(e) = res {
        pb.finish_and_clear();
        return Err(e);
    }
    pb.finish_with_message(format!(
        "{} {version} installed at {}",
        settings.bin_name,
        bin_path.display()
    ));
    Ok(())
}

pub fn plan(settings: &Settings) -> Result<()> {
    let target = Target::detect()?;
    let client = fetcher::client()?;
    let version = match &settings.pinned_version {
        Some(spec) => versioning::normalize_pin(spec)?,
        None => versioning::fetch_stable(&client, &settings.release_base)?,
    };
    let url = build_download_url(&settings.release_base, &version, &target, &settings.bin_name);
    println!(
        "{} {version} ({target}) -> {}",
        settings.bin_name,
        settings.bin_path().display()
    );
    println!("source: {url}");
    if settings.bin_path().exists() {
        println!("already installed; install would be a no-op without --force");
    }
    Ok(())
}

pub fn status(settings: &Settings) -> Result<()> {
    let bin_path = settings.bin_path();
    if bin_path.exists() {
        let installed =
            find_installed_version(&bin_path).unwrap_or_else(|_| "<unknown>".to_string());
        println!(
            "{} {installed} at {}",
            settings.bin_name,
            bin_path.display()
        );
    } else {
        println!(
            "{} is not installed at {}",
            settings.bin_name,
            bin_path.display()
        );
    }
    if let Ok(on_path) = which::which(&settings.bin_name) {
        if on_path != bin_path {
            println!(
                "note: '{}' on PATH resolves to {}",
                settings.bin_name,
                on_path.display()
            );
        }
    }
    Ok(())
}

pub fn uninstall(settings: &Settings) -> Result<()> {
    let bin_path = settings.bin_path();
    if !bin_path.exists() {
        println!(
            "{} is not installed at {}",
            settings.bin_name,
            bin_path.display()
        );
        return Ok(());
    }
    fs::remove_file(&bin_path)?;
    println!("Removed {}", bin_path.display());
    Ok(())
}

pub fn versions(limit: usize) -> Result<()> {
    let client = fetcher::client()?;
    let all = versioning::fetch_published_versions(&client)?;
    if all.is_empty() {
        println!("no published releases found");
        return Ok(());
    }
    for v in all.iter().take(limit) {
        println!("v{v}");
    }
    Ok(())
}

fn ensure_dir(p: &Path) -> Result<()> {
    fs::create_dir_all(p).with_context(|| format!("creating dir {p:?}"))
}

fn build_download_url(base: &str, version: &str, target: &Target, bin_name: &str) -> String {
    format!(
        "{base}/release/{version}/bin/{os}/{arch}/{bin_name}",
        os = target.os.as_str(),
        arch = target.arch.as_str()
    )
}

// Ask the installed binary for its version and take the first semver token.
fn find_installed_version(bin_path: &Path) -> Result<String> {
    let output = Command::new(bin_path)
        .args(["version", "--client"])
        .output()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    for tok in stdout.split_whitespace() {
        if let Ok(v) = Version::parse(tok.trim_start_matches('v')) {
            return Ok(format!("v{v}"));
        }
    }
    Ok("unknown".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, Os};

    fn settings_at(dir: &Path, base: &str) -> Settings {
        Settings {
            install_dir: dir.to_path_buf(),
            release_base: base.trim_end_matches('/').to_string(),
            bin_name: "kubectl".to_string(),
            pinned_version: None,
        }
    }

    #[test]
    fn download_url_matches_release_layout() {
        let target = Target {
            os: Os::Linux,
            arch: Arch::Amd64,
        };
        // stable.txt body "v1.31.0\n" is trimmed before templating.
        let version = "v1.31.0\n".trim();
        assert_eq!(
            build_download_url("https://dl.k8s.io", version, &target, "kubectl"),
            "https://dl.k8s.io/release/v1.31.0/bin/linux/amd64/kubectl"
        );
    }

    #[test]
    fn install_is_a_no_op_when_binary_exists() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("kubectl");
        std::fs::write(&bin, b"existing").unwrap();
        // Unroutable base: any network attempt would fail the test.
        let settings = settings_at(dir.path(), "http://127.0.0.1:9");
        install(&settings, false, None).unwrap();
        assert_eq!(std::fs::read(&bin).unwrap(), b"existing");
    }

    #[test]
    fn install_fetches_stable_and_writes_executable() {
        let mut server = mockito::Server::new();
        let _stable = server
            .mock("GET", "/release/stable.txt")
            .with_status(200)
            .with_body("v1.31.0\n")
            .create();
        let _bin = server
            .mock(
                "GET",
                mockito::Matcher::Regex(
                    r"^/release/v1\.31\.0/bin/[a-z0-9]+/[a-z0-9]+/kubectl$".to_string(),
                ),
            )
            .with_status(200)
            .with_body("#!kubectl-payload")
            .create();
        let dir = tempfile::tempdir().unwrap();
        let install_dir = dir.path().join("bin");
        let settings = settings_at(&install_dir, &server.url());
        install(&settings, false, None).unwrap();
        let bin = settings.bin_path();
        assert_eq!(std::fs::read(&bin).unwrap(), b"#!kubectl-payload");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&bin).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn pinned_install_skips_stable_lookup() {
        let mut server = mockito::Server::new();
        let stable = server.mock("GET", "/release/stable.txt").expect(0).create();
        let _bin = server
            .mock(
                "GET",
                mockito::Matcher::Regex(
                    r"^/release/v1\.30\.2/bin/[a-z0-9]+/[a-z0-9]+/kubectl$".to_string(),
                ),
            )
            .with_status(200)
            .with_body("pinned")
            .create();
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_at(dir.path(), &server.url());
        install(&settings, false, Some("1.30.2")).unwrap();
        stable.assert();
        assert_eq!(std::fs::read(settings.bin_path()).unwrap(), b"pinned");
    }

    #[test]
    fn uninstall_removes_the_binary_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_at(dir.path(), "http://127.0.0.1:9");
        std::fs::write(settings.bin_path(), b"bin").unwrap();
        uninstall(&settings).unwrap();
        assert!(!settings.bin_path().exists());
        uninstall(&settings).unwrap();
    }
}
