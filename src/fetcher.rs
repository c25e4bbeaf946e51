use fs_err as fs;
use reqwest::blocking::{Client, Response};
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use std::io;
use std::path::Path;
use thiserror::Error;
use url::Url;

pub const DEFAULT_MAX_REDIRECTS: u32 = 5;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("too many redirects fetching {url}")]
    TooManyRedirects { url: String },
    #[error("request failed with status {status} for {url}")]
    Status { status: StatusCode, url: String },
    #[error("invalid url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Build the blocking client used for all fetches. Automatic redirect
/// following is disabled; hops are counted explicitly in `get_with_redirects`.
pub fn client() -> Result<Client, FetchError> {
    let client = Client::builder()
        .user_agent(concat!("kubeget/", env!("CARGO_PKG_VERSION")))
        .redirect(Policy::none())
        .build()?;
    Ok(client)
}

/// GET a URL following up to `max_redirects` hops and return the body as text.
pub fn fetch_text(client: &Client, url: &str, max_redirects: u32) -> Result<String, FetchError> {
    let resp = get_with_redirects(client, url, max_redirects)?;
    Ok(resp.text()?)
}

/// GET a URL following up to `max_redirects` hops and stream the body to a
/// new file at `output_path`, then mark it executable (0o755). The path is
/// never left holding a partial file: any error after creation removes it.
pub fn download_to_file(
    client: &Client,
    url: &str,
    output_path: &Path,
    max_redirects: u32,
) -> Result<(), FetchError> {
    let mut resp = get_with_redirects(client, url, max_redirects)?;
    let mut file = fs::File::create(output_path)?;
    if let Err(e) = io::copy(&mut resp, &mut file) {
        drop(file);
        let _ = fs::remove_file(output_path);
        return Err(e.into());
    }
    drop(file);
    if let Err(e) = make_executable(output_path) {
        let _ = fs::remove_file(output_path);
        return Err(e);
    }
    Ok(())
}

fn get_with_redirects(
    client: &Client,
    url: &str,
    max_redirects: u32,
) -> Result<Response, FetchError> {
    let mut current = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    let mut hops_remaining = max_redirects;
    loop {
        let resp = client.get(current.clone()).send()?;
        let status = resp.status();
        if status.is_redirection() {
            // Location may be relative; resolve it against the current URL.
            if let Some(location) = resp.headers().get(LOCATION).and_then(|v| v.to_str().ok()) {
                if hops_remaining == 0 {
                    return Err(FetchError::TooManyRedirects {
                        url: url.to_string(),
                    });
                }
                current = current
                    .join(location)
                    .map_err(|source| FetchError::InvalidUrl {
                        url: location.to_string(),
                        source,
                    })?;
                hops_remaining -= 1;
                continue;
            }
            // 3xx without a usable Location falls through to the status error.
        }
        if status == StatusCode::OK {
            return Ok(resp);
        }
        return Err(FetchError::Status {
            status,
            url: current.to_string(),
        });
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), FetchError> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), FetchError> {
    Ok(())
}
