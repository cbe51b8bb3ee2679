// src/repository/client.rs

//! Fetch client for repository catalogs, template assets and dependencies
//!
//! Wraps a blocking reqwest client with bounded timeouts and retry support.
//! Locators that are not HTTP(S) URLs (`file://` URLs and plain paths) are
//! served from the local filesystem through the same methods, so folder
//! repositories and shared-drive dependencies behave like remote ones.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Default connect timeout (3 seconds)
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Default timeout for a whole request (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum attempts for a request that fails in transport
const MAX_RETRIES: u32 = 3;

/// Base retry delay; attempt `n` waits `n` times this long
const RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Where a locator points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Remote(String),
    File(PathBuf),
}

impl Location {
    /// Classify a catalog, asset or dependency locator
    pub fn parse(locator: &str) -> Self {
        let lower = locator.trim().to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("ftp://")
        {
            return Self::Remote(locator.trim().to_string());
        }
        if lower.starts_with("file://") {
            if let Ok(parsed) = url::Url::parse(locator.trim()) {
                if let Ok(path) = parsed.to_file_path() {
                    return Self::File(path);
                }
            }
            return Self::File(PathBuf::from(&locator.trim()["file://".len()..]));
        }
        Self::File(PathBuf::from(locator))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    /// Honor proxy settings from the environment
    pub use_system_proxy: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
            request_timeout: HTTP_TIMEOUT,
            max_retries: MAX_RETRIES,
            retry_delay: RETRY_DELAY,
            use_system_proxy: true,
        }
    }
}

impl From<&EngineConfig> for ClientSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            request_timeout: config.request_timeout(),
            max_retries: config.max_retries.max(1),
            retry_delay: RETRY_DELAY,
            use_system_proxy: config.use_system_proxy,
        }
    }
}

/// HTTP client wrapper with retry support
pub struct RepositoryClient {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl RepositoryClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&ClientSettings::default())
    }

    pub fn with_settings(settings: &ClientSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout);
        if !settings.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_retries: settings.max_retries.max(1),
            retry_delay: settings.retry_delay,
        })
    }

    /// Fetch the whole content behind `locator`
    pub fn fetch_bytes(&self, locator: &str) -> Result<Vec<u8>> {
        match Location::parse(locator) {
            Location::File(path) => fs::read(&path)
                .map_err(|e| Error::IoError(format!("Failed to read {}: {e}", path.display()))),
            Location::Remote(url) => {
                debug!("Fetching {}", url);
                let response = self.send_with_retry(&url, || self.client.get(&url))?;
                if !response.status().is_success() {
                    return Err(Error::DownloadError(format!(
                        "HTTP {} from {}",
                        response.status(),
                        url
                    )));
                }
                read_body(response, &url)
            }
        }
    }

    /// Fetch an optional asset; a missing file or non-200 answer is `None`
    pub fn fetch_optional(&self, locator: &str) -> Result<Option<Vec<u8>>> {
        match Location::parse(locator) {
            Location::File(path) => match fs::read(&path) {
                Ok(content) => Ok(Some(content)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!("Optional asset {} not present", path.display());
                    Ok(None)
                }
                Err(e) => Err(Error::IoError(format!(
                    "Failed to read {}: {e}",
                    path.display()
                ))),
            },
            Location::Remote(url) => {
                let response = self.send_with_retry(&url, || self.client.get(&url))?;
                if response.status() != StatusCode::OK {
                    debug!("Skipping optional asset {}: HTTP {}", url, response.status());
                    return Ok(None);
                }
                read_body(response, &url).map(Some)
            }
        }
    }

    /// True when `locator` answers HEAD with 200, or names an existing file
    pub fn head_ok(&self, locator: &str) -> bool {
        match Location::parse(locator) {
            Location::File(path) => path.is_file(),
            Location::Remote(url) => match self.client.head(&url).send() {
                Ok(response) => {
                    debug!("HEAD {} -> {}", url, response.status());
                    response.status() == StatusCode::OK
                }
                Err(e) => {
                    debug!("HEAD {} failed: {}", url, e);
                    false
                }
            },
        }
    }

    /// Download `locator` to `dest_path` through a temporary file
    pub fn download_file(&self, locator: &str, dest_path: &Path) -> Result<()> {
        info!("Downloading {} to {}", locator, dest_path.display());

        let parent = dest_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|e| {
            Error::IoError(format!("Failed to create directory {}: {e}", parent.display()))
        })?;

        let mut temp = NamedTempFile::new_in(parent).map_err(|e| {
            Error::IoError(format!("Failed to create temp file in {}: {e}", parent.display()))
        })?;

        match Location::parse(locator) {
            Location::File(path) => {
                let mut source = File::open(&path).map_err(|e| {
                    Error::DownloadError(format!("Failed to open {}: {e}", path.display()))
                })?;
                io::copy(&mut source, temp.as_file_mut()).map_err(|e| {
                    Error::IoError(format!("Failed to copy {}: {e}", path.display()))
                })?;
            }
            Location::Remote(url) => {
                let mut response = self.send_with_retry(&url, || self.client.get(&url))?;
                if !response.status().is_success() {
                    return Err(Error::DownloadError(format!(
                        "HTTP {} from {}",
                        response.status(),
                        url
                    )));
                }
                io::copy(&mut response, temp.as_file_mut()).map_err(|e| {
                    Error::IoError(format!("Failed to write downloaded data: {e}"))
                })?;
            }
        }

        temp.flush()
            .map_err(|e| Error::IoError(format!("Failed to flush download: {e}")))?;
        temp.persist(dest_path).map_err(|e| {
            Error::IoError(format!(
                "Failed to move download to {}: {}",
                dest_path.display(),
                e.error
            ))
        })?;

        info!("Successfully downloaded to {}", dest_path.display());
        Ok(())
    }

    /// Send a request, retrying transport failures with linear backoff
    ///
    /// HTTP status errors are returned to the caller untouched.
    fn send_with_retry<F>(&self, url: &str, request: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match request().send() {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(Error::DownloadError(format!(
                            "Failed to fetch {url} after {attempt} attempts: {e}"
                        )));
                    }
                    warn!("Fetch attempt {} for {} failed: {}, retrying...", attempt, url, e);
                    std::thread::sleep(self.retry_delay * attempt);
                }
            }
        }
    }
}

fn read_body(response: Response, url: &str) -> Result<Vec<u8>> {
    response
        .bytes()
        .map(|bytes| bytes.to_vec())
        .map_err(|e| Error::DownloadError(format!("Failed to read response from {url}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_location_parse() {
        assert_eq!(
            Location::parse("https://example.com/a-repository.json"),
            Location::Remote("https://example.com/a-repository.json".into())
        );
        assert!(Location::parse("HTTP://example.com/x.json").is_remote());
        assert_eq!(
            Location::parse("file:///srv/share/a-repository.json"),
            Location::File(PathBuf::from("/srv/share/a-repository.json"))
        );
        assert_eq!(
            Location::parse("/srv/share/a-repository.json"),
            Location::File(PathBuf::from("/srv/share/a-repository.json"))
        );
    }

    #[test]
    fn test_file_locators() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("lib.jar");
        fs::write(&source, b"artifact").unwrap();
        let client = RepositoryClient::new().unwrap();

        assert_eq!(client.fetch_bytes(&source.to_string_lossy()).unwrap(), b"artifact");
        assert!(client.head_ok(&source.to_string_lossy()));
        assert!(!client.head_ok(&dir.path().join("missing").to_string_lossy()));
        assert!(
            client
                .fetch_optional(&dir.path().join("missing").to_string_lossy())
                .unwrap()
                .is_none()
        );

        let dest = dir.path().join("lib").join("lib-1.0.jar");
        let file_url = format!("file://{}", source.display());
        client.download_file(&file_url, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"artifact");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let client = RepositoryClient::new().unwrap();
        let err = client.fetch_bytes("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }
}
