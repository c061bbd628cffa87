// crates/geoimport-core/src/loader/remote.rs
//! Where remote file metadata comes from, and how stale files are fetched.

use super::freshness::RemoteMeta;
use crate::config::SourceFile;
use crate::error::{ImportError, Result};
use std::path::Path;

/// Remote side of the Freshness Gate.
pub trait RemoteSource {
    /// Size and modification time of the remote file, `None` when unknown.
    fn probe(&self, file: &SourceFile) -> Result<Option<RemoteMeta>>;

    /// Downloads the remote file to `dest`.
    fn fetch(&self, file: &SourceFile, dest: &Path) -> Result<()>;
}

/// No network: remote metadata is never known and nothing is fetched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl RemoteSource for Offline {
    fn probe(&self, _file: &SourceFile) -> Result<Option<RemoteMeta>> {
        Ok(None)
    }

    fn fetch(&self, file: &SourceFile, _dest: &Path) -> Result<()> {
        Err(ImportError::NotFound(format!(
            "{} is missing locally and fetching is disabled",
            file.filename
        )))
    }
}

#[cfg(feature = "fetch")]
pub use http::HttpSource;

#[cfg(feature = "fetch")]
mod http {
    use super::*;
    use reqwest::blocking::Client;
    use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED};
    use std::fs::{self, File};
    use std::io::BufWriter;
    use std::time::SystemTime;
    use tracing::{info, warn};

    /// Blocking HTTP client for the GeoNames download server.
    #[derive(Debug, Clone)]
    pub struct HttpSource {
        client: Client,
    }

    impl HttpSource {
        pub fn new() -> Result<Self> {
            let client = Client::builder()
                .user_agent(concat!("geoimport/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| ImportError::Fetch(e.to_string()))?;
            Ok(Self { client })
        }
    }

    fn parse_http_date(value: &str) -> Option<SystemTime> {
        chrono::DateTime::parse_from_rfc2822(value)
            .ok()
            .map(SystemTime::from)
    }

    impl RemoteSource for HttpSource {
        fn probe(&self, file: &SourceFile) -> Result<Option<RemoteMeta>> {
            for url in file.urls() {
                let resp = match self.client.head(&url).send() {
                    Ok(r) if r.status().is_success() => r,
                    Ok(r) => {
                        warn!(%url, status = %r.status(), "remote probe failed");
                        continue;
                    }
                    Err(e) => {
                        warn!(%url, error = %e, "remote probe failed");
                        continue;
                    }
                };
                let headers = resp.headers();
                // An HTML page here is an error page, not the dump.
                if headers
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|v| v.contains("html"))
                {
                    continue;
                }
                let size = headers
                    .get(CONTENT_LENGTH)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok());
                let modified = headers
                    .get(LAST_MODIFIED)
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_http_date);
                if let (Some(size), Some(modified)) = (size, modified) {
                    return Ok(Some(RemoteMeta { size, modified }));
                }
            }
            warn!(file = %file.filename, "remote file not found, assuming local copy is up to date");
            Ok(None)
        }

        fn fetch(&self, file: &SourceFile, dest: &Path) -> Result<()> {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            let partial = dest.with_extension("part");
            for url in file.urls() {
                info!(%url, "downloading");
                let mut resp = match self.client.get(&url).send().and_then(|r| r.error_for_status()) {
                    Ok(r) => r,
                    Err(e) => {
                        warn!(%url, error = %e, "download failed");
                        continue;
                    }
                };
                let mut out = BufWriter::new(File::create(&partial)?);
                std::io::copy(&mut resp, &mut out)?;
                drop(out);
                fs::rename(&partial, dest)?;
                return Ok(());
            }
            Err(ImportError::Fetch(format!(
                "could not download {} from any configured URL",
                file.filename
            )))
        }
    }

}
