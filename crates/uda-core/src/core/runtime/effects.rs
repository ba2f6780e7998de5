use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::Result;
use reqwest::blocking::Client;

use super::process::{run_command, run_command_passthrough, RunOutput};
use crate::core::net::{build_http_client, DOWNLOAD_TIMEOUT};

/// Runs external programs on behalf of commands.
pub trait ToolRunner: Send + Sync {
    /// Inherited stdio; the child owns the terminal until it exits.
    fn run_passthrough(
        &self,
        program: &Path,
        args: &[OsString],
        envs: &[(String, String)],
    ) -> Result<RunOutput>;

    fn run_captured(
        &self,
        program: &Path,
        args: &[OsString],
        envs: &[(String, String)],
    ) -> Result<RunOutput>;
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{0}")]
    Network(String),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("write failed: {0}")]
    Io(#[source] io::Error),
}

pub trait Downloader: Send + Sync {
    /// Streams `url` into `dest`, returning the byte count.
    fn fetch(&self, url: &str, dest: &mut dyn Write) -> Result<u64, FetchError>;

    /// True when `url` answers `200 OK` within `timeout`.
    fn probe(&self, url: &str, timeout: Duration) -> bool;
}

pub trait Effects: Send + Sync {
    fn runner(&self) -> &dyn ToolRunner;
    fn downloader(&self) -> &dyn Downloader;
}

pub type SharedEffects = Arc<dyn Effects>;

#[derive(Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run_passthrough(
        &self,
        program: &Path,
        args: &[OsString],
        envs: &[(String, String)],
    ) -> Result<RunOutput> {
        run_command_passthrough(program, args, envs)
    }

    fn run_captured(
        &self,
        program: &Path,
        args: &[OsString],
        envs: &[(String, String)],
    ) -> Result<RunOutput> {
        run_command(program, args, envs)
    }
}

pub struct HttpDownloader {
    keep_proxies: bool,
    client: OnceLock<Client>,
}

impl HttpDownloader {
    #[must_use]
    pub fn new(keep_proxies: bool) -> Self {
        Self {
            keep_proxies,
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> Result<&Client, FetchError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = build_http_client(self.keep_proxies, DOWNLOAD_TIMEOUT)
            .map_err(|err| FetchError::Network(format!("{err:#}")))?;
        Ok(self.client.get_or_init(|| client))
    }
}

impl Downloader for HttpDownloader {
    fn fetch(&self, url: &str, dest: &mut dyn Write) -> Result<u64, FetchError> {
        let mut response = self
            .client()?
            .get(url)
            .send()
            .map_err(|err| FetchError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let mut written = 0u64;
        let mut chunk = [0u8; 64 * 1024];
        loop {
            let read = response
                .read(&mut chunk)
                .map_err(|err| FetchError::Network(err.to_string()))?;
            if read == 0 {
                break;
            }
            dest.write_all(&chunk[..read]).map_err(FetchError::Io)?;
            written += read as u64;
        }
        dest.flush().map_err(FetchError::Io)?;
        Ok(written)
    }

    fn probe(&self, url: &str, timeout: Duration) -> bool {
        let Ok(client) = self.client() else {
            return false;
        };
        match client.get(url).timeout(timeout).send() {
            Ok(response) => {
                tracing::debug!(url, status = response.status().as_u16(), "mirror probe");
                response.status() == reqwest::StatusCode::OK
            }
            Err(err) => {
                tracing::debug!(url, %err, "mirror probe failed");
                false
            }
        }
    }
}

pub struct SystemEffects {
    runner: SystemRunner,
    downloader: HttpDownloader,
}

impl SystemEffects {
    #[must_use]
    pub fn new(keep_proxies: bool) -> Self {
        Self {
            runner: SystemRunner,
            downloader: HttpDownloader::new(keep_proxies),
        }
    }
}

impl Effects for SystemEffects {
    fn runner(&self) -> &dyn ToolRunner {
        &self.runner
    }

    fn downloader(&self) -> &dyn Downloader {
        &self.downloader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::request, responders::status_code, Expectation, Server};

    #[test]
    fn fetch_streams_body() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/asset"))
                .respond_with(status_code(200).body("binary-bytes")),
        );
        let downloader = HttpDownloader::new(false);
        let mut sink = Vec::new();
        let written = downloader.fetch(&server.url_str("/asset"), &mut sink)?;
        assert_eq!(written, 12);
        assert_eq!(sink, b"binary-bytes");
        Ok(())
    }

    #[test]
    fn fetch_reports_http_status() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/missing"))
                .respond_with(status_code(404)),
        );
        let downloader = HttpDownloader::new(false);
        let mut sink = Vec::new();
        let err = downloader
            .fetch(&server.url_str("/missing"), &mut sink)
            .expect_err("404 should fail");
        assert!(matches!(err, FetchError::Status(404)));
    }

    #[test]
    fn fetch_reports_unreachable_hosts_as_network_errors() {
        let downloader = HttpDownloader::new(false);
        let mut sink = Vec::new();
        let err = downloader
            .fetch("http://127.0.0.1:9/uv.tar.gz", &mut sink)
            .expect_err("closed port should fail");
        assert!(matches!(err, FetchError::Network(_)));
    }

    #[test]
    fn probe_requires_ok_status() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/up/simple/"))
                .respond_with(status_code(200)),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/down/simple/"))
                .respond_with(status_code(503)),
        );
        let downloader = HttpDownloader::new(false);
        let timeout = Duration::from_secs(5);
        assert!(downloader.probe(&server.url_str("/up/simple/"), timeout));
        assert!(!downloader.probe(&server.url_str("/down/simple/"), timeout));
    }
}
