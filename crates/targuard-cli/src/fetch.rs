//! Archive download over HTTP.

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use std::time::Duration;
use tracing::debug;
use tracing::info;

/// HTTP client settings for archive downloads.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout for the whole request, body included.
    pub timeout: Duration,

    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            user_agent: concat!("targuard/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Downloads `url` fully into memory.
///
/// # Errors
///
/// Returns an error if the request fails, times out, or the server answers
/// with a non-2xx status.
pub fn fetch_archive(url: &str, config: &FetchConfig) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.as_str())
        .build()
        .context("failed to build HTTP client")?;

    info!("Fetching {url}");
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("request to {url} failed"))?;

    let status = response.status();
    if !status.is_success() {
        bail!("GET {url} returned HTTP {status}");
    }

    let body = response
        .bytes()
        .with_context(|| format!("failed to read response body from {url}"))?;
    debug!("Fetched {} bytes from {url}", body.len());

    Ok(body.to_vec())
}

#[cfg(test)]
pub mod test_server {
    //! One-shot HTTP server on a loopback port.

    use std::io::Read;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;
    use std::thread::JoinHandle;

    /// Serves a single request with `status` and `body`, returning the URL
    /// to hit and the server thread.
    pub fn serve_once(status: &'static str, body: Vec<u8>) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap_or_else(|e| panic!("bind: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("local_addr: {e}"));

        let handle = thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let header = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(header.as_bytes());
            let _ = stream.write_all(&body);
        });

        (format!("http://{addr}/results.tar.gz"), handle)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::test_server::serve_once;
    use super::*;

    #[test]
    fn test_fetch_returns_body() {
        let (url, server) = serve_once("200 OK", b"archive bytes".to_vec());
        let body = fetch_archive(&url, &FetchConfig::default()).unwrap();
        server.join().unwrap();
        assert_eq!(body, b"archive bytes");
    }

    #[test]
    fn test_fetch_non_success_status_is_error() {
        let (url, server) = serve_once("404 Not Found", b"missing".to_vec());
        let err = fetch_archive(&url, &FetchConfig::default()).unwrap_err();
        server.join().unwrap();
        assert!(err.to_string().contains("404"), "unexpected error: {err}");
    }

    #[test]
    fn test_fetch_invalid_url_is_error() {
        assert!(fetch_archive("not a url", &FetchConfig::default()).is_err());
    }

    #[test]
    fn test_default_user_agent_names_tool() {
        assert!(FetchConfig::default().user_agent.starts_with("targuard/"));
    }
}
