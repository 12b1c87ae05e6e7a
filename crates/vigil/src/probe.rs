use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::config::Target;
use crate::types::ProbeResult;

/// User-Agent sent with every probe request.
const USER_AGENT: &str = "vigil-checker/1.0";

/// Performs one check of a target.
///
/// Implementations must not fail past this boundary: every transport
/// problem maps to a DOWN result carrying a diagnostic message.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: &Target, timeout: Duration) -> ProbeResult;
}

/// HTTP prober backed by a shared reqwest client.
///
/// Issues one GET per call, bounded by the per-target timeout. A response
/// whose status code matches `expected_status` is UP; any other outcome
/// is DOWN.
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &Target, timeout: Duration) -> ProbeResult {
        let start = Instant::now();

        match self.client.get(&target.url).timeout(timeout).send().await {
            Ok(response) => {
                let elapsed = round_ms(start.elapsed());
                let code = response.status().as_u16();
                if code == target.expected_status {
                    ProbeResult::up(&target.id, elapsed)
                } else {
                    ProbeResult::down(
                        &target.id,
                        Some(elapsed),
                        format!("expected status {}, got {code}", target.expected_status),
                    )
                }
            }
            Err(err) if err.is_timeout() => ProbeResult::down(
                &target.id,
                None,
                format!("timeout after {}s", timeout.as_secs()),
            ),
            Err(err) if err.is_connect() => {
                ProbeResult::down(&target.id, None, format!("connection error: {err}"))
            }
            Err(err) => ProbeResult::down(&target.id, None, format!("request error: {err}")),
        }
    }
}

/// Elapsed time in milliseconds, rounded to two decimals.
fn round_ms(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Status;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn target(id: &str, url: String) -> Target {
        Target {
            id: id.into(),
            name: id.to_uppercase(),
            url,
            timeout: None,
            expected_status: 200,
            enabled: true,
        }
    }

    /// Serve one canned HTTP response on a local port.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn matching_status_code_is_up() {
        let url = serve_once("HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
            .await;
        let prober = HttpProber::new().unwrap();

        let result = prober.probe(&target("api", url), Duration::from_secs(5)).await;

        assert_eq!(result.status, Status::Up);
        assert!(result.response_time_ms.is_some());
        assert!(result.error_message.is_none());
    }

    #[tokio::test]
    async fn unexpected_status_code_is_down_with_response_time() {
        let url = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let prober = HttpProber::new().unwrap();

        let result = prober.probe(&target("api", url), Duration::from_secs(5)).await;

        assert_eq!(result.status, Status::Down);
        assert!(result.response_time_ms.is_some());
        assert_eq!(result.error_message.as_deref(), Some("expected status 200, got 500"));
    }

    #[tokio::test]
    async fn connection_failure_is_down_without_response_time() {
        // Bind to grab a free port, then drop the listener before probing.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let prober = HttpProber::new().unwrap();
        let result =
            prober.probe(&target("api", format!("http://{addr}/")), Duration::from_secs(5)).await;

        assert_eq!(result.status, Status::Down);
        assert_eq!(result.response_time_ms, None);
        assert!(result.error_message.unwrap().starts_with("connection error"));
    }

    #[tokio::test]
    async fn unresponsive_server_times_out() {
        // Accept the connection but never answer.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _socket = listener.accept().await;
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let prober = HttpProber::new().unwrap();
        let result =
            prober.probe(&target("api", format!("http://{addr}/")), Duration::from_secs(1)).await;

        assert_eq!(result.status, Status::Down);
        assert_eq!(result.response_time_ms, None);
        assert_eq!(result.error_message.as_deref(), Some("timeout after 1s"));
    }
}
