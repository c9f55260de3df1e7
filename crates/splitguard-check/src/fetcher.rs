//! Remote view fetch.
//!
//! Issues one HTTP GET against the peer's topology endpoint and parses
//! the membership snapshot it returns. There are no retries here: the
//! next scheduled check is the retry.

use std::time::Duration;

use http_body_util::BodyExt;
use tracing::debug;

use splitguard_core::{MembershipView, TopologyResponse};

use crate::error::{FetchError, FetchResult};

/// Fetches the membership view reported by a peer zone.
#[derive(Debug, Clone)]
pub struct RemoteViewFetcher {
    query_path: String,
    timeout: Duration,
}

impl RemoteViewFetcher {
    pub fn new(query_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            query_path: query_path.into(),
            timeout,
        }
    }

    /// Fetch the peer's view from `http://{check_server}{query_path}`.
    ///
    /// Connection failures, timeouts and any status of 400 or above are
    /// `RemoteUnavailable`; a body that is not a topology document is
    /// `ParseError`.
    pub async fn fetch(&self, check_server: &str) -> FetchResult<MembershipView> {
        let uri = format!("http://{check_server}{}", self.query_path);

        let result = tokio::time::timeout(self.timeout, self.request(check_server, &uri)).await;

        match result {
            Ok(fetched) => fetched,
            Err(_) => {
                debug!(%uri, "membership fetch timed out");
                Err(FetchError::RemoteUnavailable(format!(
                    "timed out after {:?}",
                    self.timeout
                )))
            }
        }
    }

    async fn request(&self, check_server: &str, uri: &str) -> FetchResult<MembershipView> {
        let stream = tokio::net::TcpStream::connect(socket_addr(check_server))
            .await
            .map_err(|e| {
                debug!(error = %e, %uri, "membership fetch connection failed");
                FetchError::RemoteUnavailable(format!("connect {check_server}: {e}"))
            })?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| {
                debug!(error = %e, %uri, "membership fetch handshake failed");
                FetchError::RemoteUnavailable(format!("handshake: {e}"))
            })?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let req = http::Request::builder()
            .method("GET")
            .uri(&self.query_path)
            .header("host", check_server)
            .header("accept", "application/json")
            .header("user-agent", "splitguard-check/0.1")
            .body(http_body_util::Empty::<bytes::Bytes>::new())
            .map_err(|e| FetchError::RemoteUnavailable(format!("build request: {e}")))?;

        let resp = sender.send_request(req).await.map_err(|e| {
            debug!(error = %e, %uri, "membership fetch request failed");
            FetchError::RemoteUnavailable(format!("request: {e}"))
        })?;

        let status = resp.status();
        if status.as_u16() >= 400 {
            debug!(%status, %uri, "membership fetch rejected");
            return Err(FetchError::RemoteUnavailable(format!("status {status}")));
        }

        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| FetchError::RemoteUnavailable(format!("read body: {e}")))?
            .to_bytes();

        let view = parse_view(&body)?;
        debug!(%uri, nodes = view.len(), "membership fetched");
        Ok(view)
    }
}

/// Parse a topology document into a membership view.
pub fn parse_view(body: &[u8]) -> FetchResult<MembershipView> {
    serde_json::from_slice::<TopologyResponse>(body)
        .map(TopologyResponse::into_view)
        .map_err(|e| FetchError::ParseError(e.to_string()))
}

/// `host[:port]` with the HTTP default port filled in.
fn socket_addr(check_server: &str) -> String {
    match check_server.parse::<http::uri::Authority>() {
        Ok(authority) if authority.port_u16().is_none() => format!("{authority}:80"),
        _ => check_server.to_string(),
    }
}
