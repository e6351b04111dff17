//! # CWOP Uploader Module
//!
//! Delivers an encoded report to the CWOP APRS-IS server.
//!
//! This module handles:
//! - Opening the TCP connection (with a connect timeout)
//! - Discarding the server banner and login acknowledgment (with a read timeout)
//! - Sending the login line followed by the report line
//! - Closing the connection
//!
//! Server responses are never parsed. A successful upload means every
//! socket operation completed; it does not mean the server accepted the
//! report.

pub mod stream;

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::aprs::protocol::{build_login_line, AprsReport, SERVER_READ_BUFFER_SIZE};
use crate::config::ServerConfig;
use crate::error::{CwopError, Result};
use stream::{AsyncStream, Connector, TcpConnector};

/// CWOP report uploader
///
/// Holds the server settings and the connector used to reach the server.
/// Each [`upload`](CwopUploader::upload) call runs one complete
/// connect-login-send-close exchange.
pub struct CwopUploader<C = TcpConnector> {
    connector: C,
    server: ServerConfig,
}

impl<C> std::fmt::Debug for CwopUploader<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CwopUploader")
            .field("host", &self.server.host)
            .field("port", &self.server.port)
            .finish_non_exhaustive()
    }
}

impl CwopUploader<TcpConnector> {
    /// Create an uploader that connects over plain TCP
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use meso_cwop::config::ServerConfig;
    /// use meso_cwop::uploader::CwopUploader;
    ///
    /// let uploader = CwopUploader::new(ServerConfig::default());
    /// ```
    pub fn new(server: ServerConfig) -> Self {
        Self::with_connector(TcpConnector, server)
    }
}

impl<C: Connector> CwopUploader<C> {
    /// Create an uploader with a custom connector
    pub fn with_connector(connector: C, server: ServerConfig) -> Self {
        Self { connector, server }
    }

    /// Upload one report
    ///
    /// # Arguments
    ///
    /// * `report` - Encoded report line (including CR LF)
    /// * `station_id` - CWOP station identifier used for the login line
    ///
    /// # Returns
    ///
    /// * `Result<()>` - Ok once the report bytes were written and the
    ///   connection closed
    ///
    /// # Errors
    ///
    /// - [`CwopError::Connect`] if the connection cannot be established
    /// - [`CwopError::Timeout`] if connecting or reading exceeds its bound
    /// - [`CwopError::Transport`] if a send/receive fails mid-exchange
    #[tracing::instrument(skip(self, report), fields(server = %self.server.host, port = self.server.port))]
    pub async fn upload(&self, report: &AprsReport, station_id: &str) -> Result<()> {
        let mut stream = self.connect().await?;

        let login = build_login_line(
            station_id,
            &self.server.client_name,
            &self.server.client_version,
        );
        let read_timeout = Duration::from_millis(self.server.read_timeout_ms);

        exchange(&mut stream, login.as_bytes(), report.as_bytes(), read_timeout).await?;

        info!("Uploaded report ({} bytes)", report.len());
        Ok(())
    }

    async fn connect(&self) -> Result<Box<dyn AsyncStream>> {
        let host = self.server.host.as_str();
        let port = self.server.port;
        let connect_timeout = Duration::from_millis(self.server.connect_timeout_ms);

        match timeout(connect_timeout, self.connector.connect(host, port)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::TimedOut => Err(CwopError::Timeout(
                format!("connecting to {}:{}: {}", host, port, e),
            )),
            Ok(Err(e)) => Err(CwopError::Connect(format!(
                "Failed to connect to {}:{}: {}",
                host, port, e
            ))),
            Err(_) => Err(CwopError::Timeout(format!(
                "connecting to {}:{} after {}ms",
                host, port, self.server.connect_timeout_ms
            ))),
        }
    }
}

/// Run the login + report exchange over an open stream, then close it
///
/// 1. Read and discard up to 1024 bytes (server banner)
/// 2. Send the login line
/// 3. Read and discard up to 1024 bytes (login acknowledgment)
/// 4. Send the report
/// 5. Shut down the stream
pub async fn exchange<S>(
    stream: &mut S,
    login: &[u8],
    report: &[u8],
    read_timeout: Duration,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    discard_response(stream, "server banner", read_timeout).await?;
    send(stream, login, "login line").await?;
    discard_response(stream, "login acknowledgment", read_timeout).await?;
    send(stream, report, "report").await?;

    stream
        .shutdown()
        .await
        .map_err(|e| CwopError::Transport(format!("Failed to close connection: {}", e)))?;

    Ok(())
}

/// Read one chunk from the server and drop it without inspection
async fn discard_response<S>(stream: &mut S, what: &str, read_timeout: Duration) -> Result<()>
where
    S: AsyncRead + Unpin + ?Sized,
{
    let mut buf = [0u8; SERVER_READ_BUFFER_SIZE];

    let n = timeout(read_timeout, stream.read(&mut buf))
        .await
        .map_err(|_| {
            CwopError::Timeout(format!(
                "waiting for {} after {}ms",
                what,
                read_timeout.as_millis()
            ))
        })?
        .map_err(|e| CwopError::Transport(format!("Failed to read {}: {}", what, e)))?;

    if n == 0 {
        return Err(CwopError::Transport(format!(
            "Server closed connection before {}",
            what
        )));
    }

    debug!("Discarded {} ({} bytes): {}", what, n, String::from_utf8_lossy(&buf[..n]).trim_end());
    Ok(())
}

async fn send<S>(stream: &mut S, data: &[u8], what: &str) -> Result<()>
where
    S: AsyncWrite + Unpin + ?Sized,
{
    stream
        .write_all(data)
        .await
        .map_err(|e| CwopError::Transport(format!("Failed to send {}: {}", what, e)))?;

    stream
        .flush()
        .await
        .map_err(|e| CwopError::Transport(format!("Failed to flush {}: {}", what, e)))?;

    debug!("Sent {} ({} bytes)", what, data.len());
    Ok(())
}
