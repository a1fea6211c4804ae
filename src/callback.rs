// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! One-shot OAuth redirect listener
//!
//! Serves connections on the redirect port until the browser hits the
//! callback path, answers it, and hands the outcome back. Requests for any
//! other path get a 404 and the wait continues.

use crate::constants::routes;
use crate::error::{AppError, Result};
use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};
use url::Url;

const SUCCESS_PAGE: &str = "<html><body>\
    <h1>Authorization successful!</h1>\
    <p>You can close this window and return to the terminal.</p>\
    </body></html>";

const FAILURE_PAGE: &str = "<html><body><h1>Authorization failed!</h1></body></html>";

/// How long a connection may take to deliver its request line and headers
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on the request line plus headers
const MAX_REQUEST_HEAD_BYTES: u64 = 16 * 1024;

/// What the browser redirect carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Code(String),
    /// No code; holds the provider's `error` parameter when one was sent
    Denied(Option<String>),
}

pub struct CallbackListener {
    listener: TcpListener,
    path: String,
    read_timeout: Duration,
}

enum Handled {
    Done(CallbackOutcome),
    KeepWaiting,
}

impl CallbackListener {
    /// Bind the redirect port; fails if another process holds it
    pub async fn bind(port: u16) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(AppError::CallbackListener)?;
        info!("Listening for OAuth callback on port {}", port);

        Ok(Self {
            listener,
            path: routes::OAUTH_CALLBACK.to_string(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        })
    }

    /// Bound on reading one request; a connection that stays silent longer
    /// is dropped and the wait continues
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(AppError::CallbackListener)
    }

    /// Block until one request for the callback path arrives
    ///
    /// Never returns if the browser never comes back; callers wanting a bound
    /// wrap this in a timeout. The listener is dropped on return.
    pub async fn wait_for_callback(self) -> Result<CallbackOutcome> {
        loop {
            let (socket, peer) = self
                .listener
                .accept()
                .await
                .map_err(AppError::CallbackListener)?;
            debug!(%peer, "Callback connection accepted");

            match self.handle_connection(socket).await {
                Ok(Handled::Done(outcome)) => return Ok(outcome),
                Ok(Handled::KeepWaiting) => {}
                Err(e) => warn!(%peer, error = %e, "Dropped callback connection"),
            }
        }
    }

    async fn handle_connection(&self, socket: TcpStream) -> io::Result<Handled> {
        let (reader, mut writer) = socket.into_split();

        let request_line = tokio::time::timeout(self.read_timeout, read_request_head(reader))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "no request received in time"))??;

        let mut parts = request_line.split_whitespace();
        let (method, target) = match (parts.next(), parts.next()) {
            (Some(method), Some(target)) => (method, target),
            _ => {
                write_response(&mut writer, "400 Bad Request", FAILURE_PAGE).await?;
                return Ok(Handled::KeepWaiting);
            }
        };

        let url = match Url::parse(&format!("http://localhost{}", target)) {
            Ok(url) => url,
            Err(_) => {
                write_response(&mut writer, "400 Bad Request", FAILURE_PAGE).await?;
                return Ok(Handled::KeepWaiting);
            }
        };

        if url.path() != self.path {
            debug!(path = url.path(), "Ignoring request outside the callback path");
            write_response(&mut writer, "404 Not Found", "").await?;
            return Ok(Handled::KeepWaiting);
        }

        if method != "GET" {
            write_response(&mut writer, "405 Method Not Allowed", "").await?;
            return Ok(Handled::KeepWaiting);
        }

        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let (outcome, status, page) = match params.get("code").filter(|code| !code.is_empty()) {
            Some(code) => (CallbackOutcome::Code(code.clone()), "200 OK", SUCCESS_PAGE),
            None => (
                CallbackOutcome::Denied(params.get("error").cloned()),
                "400 Bad Request",
                FAILURE_PAGE,
            ),
        };

        // The outcome stands even if the browser went away before the reply
        if let Err(e) = write_response(&mut writer, status, page).await {
            warn!(error = %e, "Could not answer the callback request");
        }

        Ok(Handled::Done(outcome))
    }
}

/// Request line of one HTTP request, with its headers drained so the
/// browser sees a clean response
async fn read_request_head<R>(reader: R) -> io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader.take(MAX_REQUEST_HEAD_BYTES));

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    let mut header = String::new();
    loop {
        header.clear();
        let read = reader.read_line(&mut header).await?;
        if read == 0 || header == "\r\n" || header == "\n" {
            break;
        }
    }

    if reader.get_ref().limit() == 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "request head too large"));
    }

    Ok(request_line)
}

async fn write_response<W>(writer: &mut W, status: &str, body: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let response = format!(
        "HTTP/1.1 {}\r\n\
         Content-Type: text/html\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n\
         {}",
        status,
        body.len(),
        body
    );
    writer.write_all(response.as_bytes()).await?;
    writer.shutdown().await
}
