use std::io::ErrorKind;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::http::response::Response;

/// Reusable send buffer size; grows when a response is larger.
const SEND_BUFFER_SIZE: usize = 64 * 1024;

/// Encodes `resp` into `buf`, replacing its previous contents.
///
/// Layout: `<version> <code> <reason>\r\n`, one `Key: Value\r\n` per header
/// in key order, a blank line, then the raw body.
pub fn serialize_response(resp: &Response, buf: &mut Vec<u8>) {
    buf.clear();

    // Status line
    buf.extend_from_slice(resp.version().as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(resp.status().status_line().as_bytes());
    buf.extend_from_slice(b"\r\n");

    // Headers
    for (k, v) in resp.headers() {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    // Body
    buf.extend_from_slice(resp.body());
}

/// Writes responses to one connection.
pub struct Sender {
    stream: Arc<TcpStream>,
    buffer: Mutex<Vec<u8>>,
}

impl Sender {
    pub fn new(stream: Arc<TcpStream>) -> Self {
        Self {
            stream,
            buffer: Mutex::new(Vec::with_capacity(SEND_BUFFER_SIZE)),
        }
    }

    /// Serializes `response` and writes every byte of it.
    ///
    /// A write that makes no progress or fails is reported as an error; the
    /// caller abandons the connection.
    pub async fn send_response(&self, response: &Response) -> anyhow::Result<()> {
        let mut buffer = self.buffer.lock().await;
        serialize_response(response, &mut buffer);

        let mut written = 0;
        while written < buffer.len() {
            self.stream
                .writable()
                .await
                .context("connection not writable")?;

            match self.stream.try_write(&buffer[written..]) {
                Ok(0) => anyhow::bail!("connection closed while writing"),
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::WouldBlock => continue,
                Err(e) => return Err(e).context("failed to write response"),
            }
        }

        tracing::debug!(
            status = response.status().as_u16(),
            bytes = written,
            "Response written"
        );

        Ok(())
    }
}
