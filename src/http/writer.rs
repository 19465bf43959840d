use crate::http::response::StatusCode;
use crate::server::transport::Transport;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Formats a status line, the headers in the given order, the blank line and
/// an optional inline body.
pub fn serialize_head(status: StatusCode, headers: &[(&str, String)], body: &str) -> String {
    let mut buf = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase()
    );

    for (name, value) in headers {
        buf.push_str(name);
        buf.push_str(": ");
        buf.push_str(value);
        buf.push_str("\r\n");
    }

    // Header/body separator
    buf.push_str("\r\n");

    buf.push_str(body);

    buf
}

/// Pushes an already formatted response head through a transport, resuming
/// after partial sends.
pub struct ResponseWriter<'a> {
    buffer: &'a [u8],
    written: usize,
}

impl<'a> ResponseWriter<'a> {
    pub fn new(head: &'a str) -> Self {
        Self {
            buffer: head.as_bytes(),
            written: 0,
        }
    }

    /// Sends the remaining bytes. Returns `false` as soon as a send fails,
    /// which means the connection is down.
    pub async fn write_to<T: Transport>(&mut self, transport: &mut T) -> bool {
        while self.written < self.buffer.len() {
            match transport.send(&self.buffer[self.written..]).await {
                Ok(n) => self.written += n,
                Err(e) => {
                    tracing::debug!(error = %e, written = self.written, "sending response head failed");
                    return false;
                }
            }
        }

        true
    }
}
