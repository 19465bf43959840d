use std::fmt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::http::mime::MimeTable;
use crate::http::request::Request;
use crate::http::writer::serialize_head;

/// Value of the `Server` header.
pub const SERVER_NAME: &str = "TinyHttpServer";

/// HTTP status codes produced by the server.
///
/// - `Ok` (200): the resource exists and follows the head
/// - `Forbidden` (403): the request method was not recognised
/// - `NotFound` (404): nothing exists at the resolved path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use tinyhttpd::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
        }
    }
}

/// The answer to one request: a fully formatted head plus the local file it
/// refers to.
///
/// For 403 and 404 the head already carries a small HTML body, and there is
/// nothing to stream afterwards.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    head: String,
    local_path: Option<PathBuf>,
}

impl Response {
    /// Builds the response for `request`, resolving its URI under `web_root`.
    ///
    /// An `UNKNOWN` method is refused with 403 before any path is resolved.
    /// Otherwise the resolved path is stat'ed: a regular file gives 200 with its
    /// size, timestamp and content type, anything else gives 404.
    pub async fn for_request(request: &Request, web_root: &str, mime: &MimeTable) -> Self {
        if !request.is_valid() {
            return Self::error(StatusCode::Forbidden, None);
        }

        let local_path = resolve_local_path(web_root, request.uri());

        match tokio::fs::metadata(&local_path).await {
            Ok(meta) if meta.is_file() => Self::positive(local_path, &meta, mime),
            _ => Self::error(StatusCode::NotFound, Some(local_path)),
        }
    }

    fn positive(local_path: PathBuf, meta: &Metadata, mime: &MimeTable) -> Self {
        let mut headers = vec![
            ("Date", httpdate::fmt_http_date(SystemTime::now())),
            ("Server", SERVER_NAME.to_string()),
            ("Content-Length", meta.len().to_string()),
            ("Connection", "Keep-Alive".to_string()),
        ];
        if let Ok(modified) = meta.modified() {
            headers.push(("Last-Modified", httpdate::fmt_http_date(modified)));
        }
        headers.push(("Content-Type", mime.lookup(&local_path).to_string()));

        Self {
            status: StatusCode::Ok,
            head: serialize_head(StatusCode::Ok, &headers, ""),
            local_path: Some(local_path),
        }
    }

    fn error(status: StatusCode, local_path: Option<PathBuf>) -> Self {
        let code = status.as_u16();
        let reason = status.reason_phrase();
        let body = format!(
            "<html><head><title>{code} {reason}</title></head><body>{reason}</body></html>\r\n"
        );

        let headers = [
            ("Date", httpdate::fmt_http_date(SystemTime::now())),
            ("Server", SERVER_NAME.to_string()),
            ("Content-Length", body.len().to_string()),
            ("Connection", "Keep-Alive".to_string()),
            ("Content-Type", "text/html".to_string()),
        ];

        Self {
            status,
            head: serialize_head(status, &headers, &body),
            local_path,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Status line, headers, blank line and, for errors, the inline body.
    pub fn head(&self) -> &str {
        &self.head
    }

    /// The path the URI resolved to. `None` when the method was refused.
    pub fn local_path(&self) -> Option<&Path> {
        self.local_path.as_deref()
    }

    /// The file to stream after the head: present only for 200 responses.
    pub fn servable_path(&self) -> Option<&Path> {
        match self.status {
            StatusCode::Ok => self.local_path(),
            _ => None,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.head)
    }
}

/// Joins the web root and the URI by plain concatenation, inserting a `/` when
/// the URI does not start with one.
pub fn resolve_local_path(web_root: &str, uri: &str) -> PathBuf {
    let mut path = String::with_capacity(web_root.len() + uri.len() + 1);
    path.push_str(web_root);
    if !uri.starts_with('/') {
        path.push('/');
    }
    path.push_str(uri);
    PathBuf::from(path)
}
