use std::fmt;

/// HTTP request methods understood by the server.
///
/// Anything that is not an exact, case-sensitive match for one of the known
/// methods is `UNKNOWN`, which the response builder answers with 403.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// POST - Served like GET; the request body is not read
    POST,
    /// Unrecognized or missing method
    #[default]
    UNKNOWN,
}

/// HTTP protocol versions recognised on the request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Version {
    Http10,
    Http11,
    #[default]
    Unknown,
}

/// Length of `"HTTP/x.x"`, the only part of the version token that is compared.
const VERSION_TOKEN_LEN: usize = 8;

impl Method {
    /// Parses an HTTP method token.
    ///
    /// # Example
    ///
    /// ```
    /// # use tinyhttpd::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Method::GET);
    /// assert_eq!(Method::parse("get"), Method::UNKNOWN);
    /// ```
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "POST" => Method::POST,
            _ => Method::UNKNOWN,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::UNKNOWN => "UNKNOWN",
        }
    }
}

impl Version {
    /// Parses an HTTP version token, looking only at its first eight bytes.
    ///
    /// # Example
    ///
    /// ```
    /// # use tinyhttpd::http::request::Version;
    /// assert_eq!(Version::parse("HTTP/1.1"), Version::Http11);
    /// assert_eq!(Version::parse("HTTP/1"), Version::Unknown);
    /// ```
    pub fn parse(s: &str) -> Self {
        match s.as_bytes().get(..VERSION_TOKEN_LEN) {
            Some(b"HTTP/1.0") => Version::Http10,
            Some(b"HTTP/1.1") => Version::Http11,
            _ => Version::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
            Version::Unknown => "UNKNOWN",
        }
    }
}

/// A request as read off the wire.
///
/// `headers` holds every raw line of the request head in arrival order, line
/// terminators stripped; the request line itself is the first entry. The
/// method, URI and version are parsed from that first line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    method: Method,
    version: Version,
    uri: String,
    headers: Vec<String>,
}

/// Builder for constructing Request objects.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.request.method = method;
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.request.uri = uri.into();
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.request.version = version;
        self
    }

    pub fn header(mut self, line: impl Into<String>) -> Self {
        self.request.headers.push(line.into());
        self
    }

    pub fn build(self) -> Request {
        self.request
    }
}

impl Request {
    /// Creates a request that carries only raw header lines; method, version
    /// and URI stay unknown/empty until the request line is parsed.
    pub(crate) fn from_headers(headers: Vec<String>) -> Self {
        Self {
            headers,
            ..Self::default()
        }
    }

    pub(crate) fn set_request_line(&mut self, method: Method, uri: String, version: Version) {
        self.method = method;
        self.uri = uri;
        self.version = version;
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Raw header lines, request line first.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// The first raw line of the request head, if anything was received.
    pub fn request_line(&self) -> Option<&str> {
        self.headers.first().map(String::as_str)
    }

    /// A request is servable only when its method was recognised.
    pub fn is_valid(&self) -> bool {
        self.method != Method::UNKNOWN
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.headers {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
