use crate::http::message::{Headers, Message, DEFAULT_VERSION};

/// HTTP request methods.
///
/// Only GET and POST are served. Anything else is kept as `UNKNOWN` with the
/// token that was received, so it can be logged and answered with 400.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Submit a form
    POST,
    /// Any other token from the request line
    UNKNOWN(String),
}

impl Method {
    /// Parses an HTTP method token (case-sensitive).
    ///
    /// # Example
    ///
    /// ```
    /// # use porthole::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Method::GET);
    /// assert_eq!(Method::parse("get"), Method::UNKNOWN("get".to_string()));
    /// ```
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            other => Method::UNKNOWN(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::UNKNOWN(token) => token,
        }
    }
}

/// A fully framed HTTP request.
///
/// Built once per message by the parser (or by [`RequestBuilder`]) and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    path: String,
    message: Message,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Option<String>,
    headers: Headers,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: None,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            message: Message::new(
                self.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
                self.headers,
                self.body,
            ),
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    pub(crate) fn from_parts(method: Method, path: String, message: Message) -> Self {
        Self {
            method,
            path,
            message,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request target as received (e.g. "/index.html").
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> &str {
        self.message.version()
    }

    pub fn headers(&self) -> &Headers {
        self.message.headers()
    }

    /// Retrieves a header value by its exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.message.header(key)
    }

    pub fn body(&self) -> &[u8] {
        self.message.body()
    }

    /// Declared Content-Length, or 0 if it is missing or not a number.
    pub fn content_length(&self) -> usize {
        self.message
            .header_ignore_case("Content-Length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }
}
