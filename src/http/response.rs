use crate::http::message::{Headers, Message, DEFAULT_VERSION};

pub const NOT_FOUND_BODY: &str = "<html><body><h1>404 Not Found</h1></body></html>";
pub const BAD_REQUEST_BODY: &str = "<html><body><h1>400 Bad Request</h1></body></html>";
pub const INTERNAL_ERROR_BODY: &str =
    "<html><body><h1>500 Internal Server Error</h1></body></html>";
pub const FORBIDDEN_BODY: &str =
    "<html><body><h1>403 Forbidden (incorrect login or password)</h1></body></html>";
pub const LOGIN_SUCCESS_BODY: &str = "<html><body><h1>Login success</h1></body></html>";

/// HTTP status codes the server can answer with.
///
/// - `Ok` (200): Request successful
/// - `BadRequest` (400): Malformed request or missing form fields
/// - `Forbidden` (403): Credentials rejected
/// - `NotFound` (404): No route for the path
/// - `InternalServerError` (500): Backing resource could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use porthole::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::Forbidden.as_u16(), 403);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Maps a numeric code back to a variant. Codes outside the served set
    /// yield `None`.
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(StatusCode::Ok),
            400 => Some(StatusCode::BadRequest),
            403 => Some(StatusCode::Forbidden),
            404 => Some(StatusCode::NotFound),
            500 => Some(StatusCode::InternalServerError),
            _ => None,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    /// Code and reason as they appear on the status line.
    ///
    /// ```
    /// # use porthole::http::response::StatusCode;
    /// assert_eq!(StatusCode::NotFound.status_line(), "404 Not Found");
    /// ```
    pub fn status_line(&self) -> &'static str {
        match self {
            StatusCode::Ok => "200 OK",
            StatusCode::BadRequest => "400 Bad Request",
            StatusCode::Forbidden => "403 Forbidden",
            StatusCode::NotFound => "404 Not Found",
            StatusCode::InternalServerError => "500 Internal Server Error",
        }
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
///
/// Constructed by the dispatcher and consumed once by the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    message: Message,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use porthole::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/plain")
///     .body(b"hi".to_vec())
///     .build();
///
/// assert_eq!(response.header("Content-Length"), Some("2"));
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    version: String,
    headers: Headers,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            version: DEFAULT_VERSION.to_string(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Sets the protocol version. An empty string keeps the default.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        if !version.is_empty() {
            self.version = version;
        }
        self
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response.
    ///
    /// Adds a Content-Length header matching the body unless one is already present.
    pub fn build(mut self) -> Response {
        self.headers
            .entry("Content-Length".to_string())
            .or_insert_with(|| self.body.len().to_string());

        Response {
            status: self.status,
            message: Message::new(self.version, self.headers, self.body),
        }
    }
}

impl Response {
    pub fn builder(status: StatusCode) -> ResponseBuilder {
        ResponseBuilder::new(status)
    }

    /// An HTML response with the given status and body.
    pub fn html(status: StatusCode, version: &str, body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(status)
            .version(version)
            .header("Content-Type", "text/html")
            .body(body.into())
            .build()
    }

    /// Creates a 404 Not Found response.
    pub fn not_found(version: &str) -> Self {
        Self::html(StatusCode::NotFound, version, NOT_FOUND_BODY)
    }

    /// Creates a 400 Bad Request response.
    pub fn bad_request(version: &str) -> Self {
        Self::html(StatusCode::BadRequest, version, BAD_REQUEST_BODY)
    }

    /// Creates a 403 Forbidden response for rejected credentials.
    pub fn forbidden(version: &str) -> Self {
        Self::html(StatusCode::Forbidden, version, FORBIDDEN_BODY)
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_error(version: &str) -> Self {
        Self::html(StatusCode::InternalServerError, version, INTERNAL_ERROR_BODY)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn version(&self) -> &str {
        self.message.version()
    }

    pub fn headers(&self) -> &Headers {
        self.message.headers()
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.message.header(key)
    }

    pub fn body(&self) -> &[u8] {
        self.message.body()
    }
}
