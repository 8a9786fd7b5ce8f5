use std::collections::BTreeMap;

/// Header map. Keys keep the case they arrived with; ordered so that
/// serialization is deterministic.
pub type Headers = BTreeMap<String, String>;

pub const DEFAULT_VERSION: &str = "HTTP/1.1";

/// Fields shared by requests and responses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    version: String,
    headers: Headers,
    body: Vec<u8>,
}

impl Message {
    pub fn new(version: impl Into<String>, headers: Headers, body: Vec<u8>) -> Self {
        Self {
            version: version.into(),
            headers,
            body,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Exact-case header lookup.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    /// Header lookup ignoring ASCII case.
    pub fn header_ignore_case(&self, key: &str) -> Option<&str> {
        find_ignore_case(&self.headers, key)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

pub(crate) fn find_ignore_case<'h>(headers: &'h Headers, key: &str) -> Option<&'h str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_str())
}
