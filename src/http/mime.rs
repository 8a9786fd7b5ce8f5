use serde::Deserialize;

/// Kinds of static files the route table can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Html,
    Jpg,
    Ico,
    Txt,
}

impl FileType {
    /// MIME type sent as `Content-Type`.
    pub fn mime(&self) -> &'static str {
        match self {
            FileType::Html => "text/html",
            FileType::Jpg => "image/jpeg",
            FileType::Ico => "image/x-icon",
            FileType::Txt => "text/plain",
        }
    }
}
